//! Flat-file outputs read by the dashboards.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::breakdown::{Breakdown, Scale};
use crate::error::Result;
use crate::similarity::LabelTally;

fn field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// `name,value,words` rows, one per breakdown entry.
///
/// `value` is the share rounded to a whole percent and written as a fraction
/// (37.6% becomes 0.38). `top_words` holds the words shown next to each
/// topic; "others" has none.
pub fn write_breakdown_csv<W: Write>(
    writer: &mut W,
    breakdown: &Breakdown,
    top_words: &HashMap<String, String>,
) -> Result<()> {
    writeln!(writer, "name,value,words")?;
    let to_percent = match breakdown.scale {
        Scale::Percent => 1.0,
        Scale::Fraction => 100.0,
    };
    for (i, entry) in breakdown.entries().iter().enumerate() {
        let is_others = i == breakdown.major.len();
        let words = if is_others {
            ""
        } else {
            top_words.get(&entry.label).map(String::as_str).unwrap_or("")
        };
        let value = (entry.percentage * to_percent).round() / 100.0;
        writeln!(writer, "{},{},{}", field(&entry.label), value, field(words))?;
    }
    Ok(())
}

/// `journal,count` rows in tally order.
pub fn write_tally_csv<W: Write>(writer: &mut W, tally: &LabelTally) -> Result<()> {
    writeln!(writer, "journal,count")?;
    for (label, count) in tally.iter() {
        writeln!(writer, "{},{}", field(label), count)?;
    }
    Ok(())
}

/// `word,frequency` rows for at most `top` terms.
pub fn write_terms_csv<W: Write>(writer: &mut W, terms: &[(String, f64)], top: usize) -> Result<()> {
    writeln!(writer, "word,frequency")?;
    for (word, frequency) in terms.iter().take(top) {
        writeln!(writer, "{},{}", field(word), frequency)?;
    }
    Ok(())
}

/// One topic's top terms per line, `label,word word word`.
pub fn write_topics_csv<W: Write>(writer: &mut W, labels: &[String], topics: &[Vec<String>]) -> Result<()> {
    writeln!(writer, "name,words")?;
    for (label, words) in labels.iter().zip(topics) {
        writeln!(writer, "{},{}", field(label), field(&words.join(" ")))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Summary<T: Serialize> {
    pub generated_at: DateTime<Utc>,
    pub kind: &'static str,
    pub data: T,
}

impl<T: Serialize> Summary<T> {
    pub fn new(kind: &'static str, data: T) -> Self {
        Summary {
            generated_at: Utc::now(),
            kind,
            data,
        }
    }

    pub fn write_json<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}
