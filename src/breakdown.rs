use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ensure_len, AnalysisError, Result};
use crate::matrix::WeightMatrix;
use crate::rank::rank;

pub const OTHERS_LABEL: &str = "others";

/// Scale the percentages of a [`Breakdown`] are expressed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// 0 to 100
    #[default]
    Percent,
    /// 0 to 1
    Fraction,
}

impl Scale {
    fn full(self) -> f64 {
        match self {
            Scale::Percent => 100.0,
            Scale::Fraction => 1.0,
        }
    }

    /// Converts a value given in percent to this scale.
    pub fn from_percent(self, percent: f64) -> f64 {
        percent / 100.0 * self.full()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub percentage: f64,
}

/// Ranked share of each topic in one document.
///
/// Topics at or above the threshold are listed individually in `major`; the
/// rest are named in `minor_labels` and summed into `others`. Every input
/// label lands in exactly one of the two lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub major: Vec<BreakdownEntry>,
    pub others: f64,
    pub minor_labels: Vec<String>,
    pub scale: Scale,
}

impl Breakdown {
    /// Major entries in rank order followed by the single "others" entry.
    pub fn entries(&self) -> Vec<BreakdownEntry> {
        let mut entries = self.major.clone();
        entries.push(BreakdownEntry {
            label: OTHERS_LABEL.to_string(),
            percentage: self.others,
        });
        entries
    }

    pub fn total(&self) -> f64 {
        self.major.iter().map(|e| e.percentage).sum::<f64>() + self.others
    }
}

/// Splits a document's topic weights into ranked major topics and "others".
///
/// `major_threshold_percent` is always in percent, whatever `scale` is, so a
/// threshold of 10 means a tenth of the document on both scales. A weight row
/// summing to zero yields an empty major list and `others == 0`.
pub fn breakdown(
    weights: &[f64],
    topic_labels: &[String],
    major_threshold_percent: f64,
    scale: Scale,
) -> Result<Breakdown> {
    ensure_len("topic labels", weights.len(), topic_labels.len())?;
    if !major_threshold_percent.is_finite() || major_threshold_percent < 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "major threshold must be a non-negative percentage, got {major_threshold_percent}"
        )));
    }

    let order = rank(weights, None);
    let total: f64 = weights.iter().sum();

    if total == 0.0 {
        warn!(topics = weights.len(), "topic weights sum to zero; folding everything into others");
        return Ok(Breakdown {
            major: Vec::new(),
            others: 0.0,
            minor_labels: order.into_iter().map(|i| topic_labels[i].clone()).collect(),
            scale,
        });
    }

    let threshold = scale.from_percent(major_threshold_percent);
    let mut major = Vec::new();
    let mut minor_labels = Vec::new();
    let mut others = 0.0;

    for i in order {
        let percentage = weights[i] / total * scale.full();
        if percentage >= threshold {
            major.push(BreakdownEntry {
                label: topic_labels[i].clone(),
                percentage,
            });
        } else {
            others += percentage;
            minor_labels.push(topic_labels[i].clone());
        }
    }

    Ok(Breakdown {
        major,
        others,
        minor_labels,
        scale,
    })
}

/// [`breakdown`] for every document row of a document-topic matrix.
///
/// A matrix without rows yields no breakdowns.
pub fn breakdown_all(
    doc_topics: &WeightMatrix,
    topic_labels: &[String],
    major_threshold_percent: f64,
    scale: Scale,
) -> Result<Vec<Breakdown>> {
    if doc_topics.row_count() == 0 {
        return Ok(Vec::new());
    }
    ensure_len("topic labels", doc_topics.column_count(), topic_labels.len())?;
    let breakdowns = doc_topics
        .rows()
        .map(|row| breakdown(row, topic_labels, major_threshold_percent, scale))
        .collect::<Result<Vec<_>>>()?;
    debug!(documents = breakdowns.len(), "computed topic breakdowns");
    Ok(breakdowns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn pairs(b: &Breakdown) -> Vec<(String, f64)> {
        b.entries().into_iter().map(|e| (e.label, e.percentage)).collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_breakdown_with_custom_threshold() {
        let b = breakdown(&[40.0, 30.0, 20.0, 10.0], &labels(&["A", "B", "C", "D"]), 15.0, Scale::Percent).unwrap();
        let got = pairs(&b);
        let expected = [("A", 40.0), ("B", 30.0), ("C", 20.0), ("others", 10.0)];
        assert_eq!(got.len(), expected.len());
        for ((label, value), (want_label, want_value)) in got.iter().zip(expected) {
            assert_eq!(label, want_label);
            assert_close(*value, want_value);
        }
        assert_eq!(b.minor_labels, labels(&["D"]));
    }

    #[test]
    fn test_breakdown_ranks_unsorted_weights() {
        let b = breakdown(&[0.05, 0.6, 0.05, 0.3], &labels(&["w", "x", "y", "z"]), 10.0, Scale::Percent).unwrap();
        let major: Vec<&str> = b.major.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(major, vec!["x", "z"]);
        assert_close(b.others, 10.0);
        assert_eq!(b.minor_labels, labels(&["w", "y"]));
    }

    #[test]
    fn test_breakdown_zero_weights() {
        let b = breakdown(&[0.0, 0.0, 0.0], &labels(&["A", "B", "C"]), 10.0, Scale::Percent).unwrap();
        assert!(b.major.is_empty());
        assert_eq!(b.others, 0.0);
        assert_eq!(b.minor_labels, labels(&["A", "B", "C"]));
        assert_eq!(pairs(&b), vec![("others".to_string(), 0.0)]);
    }

    #[test]
    fn test_breakdown_sums_to_full_scale() {
        let weights = [0.013, 0.4, 0.0021, 0.29, 0.07, 0.2];
        let names = labels(&["a", "b", "c", "d", "e", "f"]);
        let percent = breakdown(&weights, &names, 10.0, Scale::Percent).unwrap();
        assert!((percent.total() - 100.0).abs() < 1e-9);

        let fraction = breakdown(&weights, &names, 10.0, Scale::Fraction).unwrap();
        assert!((fraction.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_breakdown_accounts_for_every_label_once() {
        let weights = [3.0, 0.2, 9.0, 0.1, 1.5, 0.0];
        let names = labels(&["a", "b", "c", "d", "e", "f"]);
        let b = breakdown(&weights, &names, 10.0, Scale::Percent).unwrap();

        let mut seen: Vec<String> = b.major.iter().map(|e| e.label.clone()).collect();
        seen.extend(b.minor_labels.iter().cloned());
        seen.sort();
        assert_eq!(seen, names);
    }

    #[test]
    fn test_fraction_scale_uses_same_threshold() {
        let weights = [0.55, 0.3, 0.08, 0.07];
        let names = labels(&["a", "b", "c", "d"]);
        let percent = breakdown(&weights, &names, 10.0, Scale::Percent).unwrap();
        let fraction = breakdown(&weights, &names, 10.0, Scale::Fraction).unwrap();

        assert_eq!(percent.minor_labels, fraction.minor_labels);
        assert_eq!(fraction.major.len(), 2);
        assert_close(fraction.major[0].percentage, 0.55);
        assert_close(fraction.others, 0.15);
    }

    #[test]
    fn test_threshold_boundary_is_major() {
        let b = breakdown(&[1.0, 9.0], &labels(&["a", "b"]), 10.0, Scale::Percent).unwrap();
        assert_eq!(b.major.len(), 2);
        assert!(b.minor_labels.is_empty());
        assert_eq!(b.others, 0.0);
    }

    #[test]
    fn test_breakdown_shape_mismatch() {
        let err = breakdown(&[1.0, 2.0], &labels(&["a"]), 10.0, Scale::Percent).unwrap_err();
        assert!(matches!(err, AnalysisError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_breakdown_rejects_negative_threshold() {
        let err = breakdown(&[1.0], &labels(&["a"]), -1.0, Scale::Percent).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_breakdown_all_rows() {
        let w = WeightMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.5, 0.5]]).unwrap();
        let all = breakdown_all(&w, &labels(&["x", "y"]), 10.0, Scale::Percent).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].major[0].label, "x");
        assert!(all[1].major.is_empty());
        assert_eq!(all[2].major.len(), 2);

        assert!(breakdown_all(&w, &labels(&["x"]), 10.0, Scale::Percent).is_err());
    }

    #[test]
    fn test_breakdown_all_without_documents() {
        let w = WeightMatrix::from_rows(Vec::new()).unwrap();
        let all = breakdown_all(&w, &labels(&["a", "b"]), 10.0, Scale::Percent).unwrap();
        assert!(all.is_empty());
    }
}
