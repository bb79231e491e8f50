//! The work behind each CLI subcommand, minus terminal and stdout handling.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::breakdown::{breakdown, Breakdown, Scale};
use crate::categories::general_category;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::labeling::{TopicLabels, TopicRun};
use crate::models::{Corpus, TopicModel};
use crate::report;
use crate::similarity::{top_similar, CosineSimilarity, LabelTally};
use crate::topics::top_terms;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakdownOptions {
    pub threshold_percent: f64,
    pub scale: Scale,
    pub top_terms: usize,
}

impl BreakdownOptions {
    /// Flags given on the command line win over the config.
    pub fn resolve(config: &AnalysisConfig, threshold: Option<f64>, fraction: bool) -> Self {
        BreakdownOptions {
            threshold_percent: threshold.unwrap_or(config.major_threshold_percent),
            scale: if fraction { Scale::Fraction } else { config.scale },
            top_terms: config.top_terms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarOptions {
    pub neighbors: usize,
    pub general: bool,
}

impl SimilarOptions {
    pub fn resolve(config: &AnalysisConfig, neighbors: Option<usize>, general: bool) -> Self {
        SimilarOptions {
            neighbors: neighbors.unwrap_or(config.neighbors),
            general,
        }
    }
}

pub fn breakdown_csv_path(dir: &Path, doc: usize) -> PathBuf {
    dir.join(format!("doc{doc}_data.csv"))
}

pub fn tally_csv_path(dir: &Path, doc: usize) -> PathBuf {
    dir.join(format!("document_{doc}_data.csv"))
}

/// Words shown next to each topic in the breakdown charts, `a / b / c`.
pub fn top_words(labels: &[String], topics: &[Vec<String>]) -> HashMap<String, String> {
    labels
        .iter()
        .cloned()
        .zip(topics.iter().map(|words| words.join(" / ")))
        .collect()
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Breakdowns of the requested documents, also written as CSV when `out_dir` is set.
pub fn document_breakdowns(
    model: &TopicModel,
    docs: &[usize],
    options: &BreakdownOptions,
    out_dir: Option<&Path>,
) -> Result<BTreeMap<usize, Breakdown>> {
    let labels = model.labels();
    let topics = top_terms(&model.topic_terms, &model.terms, options.top_terms)?;
    let words = top_words(&labels, &topics);

    let mut breakdowns = BTreeMap::new();
    for &doc in docs {
        let weights = model.doc_topics.try_row(doc)?;
        let b = breakdown(weights, &labels, options.threshold_percent, options.scale)?;
        info!(doc, major = b.major.len(), others = b.others, "document breakdown");

        if let Some(dir) = out_dir {
            let mut writer = create(&breakdown_csv_path(dir, doc))?;
            report::write_breakdown_csv(&mut writer, &b, &words)?;
            writer.flush()?;
        }
        breakdowns.insert(doc, b);
    }
    Ok(breakdowns)
}

/// Neighbour label tallies of the requested documents, also written as CSV
/// when `out_dir` is set.
pub fn neighbour_tallies(
    corpus: &Corpus,
    docs: &[usize],
    options: &SimilarOptions,
    out_dir: Option<&Path>,
) -> Result<BTreeMap<usize, LabelTally>> {
    let labels: Vec<String> = if options.general {
        corpus.labels.iter().map(|l| general_category(l).to_string()).collect()
    } else {
        corpus.labels.clone()
    };
    if options.neighbors >= labels.len() {
        warn!(neighbors = options.neighbors, documents = labels.len(), "fewer documents than requested neighbours");
    }

    let mut tallies = BTreeMap::new();
    for &doc in docs {
        let row = corpus.similarity_row(&CosineSimilarity, doc)?;
        let tally = top_similar(&row, &labels, options.neighbors)?;
        info!(doc, neighbors = tally.total(), labels = tally.len(), "neighbour labels tallied");

        if let Some(dir) = out_dir {
            let mut writer = create(&tally_csv_path(dir, doc))?;
            report::write_tally_csv(&mut writer, &tally)?;
            writer.flush()?;
        }
        tallies.insert(doc, tally);
    }
    Ok(tallies)
}

pub fn topic_runs(models: &[TopicModel], top_n: usize) -> Result<Vec<TopicRun>> {
    models
        .iter()
        .map(|model| {
            Ok(TopicRun {
                components: model.topic_count(),
                topics: top_terms(&model.topic_terms, &model.terms, top_n)?,
            })
        })
        .collect()
}

/// Copy of the model with `components` topics carrying `labels`.
pub fn labeled_model(models: &[TopicModel], components: usize, labels: &TopicLabels) -> Result<TopicModel> {
    let model = models
        .iter()
        .find(|m| m.topic_count() == components)
        .ok_or_else(|| AnalysisError::InvalidInput(format!("no model with {components} topics")))?;
    let mut labeled = model.clone();
    labeled.topic_labels = Some(labels.labels().map(String::from).collect());
    labeled.validate()?;
    Ok(labeled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_breakdown_options_precedence() {
        let config = AnalysisConfig {
            major_threshold_percent: 20.0,
            scale: Scale::Percent,
            top_terms: 4,
            ..AnalysisConfig::default()
        };
        let from_config = BreakdownOptions::resolve(&config, None, false);
        assert_eq!(from_config.threshold_percent, 20.0);
        assert_eq!(from_config.scale, Scale::Percent);
        assert_eq!(from_config.top_terms, 4);

        let from_flags = BreakdownOptions::resolve(&config, Some(5.0), true);
        assert_eq!(from_flags.threshold_percent, 5.0);
        assert_eq!(from_flags.scale, Scale::Fraction);
    }

    #[test]
    fn test_scale_from_config_without_flag() {
        let config = AnalysisConfig {
            scale: Scale::Fraction,
            ..AnalysisConfig::default()
        };
        assert_eq!(BreakdownOptions::resolve(&config, None, false).scale, Scale::Fraction);
    }

    #[test]
    fn test_similar_options_precedence() {
        let config = AnalysisConfig {
            neighbors: 7,
            ..AnalysisConfig::default()
        };
        assert_eq!(SimilarOptions::resolve(&config, None, false).neighbors, 7);
        assert_eq!(SimilarOptions::resolve(&config, Some(3), true), SimilarOptions { neighbors: 3, general: true });
    }

    #[test]
    fn test_top_words_joined_with_slashes() {
        let words = top_words(&strings(&["space", "religion"]), &[strings(&["nasa", "orbit"]), strings(&["god"])]);
        assert_eq!(words["space"], "nasa / orbit");
        assert_eq!(words["religion"], "god");
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_report_paths() {
        let dir = Path::new("out");
        assert_eq!(breakdown_csv_path(dir, 12), Path::new("out/doc12_data.csv"));
        assert_eq!(tally_csv_path(dir, 3), Path::new("out/document_3_data.csv"));
    }

    #[test]
    fn test_labeled_model_needs_matching_topic_count() {
        let model: TopicModel = serde_json::from_str(
            r#"{"terms": ["a", "b"], "topic_terms": [[1, 0], [0, 1]], "doc_topics": []}"#,
        )
        .unwrap();
        let labels = TopicLabels::new()
            .with_label("first", &strings(&["a"]))
            .unwrap()
            .with_label("second", &strings(&["b"]))
            .unwrap();

        let labeled = labeled_model(std::slice::from_ref(&model), 2, &labels).unwrap();
        assert_eq!(labeled.labels(), strings(&["first", "second"]));
        assert!(labeled_model(&[model], 3, &labels).is_err());
    }
}
