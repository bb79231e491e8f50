use counter::Counter;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{ensure_len, Result};
use crate::matrix::WeightMatrix;
use crate::rank::rank;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub index: usize,
    pub score: f64,
}

/// The `top_n` documents closest to the reference document of `similarity_row`.
///
/// The highest-ranked entry is taken to be the reference document itself and
/// skipped. When another document has exactly the same score and a lower
/// index, that document is skipped instead.
pub fn closest_documents(similarity_row: &[f64], top_n: usize) -> Vec<Neighbor> {
    rank(similarity_row, None)
        .into_iter()
        .skip(1)
        .take(top_n)
        .map(|index| Neighbor {
            index,
            score: similarity_row[index],
        })
        .collect()
}

/// Label counts among a neighbour set, most frequent first.
///
/// Labels with equal counts stay in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTally {
    counts: Vec<(String, usize)>,
}

impl LabelTally {
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counter: Counter<&str> = Counter::new();
        let mut first_seen: Vec<&str> = Vec::new();
        for label in labels {
            if counter[&label] == 0 {
                first_seen.push(label);
            }
            counter[&label] += 1;
        }

        let mut counts: Vec<(String, usize)> = first_seen
            .into_iter()
            .map(|label| (label.to_string(), counter[&label]))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        LabelTally { counts }
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, c)| (l.as_str(), *c))
    }
}

impl Serialize for LabelTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Tallies the labels of the `top_n` documents most similar to the reference.
pub fn top_similar(similarity_row: &[f64], labels: &[String], top_n: usize) -> Result<LabelTally> {
    ensure_len("document labels", similarity_row.len(), labels.len())?;
    let neighbors = closest_documents(similarity_row, top_n);
    let tally = LabelTally::from_labels(neighbors.iter().map(|n| labels[n.index].as_str()));
    debug!(neighbors = neighbors.len(), labels = tally.len(), "tallied neighbour labels");
    Ok(tally)
}

/// Source of document-to-document similarity scores.
pub trait SimilarityProvider {
    /// Similarity of document `reference` to every document of `doc_terms`,
    /// itself included.
    fn similarity_row(&self, doc_terms: &WeightMatrix, reference: usize) -> Result<Vec<f64>>;
}

/// Cosine similarity over document-term rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Returns 0 when either vector has zero length.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (norm_a, norm_b) = (norm(a), norm(b));
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

impl SimilarityProvider for CosineSimilarity {
    fn similarity_row(&self, doc_terms: &WeightMatrix, reference: usize) -> Result<Vec<f64>> {
        let target = doc_terms.try_row(reference)?;
        let self_match = if norm(target) == 0.0 { 0.0 } else { 1.0 };
        Ok(doc_terms
            .rows()
            .enumerate()
            .map(|(i, row)| {
                if i == reference {
                    self_match
                } else {
                    cosine_similarity(target, row)
                }
            })
            .collect())
    }
}
