use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::categories::newsgroup_from_path;
use crate::error::{ensure_len, AnalysisError, Result};
use crate::matrix::WeightMatrix;
use crate::similarity::SimilarityProvider;

/// A fitted topic model as written by the factorization pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicModel {
    pub terms: Vec<String>,
    pub topic_terms: WeightMatrix, // Topics x Terms
    pub doc_topics: WeightMatrix,  // Documents x Topics
    #[serde(default)]
    pub topic_labels: Option<Vec<String>>,
}

impl TopicModel {
    pub fn from_file(path: &Path) -> Result<Self> {
        let model: TopicModel = serde_json::from_str(&fs::read_to_string(path)?)?;
        model.validate()?;
        info!(
            path = %path.display(),
            topics = model.topic_count(),
            documents = model.doc_topics.row_count(),
            terms = model.terms.len(),
            "loaded topic model"
        );
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_len("topic-term columns", self.terms.len(), self.topic_terms.column_count())?;
        if self.doc_topics.row_count() > 0 {
            ensure_len("document-topic columns", self.topic_count(), self.doc_topics.column_count())?;
        }
        if let Some(labels) = &self.topic_labels {
            ensure_len("topic labels", self.topic_count(), labels.len())?;
        }
        Ok(())
    }

    pub fn topic_count(&self) -> usize {
        self.topic_terms.row_count()
    }

    /// Stored labels, or `topic_<n>` names when the model was never labeled.
    pub fn labels(&self) -> Vec<String> {
        match &self.topic_labels {
            Some(labels) => labels.clone(),
            None => (0..self.topic_count()).map(|i| format!("topic_{i}")).collect(),
        }
    }
}

/// Vectorized corpus with one category label per document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(default)]
    pub doc_terms: Option<WeightMatrix>,
    /// Precomputed document-by-document similarity, used instead of `doc_terms` when present.
    #[serde(default)]
    pub similarity: Option<WeightMatrix>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Corpus file paths such as `train/sci.space/60804`; the newsgroup
    /// directory becomes the label when `labels` is empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filenames: Vec<String>,
}

impl Corpus {
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut corpus: Corpus = serde_json::from_str(&fs::read_to_string(path)?)?;
        corpus.labels_from_filenames()?;
        corpus.validate()?;
        info!(path = %path.display(), documents = corpus.labels.len(), "loaded corpus");
        Ok(corpus)
    }

    /// Fills `labels` from `filenames` when no labels were given.
    pub fn labels_from_filenames(&mut self) -> Result<()> {
        if !self.labels.is_empty() || self.filenames.is_empty() {
            return Ok(());
        }
        self.labels = self
            .filenames
            .iter()
            .map(|path| {
                newsgroup_from_path(path)
                    .map(String::from)
                    .ok_or_else(|| AnalysisError::InvalidInput(format!("no newsgroup directory in {path}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.filenames.is_empty() {
            ensure_len("document filenames", self.labels.len(), self.filenames.len())?;
        }
        if let Some(doc_terms) = &self.doc_terms {
            ensure_len("document-term rows", self.labels.len(), doc_terms.row_count())?;
            ensure_len("document-term columns", self.terms.len(), doc_terms.column_count())?;
        }
        if let Some(similarity) = &self.similarity {
            ensure_len("similarity rows", self.labels.len(), similarity.row_count())?;
            ensure_len("similarity columns", self.labels.len(), similarity.column_count())?;
        }
        if self.doc_terms.is_none() && self.similarity.is_none() {
            return Err(AnalysisError::InvalidInput(
                "corpus needs either doc_terms or similarity".to_string(),
            ));
        }
        Ok(())
    }

    pub fn similarity_row<S: SimilarityProvider>(&self, provider: &S, document: usize) -> Result<Vec<f64>> {
        match (&self.similarity, &self.doc_terms) {
            (Some(similarity), _) => Ok(similarity.try_row(document)?.to_vec()),
            (None, Some(doc_terms)) => provider.similarity_row(doc_terms, document),
            (None, None) => Err(AnalysisError::InvalidInput(
                "corpus needs either doc_terms or similarity".to_string(),
            )),
        }
    }

    pub fn document_terms(&self, document: usize) -> Result<&[f64]> {
        self.doc_terms
            .as_ref()
            .ok_or_else(|| AnalysisError::InvalidInput("corpus has no doc_terms".to_string()))?
            .try_row(document)
    }
}
