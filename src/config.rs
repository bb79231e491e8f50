use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::breakdown::Scale;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_terms: usize,
    /// In percent regardless of `scale`.
    pub major_threshold_percent: f64,
    pub scale: Scale,
    /// Neighbours tallied per reference document.
    pub neighbors: usize,
    /// Shared top terms a previous label needs to exceed to be suggested.
    pub min_shared_terms: usize,
    pub frequent_terms: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            top_terms: 10,
            major_threshold_percent: 10.0,
            scale: Scale::Percent,
            neighbors: 100,
            min_shared_terms: 2,
            frequent_terms: 10,
        }
    }
}

impl AnalysisConfig {
    /// Reads a JSON config file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
