//! Summaries over fitted topic models and document similarity scores.
//!
//! Everything here works on matrices computed elsewhere: top terms per topic,
//! a per-document topic breakdown with an "others" bucket, label tallies of a
//! document's nearest neighbours, and the labeling flow that names topics.

pub mod breakdown;
pub mod categories;
pub mod commands;
pub mod config;
pub mod error;
pub mod labeling;
pub mod matrix;
pub mod models;
pub mod rank;
pub mod report;
pub mod similarity;
pub mod topics;

pub use breakdown::{breakdown, breakdown_all, Breakdown, BreakdownEntry, Scale, OTHERS_LABEL};
pub use categories::{general_category, Category};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use labeling::{label_models, suggest_label, LabelDiff, Prompter, TopicLabels, TopicRun};
pub use matrix::WeightMatrix;
pub use models::{Corpus, TopicModel};
pub use rank::rank;
pub use similarity::{closest_documents, top_similar, CosineSimilarity, LabelTally, Neighbor, SimilarityProvider};
pub use topics::{frequent_terms, top_terms};
