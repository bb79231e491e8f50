use tracing::debug;

use crate::error::{ensure_len, Result};
use crate::matrix::WeightMatrix;
use crate::rank::rank;

/// Top `top_n` term names of every topic row, heaviest first.
///
/// `term_names` must have one entry per matrix column. A matrix without
/// rows has no topics and yields an empty result.
pub fn top_terms(matrix: &WeightMatrix, term_names: &[String], top_n: usize) -> Result<Vec<Vec<String>>> {
    if matrix.row_count() == 0 {
        return Ok(Vec::new());
    }
    ensure_len("term names", matrix.column_count(), term_names.len())?;

    let topics: Vec<Vec<String>> = matrix
        .rows()
        .map(|row| {
            rank(row, Some(top_n))
                .into_iter()
                .map(|i| term_names[i].clone())
                .collect()
        })
        .collect();

    debug!(topics = topics.len(), top_n, "extracted top terms");
    Ok(topics)
}

/// Terms present in one document row (non-zero weight), heaviest first.
///
/// Weights are rounded to two decimals. Used for the per-document
/// `word,frequency` charts.
pub fn frequent_terms(row: &[f64], term_names: &[String], top_n: usize) -> Result<Vec<(String, f64)>> {
    ensure_len("term names", row.len(), term_names.len())?;

    let present: Vec<usize> = (0..row.len()).filter(|&i| row[i] != 0.0).collect();
    let values: Vec<f64> = present.iter().map(|&i| row[i]).collect();

    Ok(rank(&values, Some(top_n))
        .into_iter()
        .map(|j| {
            let i = present[j];
            (term_names[i].clone(), (row[i] * 100.0).round() / 100.0)
        })
        .collect())
}
