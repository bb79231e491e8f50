use serde::{Deserialize, Serialize};

use crate::error::{ensure_len, AnalysisError, Result};

/// Dense row-major matrix of weights, rectangular by construction.
///
/// Rows are topics or documents depending on where the matrix came from:
/// a topic-term matrix has one row per topic, a document-topic matrix one
/// row per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct WeightMatrix {
    rows: Vec<Vec<f64>>,
    columns: usize,
}

impl WeightMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        for row in &rows {
            ensure_len("matrix row", columns, row.len())?;
        }
        Ok(WeightMatrix { rows, columns })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Like [`row`](Self::row) but reports the bad index as an error.
    pub fn try_row(&self, index: usize) -> Result<&[f64]> {
        self.row(index).ok_or(AnalysisError::IndexOutOfRange {
            what: "matrix rows",
            index,
            len: self.rows.len(),
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

impl TryFrom<Vec<Vec<f64>>> for WeightMatrix {
    type Error = AnalysisError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        WeightMatrix::from_rows(rows)
    }
}

impl From<WeightMatrix> for Vec<Vec<f64>> {
    fn from(matrix: WeightMatrix) -> Self {
        matrix.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rectangular() {
        let m = WeightMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.row_count(), 3);
        assert_eq!(m.column_count(), 2);
        assert_eq!(m.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(m.row(3), None);
    }

    #[test]
    fn test_from_rows_ragged_fails() {
        let err = WeightMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::ShapeMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_empty_matrix() {
        let m = WeightMatrix::from_rows(Vec::new()).unwrap();
        assert_eq!(m.row_count(), 0);
        assert_eq!(m.column_count(), 0);
    }

    #[test]
    fn test_try_row_out_of_range() {
        let m = WeightMatrix::from_rows(vec![vec![1.0]]).unwrap();
        assert!(matches!(
            m.try_row(4),
            Err(AnalysisError::IndexOutOfRange { index: 4, len: 1, .. })
        ));
    }

    #[test]
    fn test_deserialize_validates_shape() {
        let ok: WeightMatrix = serde_json::from_str("[[0.5, 0.5], [1.0, 0.0]]").unwrap();
        assert_eq!(ok.row_count(), 2);

        let ragged: std::result::Result<WeightMatrix, _> = serde_json::from_str("[[0.5, 0.5], [1.0]]");
        assert!(ragged.is_err());
    }
}
