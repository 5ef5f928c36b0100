use super::error::{IndexError, IndexResult};
use crate::matcher::similarity::dot;

/// Row-major `rows x dim` matrix of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Builds a matrix from `(id, vector)` rows, checking that all share one dimension.
    ///
    /// Vectors are stored as given; they are expected to be unit-norm already.
    pub fn from_rows<'a, I>(rows: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = (u64, &'a [f32])>,
    {
        let mut data = Vec::new();
        let mut count = 0usize;
        let mut dim: Option<usize> = None;

        for (id, row) in rows {
            let expected = *dim.get_or_insert(row.len());
            if expected == 0 {
                return Err(IndexError::ZeroDimension);
            }
            if row.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    id,
                    expected,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
            count += 1;
        }

        Ok(Self {
            data,
            rows: count,
            dim: dim.unwrap_or(0),
        })
    }

    /// An empty matrix with no rows.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            dim: 0,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns row `index`, or `None` when out of range.
    #[inline]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.dim.max(1)).take(self.rows)
    }

    /// `matrix · query`, one score per row.
    ///
    /// Callers check `query.len() == self.dim()` first.
    pub fn dot_all(&self, query: &[f32]) -> Vec<f32> {
        self.iter_rows().map(|row| dot(row, query)).collect()
    }

    /// Scores only the rows listed in `indices`, in the given order.
    pub fn dot_rows(&self, query: &[f32], indices: &[usize]) -> Vec<f32> {
        indices
            .iter()
            .map(|&i| self.row(i).map_or(0.0, |row| dot(row, query)))
            .collect()
    }

    /// Raw storage, row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
