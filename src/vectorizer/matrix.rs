use crate::{
    error::{Error, Result},
    utils::math::vector::{SparseVec, SparseView, Weight},
};

/// Document-term matrix in compressed sparse row layout.
///
/// Row `i` belongs to the `i`-th document it was built from. Row L2 norms are
/// cached at build time so ranking only pays for the dot products.
/// `vocab_fingerprint` identifies the vocabulary that produced the columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTermMatrix<N> {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<N>,
    norms: Vec<f64>,
    vocab_fingerprint: u32,
}

impl<N> DocumentTermMatrix<N>
where
    N: Weight,
{
    /// Matrix with no rows
    pub fn empty(n_cols: usize, vocab_fingerprint: u32) -> Self {
        Self {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
            norms: Vec::new(),
            vocab_fingerprint,
        }
    }

    /// Stack rows in order. Every row must have `n_cols` columns.
    pub fn from_rows(n_cols: usize, rows: Vec<SparseVec<N>>, vocab_fingerprint: u32) -> Result<Self> {
        let nnz: usize = rows.iter().map(|row| row.nnz()).sum();
        let mut matrix = Self::empty(n_cols, vocab_fingerprint);
        matrix.indptr.reserve(rows.len());
        matrix.indices.reserve(nnz);
        matrix.data.reserve(nnz);
        matrix.norms.reserve(rows.len());

        for row in rows {
            if row.len() != n_cols {
                return Err(Error::DimensionMismatch {
                    expected: n_cols,
                    found: row.len(),
                });
            }
            matrix.norms.push(row.norm());
            let (_, inds, vals) = row.into_parts();
            matrix.indices.extend(inds);
            matrix.data.extend(vals);
            matrix.indptr.push(matrix.indices.len());
        }
        Ok(matrix)
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.norms.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Stored non-zero entries over all rows
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.norms.is_empty()
    }

    #[inline]
    pub fn vocab_fingerprint(&self) -> u32 {
        self.vocab_fingerprint
    }

    #[inline]
    pub fn row(&self, row: usize) -> Option<SparseView<'_, N>> {
        if row >= self.n_rows() {
            return None;
        }
        let (start, end) = (self.indptr[row], self.indptr[row + 1]);
        Some(SparseView {
            len: self.n_cols,
            inds: &self.indices[start..end],
            vals: &self.data[start..end],
        })
    }

    /// Cached L2 norm of a row, 0.0 when out of range
    #[inline]
    pub fn row_norm(&self, row: usize) -> f64 {
        self.norms.get(row).copied().unwrap_or(0.0)
    }

    pub fn rows(&self) -> impl Iterator<Item = SparseView<'_, N>> + '_ {
        (0..self.n_rows()).filter_map(move |row| self.row(row))
    }
}
