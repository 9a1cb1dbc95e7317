use std::{
    cmp::Ordering,
    fmt::{self, Debug},
};

use rayon::prelude::*;
use tracing::debug;

use crate::{
    error::{Error, Result},
    utils::math::vector::{SparseVec, Weight},
    vectorizer::matrix::DocumentTermMatrix,
};

/// Result count when the caller does not ask for one
pub const DEFAULT_TOP_K: usize = 5;

/// One ranked row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEntry {
    /// row index in the document-term matrix
    pub row: usize,
    /// cosine similarity in [0, 1]
    pub score: f64,
}

/// Structure to store search results
#[derive(Clone, PartialEq, Default)]
pub struct Hits {
    pub list: Vec<HitEntry>,
}

impl Hits {
    pub fn new(list: Vec<HitEntry>) -> Self {
        Hits { list }
    }

    /// Keep the `k` best entries, sorted by descending score then ascending row.
    /// NaN scores are dropped. Only the kept entries are fully sorted.
    pub fn select_top_k(&mut self, k: usize) -> &mut Self {
        self.list.retain(|hit| !hit.score.is_nan());
        if k == 0 {
            self.list.clear();
            return self;
        }
        if k < self.list.len() {
            self.list.select_nth_unstable_by(k - 1, by_score_then_row);
            self.list.truncate(k);
        }
        self.list.sort_unstable_by(by_score_then_row);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitEntry> {
        self.list.iter()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.list.iter().map(|hit| hit.score).collect()
    }

    pub fn rows(&self) -> Vec<usize> {
        self.list.iter().map(|hit| hit.row).collect()
    }
}

fn by_score_then_row(a: &HitEntry, b: &HitEntry) -> Ordering {
    b.score.total_cmp(&a.score).then(a.row.cmp(&b.row))
}

impl IntoIterator for Hits {
    type Item = HitEntry;
    type IntoIter = std::vec::IntoIter<HitEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl Debug for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for hit in &self.list {
                writeln!(f, "    row {}: {:.6}", hit.row, hit.score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list()
                .entries(self.list.iter().map(|hit| (hit.row, hit.score)))
                .finish()
        }
    }
}

/// Cosine ranking over a document-term matrix.
///
/// Borrows the matrix read-only; each call allocates only its own score list,
/// so one ranker can serve concurrent queries.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker<'a, N> {
    matrix: &'a DocumentTermMatrix<N>,
}

impl<'a, N> SimilarityRanker<'a, N>
where
    N: Weight,
{
    pub fn new(matrix: &'a DocumentTermMatrix<N>) -> Self {
        Self { matrix }
    }

    /// Score every row against the query, in row order
    pub fn scores(&self, query: &SparseVec<N>) -> Result<Vec<f64>> {
        if query.len() != self.matrix.n_cols() {
            return Err(Error::DimensionMismatch {
                expected: self.matrix.n_cols(),
                found: query.len(),
            });
        }
        let q = query.view();
        let q_norm = q.norm();
        if q_norm <= 0.0 {
            return Ok(vec![0.0; self.matrix.n_rows()]);
        }
        Ok((0..self.matrix.n_rows())
            .into_par_iter()
            .map(|row| match self.matrix.row(row) {
                Some(doc) => q.cosine_with_norms(q_norm, &doc, self.matrix.row_norm(row)),
                None => 0.0,
            })
            .collect())
    }

    /// Top `k` rows by cosine similarity to the query.
    ///
    /// Returns `min(k, rows)` entries with non-increasing scores; ties keep
    /// row order. Zero-score rows are kept, an all-unknown query ranks every
    /// row at 0.0.
    ///
    /// # Errors
    /// `DimensionMismatch` when the query is not in the matrix column space.
    pub fn rank(&self, query: &SparseVec<N>, k: usize) -> Result<Hits> {
        let scores = self.scores(query)?;
        let mut hits = Hits::new(
            scores
                .into_iter()
                .enumerate()
                .map(|(row, score)| HitEntry { row, score })
                .collect(),
        );
        hits.select_top_k(k);
        debug!(
            rows = self.matrix.n_rows(),
            query_terms = query.nnz(),
            returned = hits.len(),
            "ranked documents"
        );
        Ok(hits)
    }
}
