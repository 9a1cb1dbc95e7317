pub mod math;

use std::fmt::Debug;

use num::Float;
use serde::{Deserialize, Serialize};

use crate::utils::sort::radix_sort_u32_soa;

/// Element type of TF-IDF vectors.
/// Weights are accumulated in `f64` and stored as `Self`.
pub trait Weight: Float + Into<f64> + Send + Sync + Debug + 'static {
    #[inline]
    fn from_f64(value: f64) -> Self {
        num::cast(value).unwrap_or_else(Self::zero)
    }
}

impl<T> Weight for T where T: Float + Into<f64> + Send + Sync + Debug + 'static {}

/// SparseVec treats zero as the implicit element.
///
/// Holds column indices and values side by side.
/// `inds` is strictly ascending and `vals` never contains zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N> {
    len: usize,
    inds: Vec<u32>,
    vals: Vec<N>,
}

/// Borrowed sparse vector, shared by `SparseVec` and matrix rows.
#[derive(Debug, Clone, Copy)]
pub struct SparseView<'a, N> {
    pub(crate) len: usize,
    pub(crate) inds: &'a [u32],
    pub(crate) vals: &'a [N],
}

impl<N> SparseVec<N>
where
    N: Weight,
{
    /// All-zero vector of dimension `len`
    #[inline]
    pub fn zeros(len: usize) -> Self {
        SparseVec {
            len,
            inds: Vec::new(),
            vals: Vec::new(),
        }
    }

    /// Build from unsorted `(column, value)` pairs.
    ///
    /// Duplicate columns are summed, zero results and columns `>= len` are dropped.
    pub fn from_pairs(len: usize, pairs: Vec<(u32, N)>) -> Self {
        let (mut inds, mut vals): (Vec<u32>, Vec<N>) = pairs
            .into_iter()
            .filter(|(idx, _)| (*idx as usize) < len)
            .unzip();
        radix_sort_u32_soa(&mut inds, &mut vals);

        let mut out_inds: Vec<u32> = Vec::with_capacity(inds.len());
        let mut out_vals: Vec<N> = Vec::with_capacity(vals.len());
        for (idx, val) in inds.into_iter().zip(vals) {
            match out_inds.last() {
                Some(&last) if last == idx => {
                    if let Some(acc) = out_vals.last_mut() {
                        *acc = *acc + val;
                    }
                }
                _ => {
                    out_inds.push(idx);
                    out_vals.push(val);
                }
            }
        }
        // summed duplicates may cancel out
        let mut keep = out_vals.iter().map(|v| !v.is_zero());
        out_inds.retain(|_| keep.next().unwrap_or(false));
        out_vals.retain(|v| !v.is_zero());

        SparseVec {
            len,
            inds: out_inds,
            vals: out_vals,
        }
    }

    /// Logical dimension
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    /// True when no element is non-zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.inds.is_empty()
    }

    /// Value at `index`, zero when not stored.
    /// Returns `None` when `index` is out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<N> {
        if index >= self.len {
            return None;
        }
        match self.inds.binary_search(&(index as u32)) {
            Ok(pos) => Some(self.vals[pos]),
            Err(_) => Some(N::zero()),
        }
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.inds
    }

    #[inline]
    pub fn values(&self) -> &[N] {
        &self.vals
    }


    #[inline]
    pub fn view(&self) -> SparseView<'_, N> {
        SparseView {
            len: self.len,
            inds: &self.inds,
            vals: &self.vals,
        }
    }

    pub(crate) fn into_parts(self) -> (usize, Vec<u32>, Vec<N>) {
        (self.len, self.inds, self.vals)
    }
}

impl<'a, N> SparseView<'a, N>
where
    N: Weight,
{
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }


    pub fn to_sparse_vec(&self) -> SparseVec<N> {
        SparseVec {
            len: self.len,
            inds: self.inds.to_vec(),
            vals: self.vals.to_vec(),
        }
    }
}
