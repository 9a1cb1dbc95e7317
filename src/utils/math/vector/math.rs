use std::cmp::Ordering;

use super::{SparseVec, SparseView, Weight};

impl<'a, N> SparseView<'a, N>
where
    N: Weight,
{
    /// Dot product by merging the two sorted index lists.
    /// O(nnz(self) + nnz(other)), accumulated in f64.
    #[inline]
    pub fn dot(&self, other: &SparseView<'_, N>) -> f64 {
        debug_assert_eq!(
            self.len, other.len,
            "Vectors must be of the same length to compute dot product."
        );
        let (a_inds, a_vals) = (self.inds, self.vals);
        let (b_inds, b_vals) = (other.inds, other.vals);
        let mut i = 0;
        let mut j = 0;
        let mut result = 0_f64;
        while i < a_inds.len() && j < b_inds.len() {
            match a_inds[i].cmp(&b_inds[j]) {
                Ordering::Equal => {
                    let a: f64 = a_vals[i].into();
                    let b: f64 = b_vals[j].into();
                    result += a * b;
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        result
    }

    #[inline]
    pub fn norm_sq(&self) -> f64 {
        self.vals
            .iter()
            .map(|&v| {
                let v: f64 = v.into();
                v * v
            })
            .sum()
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Cosine similarity with precomputed norms.
    /// cosθ = A・B / (|A||B|), 0 when either norm is zero, clamped to [0, 1].
    #[inline]
    pub fn cosine_with_norms(&self, self_norm: f64, other: &SparseView<'_, N>, other_norm: f64) -> f64 {
        if self_norm <= 0.0 || other_norm <= 0.0 || self.inds.is_empty() || other.inds.is_empty() {
            return 0.0;
        }
        let score = self.dot(other) / (self_norm * other_norm);
        if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        }
    }

    #[inline]
    pub fn cosine(&self, other: &SparseView<'_, N>) -> f64 {
        self.cosine_with_norms(self.norm(), other, other.norm())
    }
}

impl<N> SparseVec<N>
where
    N: Weight,
{
    #[inline]
    pub fn dot(&self, other: &SparseVec<N>) -> f64 {
        self.view().dot(&other.view())
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.view().norm()
    }

    #[inline]
    pub fn cosine(&self, other: &SparseVec<N>) -> f64 {
        self.view().cosine(&other.view())
    }

    /// Scale to unit L2 norm. The zero vector stays zero.
    pub fn normalize_l2(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in self.vals.iter_mut() {
                let value: f64 = (*v).into();
                *v = N::from_f64(value / norm);
            }
        }
    }
}
