use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    utils::math::vector::{SparseVec, Weight},
    vectorizer::{corpus::Corpus, term::TermFrequency, vocabulary::Vocabulary},
};

/// Row normalization applied after TF-IDF weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

/// Fitting and weighting parameters.
/// The defaults reproduce a textbook smoothed TF-IDF with L2 rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TFIDFOptions {
    /// drop terms found in fewer documents
    pub min_df: u64,
    /// drop terms found in more than this share of documents (0.0, 1.0]
    pub max_df: f64,
    /// keep only the most frequent terms over the corpus
    pub max_features: Option<usize>,
    /// use 1 + ln(tf) instead of raw counts
    pub sublinear_tf: bool,
    /// add one to document counts, as if one extra document held every term
    pub smooth_idf: bool,
    pub norm: Norm,
}

impl Default for TFIDFOptions {
    fn default() -> Self {
        Self {
            min_df: 1,
            max_df: 1.0,
            max_features: None,
            sublinear_tf: false,
            smooth_idf: true,
            norm: Norm::L2,
        }
    }
}

impl TFIDFOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(Error::InvalidOptions("min_df must be at least 1".into()));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::InvalidOptions(format!(
                "max_df must be in (0.0, 1.0], got {}",
                self.max_df
            )));
        }
        if self.max_features == Some(0) {
            return Err(Error::InvalidOptions("max_features must be positive".into()));
        }
        Ok(())
    }
}

/// TF-IDF calculation engine.
///
/// The vectorizer is generic over the engine so the weighting scheme can be
/// swapped without touching fitting, ranking or the artifact format.
pub trait TFIDFEngine<N>
where
    N: Weight,
{
    /// Choose the vocabulary columns from corpus statistics.
    /// Returned terms are in column order.
    fn select_terms(corpus: &Corpus, options: &TFIDFOptions) -> Vec<Box<str>>;

    /// IDF weight for each term, in the given order
    fn idf_vec(corpus: &Corpus, terms: &[Box<str>], options: &TFIDFOptions) -> Vec<f64>;

    /// Weighted vector of one text in the vocabulary column space.
    /// Terms missing from the vocabulary contribute nothing.
    fn tf_idf_vec(freq: &TermFrequency, vocabulary: &Vocabulary, options: &TFIDFOptions) -> SparseVec<N>;
}

/// Default TF-IDF engine
/// - idf = ln((1 + n) / (1 + df)) + 1 (smoothed) or ln(n / df) + 1
/// - tf = raw count, or 1 + ln(count) when sublinear
/// - rows L2-normalized unless `Norm::None`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl DefaultTFIDFEngine {
    #[inline]
    pub fn idf(doc_num: u64, doc_freq: u64, smooth: bool) -> f64 {
        let (n, df) = if smooth {
            (doc_num as f64 + 1.0, doc_freq as f64 + 1.0)
        } else {
            (doc_num as f64, doc_freq as f64)
        };
        if df <= 0.0 || n <= 0.0 {
            return 1.0;
        }
        (n / df).ln() + 1.0
    }

    #[inline]
    pub fn tf(count: u64, sublinear: bool) -> f64 {
        if count == 0 {
            0.0
        } else if sublinear {
            1.0 + (count as f64).ln()
        } else {
            count as f64
        }
    }
}

impl<N> TFIDFEngine<N> for DefaultTFIDFEngine
where
    N: Weight,
{
    fn select_terms(corpus: &Corpus, options: &TFIDFOptions) -> Vec<Box<str>> {
        let max_doc_count = options.max_df * corpus.get_doc_num() as f64;
        let mut kept: Vec<(&str, u64)> = corpus
            .iter()
            .filter(|(_, stat)| stat.doc_freq >= options.min_df && stat.doc_freq as f64 <= max_doc_count)
            .map(|(term, stat)| (term, stat.occurrences))
            .collect();

        if let Some(limit) = options.max_features {
            if kept.len() > limit {
                // most frequent first, ties by term
                kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                kept.truncate(limit);
            }
        }

        let mut terms: Vec<Box<str>> = kept.into_iter().map(|(term, _)| Box::from(term)).collect();
        terms.sort_unstable();
        terms
    }

    fn idf_vec(corpus: &Corpus, terms: &[Box<str>], options: &TFIDFOptions) -> Vec<f64> {
        let doc_num = corpus.get_doc_num();
        terms
            .iter()
            .map(|term| Self::idf(doc_num, corpus.get_doc_freq(term), options.smooth_idf))
            .collect()
    }

    fn tf_idf_vec(freq: &TermFrequency, vocabulary: &Vocabulary, options: &TFIDFOptions) -> SparseVec<N> {
        let mut pairs: Vec<(u32, f64)> = Vec::with_capacity(freq.term_num());
        for (term, count) in freq.iter() {
            if let Some(col) = vocabulary.column(term) {
                let weight = Self::tf(count, options.sublinear_tf) * vocabulary.idf(col);
                pairs.push((col as u32, weight));
            }
        }
        let scale = match options.norm {
            Norm::L2 => {
                let norm = pairs.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 { 1.0 / norm } else { 1.0 }
            }
            Norm::None => 1.0,
        };
        let pairs = pairs
            .into_iter()
            .map(|(col, w)| (col, N::from_f64(w * scale)))
            .collect();
        SparseVec::from_pairs(vocabulary.len(), pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothed_idf_matches_formula() {
        // n = 3, df = 1 -> ln(4 / 2) + 1
        let idf = DefaultTFIDFEngine::idf(3, 1, true);
        assert!((idf - (2.0f64.ln() + 1.0)).abs() < 1e-12);
        // a term in every document still keeps weight 1
        assert!((DefaultTFIDFEngine::idf(3, 3, true) - 1.0).abs() < 1e-12);
        assert!((DefaultTFIDFEngine::idf(4, 2, false) - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn sublinear_tf_dampens_counts() {
        assert_eq!(DefaultTFIDFEngine::tf(0, true), 0.0);
        assert_eq!(DefaultTFIDFEngine::tf(1, true), 1.0);
        assert_eq!(DefaultTFIDFEngine::tf(4, false), 4.0);
        assert!(DefaultTFIDFEngine::tf(4, true) < 4.0);
    }

    #[test]
    fn options_reject_out_of_range_values() {
        assert!(TFIDFOptions::default().validate().is_ok());
        let bad = TFIDFOptions { min_df: 0, ..Default::default() };
        assert!(bad.validate().is_err());
        let bad = TFIDFOptions { max_df: 1.5, ..Default::default() };
        assert!(bad.validate().is_err());
        let bad = TFIDFOptions { max_features: Some(0), ..Default::default() };
        assert!(bad.validate().is_err());
    }
}
