pub mod analyzer;
pub mod corpus;
pub mod evaluate;
pub mod matrix;
pub mod serde;
pub mod term;
pub mod tfidf;
pub mod vocabulary;

use std::marker::PhantomData;

use ::serde::{Deserialize, Serialize};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    error::Result,
    utils::math::vector::{SparseVec, Weight},
    vectorizer::{
        analyzer::Analyzer,
        corpus::Corpus,
        matrix::DocumentTermMatrix,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine, TFIDFOptions},
        vocabulary::Vocabulary,
    },
};

/// Identity of the texts a vectorizer was fitted on.
/// Used to notice when a loaded document set drifts from the fitted one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStamp {
    pub doc_num: u64,
    pub checksum: u32,
}

impl CorpusStamp {
    pub fn from_texts<T>(texts: &[T]) -> Self
    where
        T: AsRef<str>,
    {
        let mut hasher = crc32fast::Hasher::new();
        for text in texts {
            hasher.update(text.as_ref().as_bytes());
            hasher.update(&[0]);
        }
        Self {
            doc_num: texts.len() as u64,
            checksum: hasher.finalize(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TFIDFVectorizer<N = f32, E = DefaultTFIDFEngine>
where
    N: Weight,
    E: TFIDFEngine<N>,
{
    /// query/document analyzer, identical for both sides
    pub analyzer: Analyzer,
    pub options: TFIDFOptions,
    /// fitted columns and IDF weights
    pub vocabulary: Vocabulary,
    /// texts seen at fit time
    pub corpus_stamp: CorpusStamp,
    _marker: PhantomData<(N, E)>,
}

impl<N, E> TFIDFVectorizer<N, E>
where
    N: Weight,
    E: TFIDFEngine<N> + Send + Sync,
{
    /// Assemble a vectorizer from an existing vocabulary
    pub fn from_vocabulary(
        vocabulary: Vocabulary,
        analyzer: Analyzer,
        options: TFIDFOptions,
        corpus_stamp: CorpusStamp,
    ) -> Self {
        Self {
            analyzer,
            options,
            vocabulary,
            corpus_stamp,
            _marker: PhantomData,
        }
    }

    /// Fit the vocabulary and IDF weights on a collection of texts.
    ///
    /// Texts are analyzed in parallel and the partial corpora merged.
    /// Columns are ordered alphabetically by term.
    pub fn fit<T>(texts: &[T], analyzer: Analyzer, options: TFIDFOptions) -> Result<Self>
    where
        T: AsRef<str> + Sync,
    {
        options.validate()?;
        let corpus = texts
            .par_iter()
            .fold(Corpus::new, |mut corpus, text| {
                corpus.add_doc(&analyzer.analyze(text.as_ref()));
                corpus
            })
            .reduce(Corpus::new, |mut left, right| {
                left.merge_corpus(&right);
                left
            });

        let terms = E::select_terms(&corpus, &options);
        let idf = E::idf_vec(&corpus, &terms, &options);
        let vocabulary = Vocabulary::new(terms, idf)?;
        info!(
            documents = corpus.get_doc_num(),
            distinct_terms = corpus.vocab_size(),
            columns = vocabulary.len(),
            "fitted tf-idf vocabulary"
        );

        Ok(Self::from_vocabulary(
            vocabulary,
            analyzer,
            options,
            CorpusStamp::from_texts(texts),
        ))
    }

    /// Map one text into the vocabulary column space.
    /// Unknown terms are dropped; a text without known terms gives the zero vector.
    pub fn transform(&self, text: &str) -> SparseVec<N> {
        let freq = self.analyzer.analyze(text);
        E::tf_idf_vec(&freq, &self.vocabulary, &self.options)
    }

    /// Transform every text and stack the rows in input order
    pub fn transform_batch<T>(&self, texts: &[T]) -> Result<DocumentTermMatrix<N>>
    where
        T: AsRef<str> + Sync,
    {
        let rows: Vec<SparseVec<N>> = texts
            .par_iter()
            .map(|text| self.transform(text.as_ref()))
            .collect();
        let matrix = DocumentTermMatrix::from_rows(self.vocabulary.len(), rows, self.fingerprint())?;
        debug!(rows = matrix.n_rows(), nnz = matrix.nnz(), "built document-term matrix");
        Ok(matrix)
    }

    /// Number of columns
    #[inline]
    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    #[inline]
    pub fn fingerprint(&self) -> u32 {
        self.vocabulary.fingerprint()
    }

    /// Check if the term is a vocabulary column
    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.column(term).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::tfidf::Norm;

    fn fit(texts: &[&str], options: TFIDFOptions) -> TFIDFVectorizer<f64> {
        TFIDFVectorizer::fit(texts, Analyzer::default(), options).unwrap()
    }

    #[test]
    fn fit_orders_columns_alphabetically() {
        let vectorizer = fit(&["rust tokio", "python data", "rust serde"], TFIDFOptions::default());
        let terms: Vec<&str> = vectorizer.vocabulary.terms().collect();
        assert_eq!(terms, vec!["data", "python", "rust", "serde", "tokio"]);
        assert_eq!(vectorizer.corpus_stamp.doc_num, 3);
    }

    #[test]
    fn rarer_terms_get_larger_idf() {
        let vectorizer = fit(&["rust tokio", "rust serde", "rust axum"], TFIDFOptions::default());
        let vocab = &vectorizer.vocabulary;
        let common = vocab.idf(vocab.column("rust").unwrap());
        let rare = vocab.idf(vocab.column("tokio").unwrap());
        assert!((common - 1.0).abs() < 1e-12);
        assert!(rare > common);
    }

    #[test]
    fn document_frequency_filters_apply() {
        let texts = ["rust tokio", "rust serde", "rust axum tokio"];
        let min_two = fit(&texts, TFIDFOptions { min_df: 2, ..Default::default() });
        assert_eq!(min_two.vocabulary.terms().collect::<Vec<_>>(), vec!["rust", "tokio"]);

        let no_common = fit(&texts, TFIDFOptions { max_df: 0.9, ..Default::default() });
        assert!(!no_common.contains_term("rust"));
        assert!(no_common.contains_term("axum"));

        let top_two = fit(&texts, TFIDFOptions { max_features: Some(2), ..Default::default() });
        assert_eq!(top_two.vocabulary.terms().collect::<Vec<_>>(), vec!["rust", "tokio"]);
    }

    #[test]
    fn transform_is_unit_length_and_ignores_unknown_terms() {
        let vectorizer = fit(&["rust tokio", "python data"], TFIDFOptions::default());
        let v = vectorizer.transform("Rust rust kubernetes");
        assert_eq!(v.len(), vectorizer.dim());
        assert_eq!(v.nnz(), 1);
        assert!((v.norm() - 1.0).abs() < 1e-12);

        let unknown = vectorizer.transform("kubernetes helm");
        assert!(unknown.is_zero());
    }

    #[test]
    fn transform_without_norm_keeps_raw_weights() {
        let options = TFIDFOptions { norm: Norm::None, ..Default::default() };
        let vectorizer = fit(&["rust go", "rust"], options);
        let v = vectorizer.transform("rust rust");
        // rust is in every document: idf 1, tf 2
        assert_eq!(v.get(vectorizer.vocabulary.column("rust").unwrap()), Some(2.0));
    }

    #[test]
    fn transform_batch_aligns_rows_with_input() {
        let texts = ["rust tokio", "", "python"];
        let vectorizer = fit(&texts, TFIDFOptions::default());
        let matrix = vectorizer.transform_batch(&texts).unwrap();
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.n_cols(), vectorizer.dim());
        assert_eq!(matrix.vocab_fingerprint(), vectorizer.fingerprint());
        assert_eq!(matrix.row(1).map(|r| r.nnz()), Some(0));
        assert_eq!(matrix.row(2).map(|r| r.to_sparse_vec()), Some(vectorizer.transform("python")));
    }

    #[test]
    fn invalid_options_fail_fit() {
        let result = TFIDFVectorizer::<f32>::fit(&["a1"], Analyzer::default(), TFIDFOptions { min_df: 0, ..Default::default() });
        assert!(result.is_err());
    }
}
