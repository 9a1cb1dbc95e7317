use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    catalog::Catalog,
    error::{Error, Result},
    vectorizer::{
        evaluate::scoring::{Hits, SimilarityRanker},
        matrix::DocumentTermMatrix,
        CorpusStamp, TFIDFVectorizer,
    },
};

/// One result row ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// 1-based position
    pub rank: usize,
    pub row: usize,
    pub title: String,
    pub category: String,
    pub country: String,
    pub hourly_rate: Option<f64>,
    pub link: String,
    pub score: f64,
    /// score as a percentage rounded to one decimal
    pub percent: f64,
}

/// Catalog, fitted vectorizer and the matrix of the catalog descriptions.
///
/// The matrix is built once at construction and only read afterwards, so a
/// shared `Recommender` serves any number of queries without locking.
#[derive(Debug)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    vectorizer: TFIDFVectorizer,
    matrix: DocumentTermMatrix<f32>,
}

impl Recommender {
    /// Vectorize every catalog description.
    ///
    /// Logs a warning when the vectorizer was fitted on different texts than
    /// the catalog now holds; the columns still line up, only the IDF
    /// weights may be stale.
    pub fn new(catalog: Arc<Catalog>, vectorizer: TFIDFVectorizer) -> Result<Self> {
        let descriptions = catalog.descriptions();
        let stamp = CorpusStamp::from_texts(&descriptions);
        if stamp != vectorizer.corpus_stamp {
            warn!(
                fitted_documents = vectorizer.corpus_stamp.doc_num,
                catalog_documents = stamp.doc_num,
                "catalog differs from the texts the vectorizer was fitted on"
            );
        }
        let matrix = vectorizer.transform_batch(&descriptions)?;
        info!(
            rows = matrix.n_rows(),
            columns = matrix.n_cols(),
            "built catalog matrix"
        );
        Self::from_parts(catalog, vectorizer, matrix)
    }

    /// Assemble from a matrix built elsewhere.
    /// The matrix must come from this vectorizer's vocabulary and hold one row per posting.
    pub fn from_parts(
        catalog: Arc<Catalog>,
        vectorizer: TFIDFVectorizer,
        matrix: DocumentTermMatrix<f32>,
    ) -> Result<Self> {
        if matrix.n_cols() != vectorizer.dim() {
            return Err(Error::DimensionMismatch {
                expected: vectorizer.dim(),
                found: matrix.n_cols(),
            });
        }
        if matrix.vocab_fingerprint() != vectorizer.fingerprint() {
            return Err(Error::VocabularyMismatch {
                matrix: matrix.vocab_fingerprint(),
                vectorizer: vectorizer.fingerprint(),
            });
        }
        if matrix.n_rows() != catalog.len() {
            return Err(Error::DimensionMismatch {
                expected: catalog.len(),
                found: matrix.n_rows(),
            });
        }
        Ok(Self {
            catalog,
            vectorizer,
            matrix,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &DocumentTermMatrix<f32> {
        &self.matrix
    }

    /// Rank catalog rows against a free-text query
    pub fn search(&self, query: &str, k: usize) -> Result<Hits> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let vector = self.vectorizer.transform(query);
        if vector.is_zero() {
            debug!(query, "query has no known terms");
        }
        SimilarityRanker::new(&self.matrix).rank(&vector, k)
    }

    /// Top `k` postings for a query, best first
    pub fn recommend(&self, query: &str, k: usize) -> Result<Vec<Recommendation>> {
        let hits = self.search(query, k)?;
        Ok(hits
            .iter()
            .enumerate()
            .filter_map(|(rank, hit)| {
                let posting = self.catalog.get(hit.row)?;
                Some(Recommendation {
                    rank: rank + 1,
                    row: hit.row,
                    title: posting.title.clone(),
                    category: posting.category.clone(),
                    country: posting.country.clone(),
                    hourly_rate: posting.hourly_rate,
                    link: posting.link.clone(),
                    score: hit.score,
                    percent: (hit.score * 1000.0).round() / 10.0,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::JobPosting,
        vectorizer::{analyzer::Analyzer, tfidf::TFIDFOptions},
    };

    fn posting(title: &str, description: &str) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            category: "Software".to_string(),
            country: "India".to_string(),
            hourly_rate: Some(25.0),
            link: format!("https://jobs.example/{title}"),
            description: description.to_string(),
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(vec![
            posting("rustacean", "rust backend services"),
            posting("pythonista", "python data pipelines"),
            posting("generalist", "rust python scripting"),
        ]))
    }

    fn recommender() -> Recommender {
        let catalog = catalog();
        let vectorizer = TFIDFVectorizer::fit(
            &catalog.descriptions(),
            Analyzer::default(),
            TFIDFOptions::default(),
        )
        .unwrap();
        Recommender::new(catalog, vectorizer).unwrap()
    }

    #[test]
    fn recommends_best_match_first() {
        let results = recommender().recommend("rust backend", 5).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "rustacean");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].title, "generalist");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(results[0].percent, (results[0].score * 1000.0).round() / 10.0);
    }

    #[test]
    fn blank_query_is_rejected() {
        assert!(matches!(recommender().recommend("   ", 5), Err(Error::EmptyQuery)));
    }

    #[test]
    fn unknown_terms_score_zero() {
        let results = recommender().recommend("kubernetes", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.score == 0.0 && r.percent == 0.0));
        assert_eq!(results[0].row, 0);
    }

    #[test]
    fn matrix_from_another_vocabulary_is_rejected() {
        let catalog = catalog();
        let vectorizer = TFIDFVectorizer::fit(
            &catalog.descriptions(),
            Analyzer::default(),
            TFIDFOptions::default(),
        )
        .unwrap();
        let other: TFIDFVectorizer = TFIDFVectorizer::fit(
            &["alpha beta", "gamma delta", "alpha gamma", "omega psi", "rust go"],
            Analyzer::default(),
            TFIDFOptions::default(),
        )
        .unwrap();
        let foreign = DocumentTermMatrix::empty(vectorizer.dim(), other.fingerprint());
        assert!(matches!(
            Recommender::from_parts(catalog, vectorizer, foreign),
            Err(Error::VocabularyMismatch { .. })
        ));
    }

    #[test]
    fn refitted_catalog_still_serves_queries() {
        let vectorizer = TFIDFVectorizer::fit(
            &["rust backend services", "python data pipelines"],
            Analyzer::default(),
            TFIDFOptions::default(),
        )
        .unwrap();
        let recommender = Recommender::new(catalog(), vectorizer).unwrap();
        // "scripting" is outside the fitted vocabulary; the generalist row keeps rust and python
        let results = recommender.recommend("python data", 3).unwrap();
        assert_eq!(results[0].title, "pythonista");
        assert_eq!(results[1].title, "generalist");
        assert!((results[0].score - (2.0f64 / 6.0).sqrt()).abs() < 1e-6);
        assert!((results[1].score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn matrix_with_wrong_column_count_is_rejected() {
        let catalog = catalog();
        let vectorizer: TFIDFVectorizer = TFIDFVectorizer::fit(
            &catalog.descriptions(),
            Analyzer::default(),
            TFIDFOptions::default(),
        )
        .unwrap();
        let dim = vectorizer.dim();
        let wide = DocumentTermMatrix::empty(dim + 1, vectorizer.fingerprint());
        assert!(matches!(
            Recommender::from_parts(catalog, vectorizer, wide),
            Err(Error::DimensionMismatch { expected, found }) if expected == dim && found == dim + 1
        ));
    }

    #[test]
    fn matrix_with_wrong_row_count_is_rejected() {
        let catalog = catalog();
        let vectorizer: TFIDFVectorizer = TFIDFVectorizer::fit(
            &catalog.descriptions(),
            Analyzer::default(),
            TFIDFOptions::default(),
        )
        .unwrap();
        let rowless = DocumentTermMatrix::empty(vectorizer.dim(), vectorizer.fingerprint());
        assert!(matches!(
            Recommender::from_parts(catalog, vectorizer, rowless),
            Err(Error::DimensionMismatch { expected: 3, found: 0 })
        ));
    }
}
