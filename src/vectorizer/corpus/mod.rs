use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::term::TermFrequency;

/// Corpus statistics of one term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStat {
    /// number of documents containing the term
    pub doc_freq: u64,
    /// occurrences over all documents
    pub occurrences: u64,
}

/// keep document count and per-term statistics of the fitted texts
/// base data for IDF calculation and vocabulary selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    doc_num: u64,
    #[serde(with = "indexmap::map::serde_seq")]
    term_stats: IndexMap<Box<str>, TermStat>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document's term frequency to the corpus
    pub fn add_doc(&mut self, freq: &TermFrequency) {
        self.doc_num += 1;
        for (term, count) in freq.iter() {
            let idx = match self.term_stats.get_index_of(term) {
                Some(idx) => idx,
                None => self.term_stats.insert_full(Box::from(term), TermStat::default()).0,
            };
            if let Some((_, stat)) = self.term_stats.get_index_mut(idx) {
                stat.doc_freq += 1;
                stat.occurrences += count;
            }
        }
    }

    /// Merge another corpus into self
    pub fn merge_corpus(&mut self, other: &Corpus) {
        self.doc_num += other.doc_num;
        for (term, stat) in &other.term_stats {
            let entry = self.term_stats.entry(term.clone()).or_default();
            entry.doc_freq += stat.doc_freq;
            entry.occurrences += stat.occurrences;
        }
    }

    /// Get the number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Number of documents containing the term
    #[inline]
    pub fn get_doc_freq(&self, term: &str) -> u64 {
        self.term_stats.get(term).map_or(0, |stat| stat.doc_freq)
    }

    #[inline]
    pub fn get_term_stat(&self, term: &str) -> Option<TermStat> {
        self.term_stats.get(term).copied()
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_stats.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TermStat)> {
        self.term_stats.iter().map(|(term, stat)| (term.as_ref(), *stat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(terms: &[&str]) -> TermFrequency {
        TermFrequency::from(terms)
    }

    #[test]
    fn doc_freq_counts_each_document_once() {
        let mut corpus = Corpus::new();
        corpus.add_doc(&freq(&["rust", "rust", "tokio"]));
        corpus.add_doc(&freq(&["rust", "serde"]));

        assert_eq!(corpus.get_doc_num(), 2);
        assert_eq!(corpus.get_doc_freq("rust"), 2);
        assert_eq!(corpus.get_doc_freq("tokio"), 1);
        assert_eq!(corpus.get_doc_freq("missing"), 0);
        assert_eq!(corpus.get_term_stat("rust").map(|s| s.occurrences), Some(3));
        assert_eq!(corpus.vocab_size(), 3);
    }

    #[test]
    fn merge_matches_sequential_adds() {
        let docs = [freq(&["a1", "b2"]), freq(&["b2", "c3", "c3"]), freq(&["a1"])];

        let mut sequential = Corpus::new();
        docs.iter().for_each(|d| sequential.add_doc(d));

        let mut left = Corpus::new();
        left.add_doc(&docs[0]);
        let mut right = Corpus::new();
        right.add_doc(&docs[1]);
        right.add_doc(&docs[2]);
        left.merge_corpus(&right);

        assert_eq!(left.get_doc_num(), sequential.get_doc_num());
        for (term, stat) in sequential.iter() {
            assert_eq!(left.get_term_stat(term), Some(stat), "term {term}");
        }
    }
}
