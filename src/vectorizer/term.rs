use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// TermFrequency struct
/// Counts term occurrences within one text.
/// Terms keep their first-appearance order.
///
/// # Examples
/// ```
/// use job_recommender::TermFrequency;
/// let mut term_freq = TermFrequency::new();
/// term_freq.add_term("rust");
/// term_freq.add_term("python");
/// term_freq.add_term("rust");
///
/// assert_eq!(term_freq.term_count("rust"), 2);
/// assert_eq!(term_freq.term_sum(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<Box<str>, u64>,
    total_term_count: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
            total_term_count: 0,
        }
    }

    /// Add a term
    ///
    /// # Arguments
    /// * `term` - term to add
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        match self.term_count.get_mut(term) {
            Some(count) => *count += 1,
            None => {
                self.term_count.insert(Box::from(term), 1);
            }
        }
        self.total_term_count += 1;
        self
    }

    /// Add multiple terms
    ///
    /// # Arguments
    /// * `terms` - Slice of terms to add
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Merge counts of another TermFrequency into self
    pub fn add_terms_from_freq(&mut self, other: &TermFrequency) -> &mut Self {
        for (term, &count) in &other.term_count {
            *self.term_count.entry(term.clone()).or_insert(0) += count;
            self.total_term_count += count;
        }
        self
    }
}

impl<T> From<&[T]> for TermFrequency
where
    T: AsRef<str>,
{
    fn from(terms: &[T]) -> Self {
        let mut tf = TermFrequency::new();
        tf.add_terms(terms);
        tf
    }
}

impl TermFrequency {
    /// Iterate terms and their counts in first-appearance order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_count.iter().map(|(term, &count)| (term.as_ref(), count))
    }

    /// Distinct terms, in first-appearance order
    #[inline]
    pub fn term_set_ref_str(&self) -> Vec<&str> {
        self.term_count.keys().map(|term| term.as_ref()).collect()
    }

    /// Occurrence count of a term, 0 if absent
    #[inline]
    pub fn term_count(&self, term: &str) -> u64 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// Total number of term occurrences
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// Number of distinct terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.term_count.contains_key(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_counts_and_totals() {
        let mut a = TermFrequency::from(&["rust", "go"][..]);
        let b = TermFrequency::from(&["rust", "rust", "java"][..]);
        a.add_terms_from_freq(&b);

        assert_eq!(a.term_count("rust"), 3);
        assert_eq!(a.term_count("java"), 1);
        assert_eq!(a.term_sum(), 5);
        assert_eq!(a.term_set_ref_str(), vec!["rust", "go", "java"]);
    }

    #[test]
    fn absent_term_counts_zero() {
        let freq = TermFrequency::new();
        assert_eq!(freq.term_count("missing"), 0);
        assert!(!freq.contains_term("missing"));
        assert!(freq.is_empty());
    }
}
