use indexmap::IndexSet;

use crate::error::{Error, Result};

/// Fixed term -> column mapping with one IDF weight per column.
///
/// Column `i` is the `i`-th term of the set. Established once by fitting and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    terms: IndexSet<Box<str>>,
    idf: Vec<f64>,
    fingerprint: u32,
}

impl Vocabulary {
    /// Build from terms in column order and their IDF weights.
    ///
    /// Fails when lengths differ, a term repeats, a weight is not finite,
    /// or there are more columns than a `u32` index can address.
    pub fn new<T>(terms: Vec<T>, idf: Vec<f64>) -> Result<Self>
    where
        T: Into<Box<str>>,
    {
        if terms.len() != idf.len() {
            return Err(Error::DimensionMismatch {
                expected: terms.len(),
                found: idf.len(),
            });
        }
        if terms.len() > u32::MAX as usize {
            return Err(Error::InvalidOptions(format!(
                "vocabulary of {} terms exceeds the column limit",
                terms.len()
            )));
        }
        if let Some(bad) = idf.iter().find(|w| !w.is_finite()) {
            return Err(Error::InvalidOptions(format!("non-finite idf weight {bad}")));
        }
        let mut set = IndexSet::with_capacity(terms.len());
        for term in terms {
            let term: Box<str> = term.into();
            if set.contains(&term) {
                return Err(Error::InvalidOptions(format!("duplicate vocabulary term `{term}`")));
            }
            set.insert(term);
        }
        let fingerprint = fingerprint(&set, &idf);
        Ok(Self {
            terms: set,
            idf,
            fingerprint,
        })
    }

    /// Column of a term, `None` if unknown
    #[inline]
    pub fn column(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    #[inline]
    pub fn term(&self, column: usize) -> Option<&str> {
        self.terms.get_index(column).map(|term| term.as_ref())
    }

    /// IDF weight of a column, 0.0 when out of range
    #[inline]
    pub fn idf(&self, column: usize) -> f64 {
        self.idf.get(column).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn idf_vec(&self) -> &[f64] {
        &self.idf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|term| term.as_ref())
    }

    /// CRC32 over the ordered terms and the bits of their weights.
    /// Two vocabularies with equal fingerprints map text to the same columns
    /// with the same weights.
    #[inline]
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }
}

fn fingerprint(terms: &IndexSet<Box<str>>, idf: &[f64]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for (term, weight) in terms.iter().zip(idf) {
        hasher.update(term.as_bytes());
        hasher.update(&[0]);
        hasher.update(&weight.to_bits().to_le_bytes());
    }
    hasher.finalize()
}
