use serde::{Deserialize, Serialize};

use crate::vectorizer::term::TermFrequency;

/// Word analyzer used both at fit time and at query time.
///
/// Terms are maximal runs of word characters (alphanumeric or `_`)
/// with at least `min_term_chars` characters. Text is lowercased first
/// when `lowercase` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analyzer {
    pub lowercase: bool,
    pub min_term_chars: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            lowercase: true,
            min_term_chars: 2,
        }
    }
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Analyzer {
    /// Split text into terms, in order of appearance
    pub fn terms(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        text.split(|c: char| !is_word_char(c))
            .filter(|term| !term.is_empty() && term.chars().count() >= self.min_term_chars)
            .map(str::to_string)
            .collect()
    }

    /// Count the terms of a text
    pub fn analyze(&self, text: &str) -> TermFrequency {
        let mut freq = TermFrequency::new();
        freq.add_terms(&self.terms(text));
        freq
    }
}
