//! Technology Matcher — finds vocabulary terms mentioned in a block of text.
//!
//! Matching is case-insensitive substring containment. A short term that is
//! part of an unrelated word still matches ("go" in "good", "java" in
//! "javascript"); callers rely on this behaviour, so it is not tightened to
//! word boundaries.

pub mod vocabulary;

use serde::Serialize;

pub use vocabulary::Vocabulary;

/// Duplicate-free set of vocabulary terms found in one document.
/// Kept in vocabulary order; order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchSet(Vec<String>);

impl MatchSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, term: &str) -> bool {
        self.0.iter().any(|t| t == term)
    }
}

/// Returns every vocabulary term whose lower-cased form occurs in `text`.
pub fn match_technologies(text: &str, vocabulary: &Vocabulary) -> MatchSet {
    let haystack = text.to_lowercase();

    MatchSet(
        vocabulary
            .terms()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .map(String::from)
            .collect(),
    )
}
