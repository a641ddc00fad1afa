//! The candidate word corpus.
//!
//! The on-disk format is an external concern: newline-separated tokens.
//! Reading the file (or fetching it from wherever) is up to the caller;
//! this type only owns the parsed result.

/// An ordered list of candidate words for a round's word pool.
///
/// Parsing preserves order and keeps whatever tokens the source provides.
/// A corpus with repeated tokens is representable; it surfaces as a
/// game-construction error when the two secret words collide, not here.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Parses the "one token per line" format: lines are trimmed, blank
    /// lines are skipped.
    pub fn from_lines(text: &str) -> Self {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self { words }
    }

    /// Builds a list from already-split words. Mostly useful in tests.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
