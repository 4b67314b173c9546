//! The vocabulary drawers are asked to sketch.

use rand::Rng;

use crate::RoomError;

const DEFAULT_WORDS: [&str; 33] = [
    "apple", "banana", "car", "house", "tree", "sun", "moon", "star",
    "dog", "cat", "fish", "bird", "flower", "mountain", "river", "ocean",
    "book", "phone", "computer", "guitar", "pizza", "cake", "bicycle",
    "airplane", "rainbow", "umbrella", "clock", "glasses", "hat", "shoe",
    "butterfly", "elephant", "snowman",
];

/// A fixed, non-empty list of words.
///
/// Words are drawn uniformly and with replacement, so the same word may
/// come up in consecutive rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPool {
    words: Vec<String>,
}

impl WordPool {
    /// Builds a pool from the given words, dropping blank entries.
    ///
    /// # Errors
    /// Returns [`RoomError::EmptyWordPool`] if nothing is left.
    pub fn new<I, S>(words: I) -> Result<Self, RoomError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(Into::into)
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(RoomError::EmptyWordPool);
        }
        Ok(Self { words })
    }

    /// Draws one word.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> &str {
        &self.words[rng.random_range(0..self.words.len())]
    }

    /// Number of words in the pool.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always `false`; an empty pool cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns `true` if `word` is in the pool (exact match).
    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }
}

impl Default for WordPool {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }
}
