//! The word-pair catalog.

use std::collections::HashSet;

use crate::{GameError, RandomSource};

/// A regular word and the imposter's near-miss counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    pub regular: String,
    pub imposter: String,
}

impl WordPair {
    pub fn new(regular: impl Into<String>, imposter: impl Into<String>) -> Self {
        Self {
            regular: regular.into(),
            imposter: imposter.into(),
        }
    }
}

const BUILTIN_PAIRS: &[(&str, &str)] = &[
    ("Cat", "Dog"),
    ("Coffee", "Tea"),
    ("Beach", "Desert"),
    ("Piano", "Guitar"),
    ("Pizza", "Burger"),
    ("Train", "Bus"),
    ("Apple", "Pear"),
    ("Moon", "Sun"),
    ("Doctor", "Nurse"),
    ("Castle", "Palace"),
    ("Rain", "Snow"),
    ("Lion", "Tiger"),
    ("Book", "Magazine"),
    ("Football", "Rugby"),
    ("River", "Lake"),
    ("Chess", "Checkers"),
    ("Violin", "Cello"),
    ("Spoon", "Fork"),
    ("Mountain", "Hill"),
    ("Airplane", "Helicopter"),
    ("Library", "Bookstore"),
    ("Wedding", "Birthday"),
    ("Shark", "Dolphin"),
    ("Candle", "Lamp"),
    ("Cinema", "Theatre"),
    ("Bread", "Cake"),
    ("Ghost", "Zombie"),
    ("Winter", "Autumn"),
    ("Pirate", "Viking"),
    ("Honey", "Jam"),
];

/// An immutable, non-empty list of word pairs.
///
/// Every pair is guaranteed to hold two different words, and no pair
/// appears twice (in either word order). Words are compared trimmed and
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct WordCatalog {
    pairs: Vec<WordPair>,
}

impl WordCatalog {
    /// Validates and wraps `pairs`.
    ///
    /// # Errors
    /// [`GameError::InvalidCatalog`] if `pairs` is empty, a pair's two
    /// words are the same, or a pair is listed twice.
    pub fn new(pairs: Vec<WordPair>) -> Result<Self, GameError> {
        if pairs.is_empty() {
            return Err(GameError::InvalidCatalog("catalog is empty".into()));
        }
        if let Some(pair) = pairs.iter().find(|p| {
            p.regular.trim().eq_ignore_ascii_case(p.imposter.trim())
        }) {
            return Err(GameError::InvalidCatalog(format!(
                "pair {:?} uses the same word twice",
                pair.regular
            )));
        }
        let mut seen = HashSet::new();
        for pair in &pairs {
            let mut key = [fold(&pair.regular), fold(&pair.imposter)];
            key.sort();
            if !seen.insert(key) {
                return Err(GameError::InvalidCatalog(format!(
                    "pair {:?}/{:?} is listed more than once",
                    pair.regular, pair.imposter
                )));
            }
        }
        Ok(Self { pairs })
    }

    /// The catalog shipped with the server.
    pub fn builtin() -> Self {
        Self {
            pairs: BUILTIN_PAIRS
                .iter()
                .map(|(regular, imposter)| WordPair::new(*regular, *imposter))
                .collect(),
        }
    }

    /// Picks one pair uniformly at random.
    pub fn pick_pair(&self, rng: &mut dyn RandomSource) -> &WordPair {
        &self.pairs[rng.pick_index(self.pairs.len())]
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn fold(word: &str) -> String {
    word.trim().to_ascii_lowercase()
}

impl Default for WordCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
