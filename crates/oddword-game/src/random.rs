//! Injectable randomness.
//!
//! Room codes, word pairs, and imposters are all chosen through a
//! [`RandomSource`], so tests can script exact outcomes instead of
//! asserting on statistics.

use rand::Rng;

/// A source of uniformly distributed indices.
pub trait RandomSource: Send {
    /// Returns an index in `0..len`. Callers guarantee `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Production source backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Deterministic source that replays a fixed script.
///
/// Each call consumes the next scripted value (wrapping around at the
/// end) and reduces it modulo `len`. An empty script always yields 0.
///
/// ```rust
/// use oddword_game::{RandomSource, ScriptedRandom};
///
/// let mut rng = ScriptedRandom::new([2, 7]);
/// assert_eq!(rng.pick_index(5), 2);
/// assert_eq!(rng.pick_index(5), 2); // 7 % 5
/// assert_eq!(rng.pick_index(5), 2); // wrapped back to the first value
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    script: Vec<usize>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value % len
    }
}
