//! Repetition tracking for draw detection.

use std::collections::HashMap;

/// Multiset of visited position hashes.
///
/// Each search lane owns its own tracker (seeded from the game history), so
/// moves simulated during search never corrupt another lane's bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct RepetitionTracker {
    counts: HashMap<u64, u32>,
}

impl RepetitionTracker {
    #[must_use]
    pub fn new() -> Self {
        RepetitionTracker {
            counts: HashMap::new(),
        }
    }

    /// Number of times this position has been visited.
    #[must_use]
    pub fn count(&self, hash: u64) -> u32 {
        self.counts.get(&hash).copied().unwrap_or(0)
    }

    /// Record a visit.
    pub fn push(&mut self, hash: u64) {
        *self.counts.entry(hash).or_insert(0) += 1;
    }

    /// Undo the most recent visit of this position.
    pub fn pop(&mut self, hash: u64) {
        if let Some(count) = self.counts.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&hash);
            }
        }
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
