//! High score contract
//!
//! The session only ever reads the persisted best and, at game over, writes
//! a new one. Where the number lives is up to the store.

/// Persisted best score across sessions
pub trait HighScoreStore {
    fn high_score(&self) -> u64;
    fn set_high_score(&mut self, score: u64);
}

/// Check a final score against the store and persist it if it is a new
/// record. Returns true when the store was written.
pub fn record_final_score(store: &mut dyn HighScoreStore, score: u64) -> bool {
    if !qualifies(store.high_score(), score) {
        return false;
    }
    log::info!("New high score: {}", score);
    store.set_high_score(score);
    true
}

/// A score of 0 never counts as a record
#[inline]
pub fn qualifies(best: u64, score: u64) -> bool {
    score > 0 && score > best
}

/// Store that lives for the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScores {
    best: u64,
    writes: u32,
}

impl MemoryHighScores {
    pub fn new(best: u64) -> Self {
        Self { best, writes: 0 }
    }

    /// Number of `set_high_score` calls so far
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl HighScoreStore for MemoryHighScores {
    fn high_score(&self) -> u64 {
        self.best
    }

    fn set_high_score(&mut self, score: u64) {
        self.best = score;
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_when_beaten() {
        let mut store = MemoryHighScores::new(100);
        assert!(!record_final_score(&mut store, 50));
        assert!(!record_final_score(&mut store, 100));
        assert_eq!(store.writes(), 0);

        assert!(record_final_score(&mut store, 150));
        assert_eq!(store.high_score(), 150);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut store = MemoryHighScores::default();
        assert!(!record_final_score(&mut store, 0));
        assert!(record_final_score(&mut store, 1));
    }
}
