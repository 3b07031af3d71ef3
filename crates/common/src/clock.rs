//! Block clock shared by the ledger and the governor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::BlockHeight;

/// A cloneable handle to the current block height.
///
/// The execution substrate serializes all mutating calls, so the clock only
/// needs to hand out a consistent height; the ledger checkpoints against it
/// and the governor derives proposal windows from it. Cloned handles share
/// the same underlying counter.
#[derive(Debug, Clone)]
pub struct BlockClock {
    height: Arc<AtomicU64>,
}

impl BlockClock {
    /// Create a new clock starting at height 1
    pub fn new() -> Self {
        Self {
            height: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The current block height
    pub fn height(&self) -> BlockHeight {
        self.height.load(Ordering::SeqCst)
    }

    /// Advance the clock by `blocks`
    pub fn advance(&self, blocks: u64) {
        self.height.fetch_add(blocks, Ordering::SeqCst);
    }

    /// Set the clock to an absolute height
    pub fn set(&self, height: BlockHeight) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl Default for BlockClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_one() {
        assert_eq!(BlockClock::new().height(), 1);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let clock = BlockClock::new();
        let other = clock.clone();
        clock.advance(5);
        assert_eq!(other.height(), 6);
        other.set(42);
        assert_eq!(clock.height(), 42);
    }
}
