//! Checkpointed quantity history.
//!
//! Voting power and total supply are recorded as append-only sequences of
//! `(height, value)` pairs, strictly increasing in height, so historical
//! snapshot queries resolve with a binary search instead of replaying the
//! ledger.

use serde::{Deserialize, Serialize};

use agora_common::{Amount, BlockHeight};

/// A recorded value as of a specific block height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Block height the value was recorded at
    pub height: BlockHeight,
    /// The recorded value
    pub value: Amount,
}

/// An append-only, height-ordered checkpoint sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointHistory {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently recorded value, or 0 if nothing was recorded yet
    pub fn latest(&self) -> Amount {
        self.checkpoints.last().map(|c| c.value).unwrap_or(0)
    }

    /// The value as of the latest checkpoint at or before `height`, or 0 if
    /// no checkpoint exists that early
    pub fn value_at(&self, height: BlockHeight) -> Amount {
        let idx = self.checkpoints.partition_point(|c| c.height <= height);
        if idx == 0 {
            0
        } else {
            self.checkpoints[idx - 1].value
        }
    }

    /// Record `value` at `height`.
    ///
    /// Two writes within the same block collapse into one checkpoint, so
    /// the sequence stays strictly increasing in height.
    pub fn record(&mut self, height: BlockHeight, value: Amount) {
        if let Some(last) = self.checkpoints.last_mut() {
            if last.height == height {
                last.value = value;
                return;
            }
            debug_assert!(last.height < height);
        }
        self.checkpoints.push(Checkpoint { height, value });
    }

    /// Number of checkpoints recorded
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Whether no checkpoint was recorded yet
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// The recorded checkpoints, oldest first
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }
}
