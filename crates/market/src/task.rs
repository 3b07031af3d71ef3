//! Task and bid data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agora_common::{Address, Amount};

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// Accepting bids
    Open,
    /// A bid was accepted; work is underway
    Assigned,
    /// Work was accepted by the creator (terminal; payment may follow)
    Completed,
    /// Cancelled by the creator while open (terminal; budget refunded)
    Cancelled,
    /// Reserved for a future dispute extension; never produced
    Disputed,
}

/// A task with an escrowed budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Sequential task id, 1-based
    pub id: u64,
    /// Account that created the task and escrowed the budget
    pub creator: Address,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Opaque content reference for attached material
    pub ipfs_hash: String,
    /// Escrowed value, fixed at creation
    pub budget: Amount,
    /// Deadline; strictly in the future at creation
    pub deadline: DateTime<Utc>,
    /// Assigned worker, unset until a bid is accepted
    pub assignee: Option<Address>,
    /// Current lifecycle state
    pub state: TaskState,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Completion time, unset until completed
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether payment was released (internal settlement flag)
    pub paid: bool,
}

/// A bid on an open task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    /// Sequential bid id per task, 1-based
    pub id: u64,
    /// The task this bid is for
    pub task_id: u64,
    /// The bidding account
    pub bidder: Address,
    /// Offered price; positive and at most the task budget
    pub amount: Amount,
    /// Free-text pitch
    pub proposal: String,
    /// Whether this bid was accepted; set at most once per task
    pub accepted: bool,
}
