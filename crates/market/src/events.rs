//! Event records emitted by the task market.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agora_common::{Address, Amount};

/// A task was created and its budget escrowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreatedRecord {
    /// Id assigned to the task
    pub task_id: u64,
    /// The creating account
    pub creator: Address,
    /// Task title
    pub title: String,
    /// Escrowed budget
    pub budget: Amount,
    /// Task deadline
    pub deadline: DateTime<Utc>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A bid was submitted on an open task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidSubmittedRecord {
    /// The task bid on
    pub task_id: u64,
    /// Id assigned to the bid (per task)
    pub bid_id: u64,
    /// The bidding account
    pub bidder: Address,
    /// Offered price
    pub amount: Amount,
}

/// The creator accepted a bid and assigned the task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidAcceptedRecord {
    /// The task
    pub task_id: u64,
    /// The accepted bid
    pub bid_id: u64,
    /// The new assignee
    pub assignee: Address,
    /// The accepted price
    pub amount: Amount,
}

/// The assignee attached a work result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSubmittedRecord {
    /// The task
    pub task_id: u64,
    /// The assignee who submitted
    pub assignee: Address,
    /// Opaque reference to the work result
    pub work_result: String,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
}

/// The creator marked the task completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletedRecord {
    /// The task
    pub task_id: u64,
    /// The assignee whose work was accepted
    pub assignee: Address,
    /// Completion time
    pub completed_at: DateTime<Utc>,
}

/// Escrowed payment was released to the assignee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReleasedRecord {
    /// The task
    pub task_id: u64,
    /// The paid assignee
    pub assignee: Address,
    /// The accepted bid amount
    pub gross: Amount,
    /// Platform fee deducted
    pub fee: Amount,
    /// Amount credited to the assignee
    pub net: Amount,
}

/// The task was cancelled and the budget refunded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCancelledRecord {
    /// The task
    pub task_id: u64,
    /// The creator the budget was refunded to
    pub creator: Address,
    /// Refunded budget
    pub refund: Amount,
}

/// Accrued platform fees were withdrawn by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesWithdrawnRecord {
    /// The controller the fees were credited to
    pub controller: Address,
    /// Amount withdrawn (zero is a valid no-op)
    pub amount: Amount,
}

/// Every externally observable market event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    /// Task created
    TaskCreated(TaskCreatedRecord),
    /// Bid submitted
    BidSubmitted(BidSubmittedRecord),
    /// Bid accepted
    BidAccepted(BidAcceptedRecord),
    /// Work submitted
    WorkSubmitted(WorkSubmittedRecord),
    /// Task completed
    TaskCompleted(TaskCompletedRecord),
    /// Payment released
    PaymentReleased(PaymentReleasedRecord),
    /// Task cancelled
    TaskCancelled(TaskCancelledRecord),
    /// Fees withdrawn
    FeesWithdrawn(FeesWithdrawnRecord),
}
