//! Escrow-backed task marketplace for Agora
//!
//! Members trade work through value-holding tasks: a creator escrows a
//! budget at creation, workers bid competitively, the creator assigns the
//! task to one bid, and on completion the accepted bid amount is paid out
//! minus a platform fee. Escrowed value is owned by the market until it is
//! released to the assignee or refunded to the creator, exactly once.

use thiserror::Error;

mod events;
mod market;
mod task;

pub use events::{
    BidAcceptedRecord, BidSubmittedRecord, FeesWithdrawnRecord, MarketEvent,
    PaymentReleasedRecord, TaskCancelledRecord, TaskCompletedRecord, TaskCreatedRecord,
    WorkSubmittedRecord,
};
pub use market::{MarketConfig, TaskMarket};
pub use task::{Bid, Task, TaskState};

/// Error types for task market operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// The market was configured with invalid parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Task parameters are invalid
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// Deadline is not strictly in the future
    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),

    /// Budget deposit is invalid
    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    /// No such task, or no such bid for the task
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Bid amount is zero or exceeds the task budget
    #[error("Bid too low: {0}")]
    BidTooLow(String),

    /// The task is not in the lifecycle state the operation requires
    #[error("Task not assigned: {0}")]
    TaskNotAssigned(String),

    /// Caller is not allowed to perform this operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Payment for the task was already released
    #[error("Already settled: {0}")]
    AlreadySettled(String),

    /// An escrow or ledger amount would overflow
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

/// Result type for task market operations
pub type MarketResult<T> = Result<T, MarketError>;
