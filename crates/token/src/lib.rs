//! Governance token ledger for Agora
//!
//! This crate implements the organization's membership token: a soul-bound
//! (non-transferable) balance ledger with delegated, checkpointed voting
//! power. Balances only ever change through controller-restricted mint and
//! burn; voting power follows delegation and is recorded as an append-only
//! checkpoint history per delegate, so the governance engine can read power
//! at historical block heights.

use thiserror::Error;

mod checkpoint;
mod events;
mod token;

pub use checkpoint::{Checkpoint, CheckpointHistory};
pub use events::{
    BurnRecord, DelegateChangedRecord, MintRecord, OwnershipTransferredRecord, TokenEvent,
};
pub use token::GovernanceToken;

/// Error types for ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Caller is not the controller
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Recipient address is invalid
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Amount is invalid (zero)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Arithmetic would overflow the numeric domain
    #[error("Overflow: {0}")]
    Overflow(String),

    /// Balance is too low for the requested burn
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Tokens are soul-bound and can never be transferred
    #[error("Transfer not allowed: governance tokens are non-transferable")]
    TransferNotAllowed,
}

/// Result type for ledger operations
pub type TokenResult<T> = Result<T, TokenError>;
