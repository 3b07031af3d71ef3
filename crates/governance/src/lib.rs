//! Proposal governance engine for Agora
//!
//! This crate implements the propose, vote, resolve, execute-or-cancel
//! lifecycle for the organization. Proposals carry an arbitrary action set
//! (targets, values, calldatas); voting power comes from the token ledger
//! at a snapshot height fixed when the proposal is created, so acquiring
//! tokens after creation cannot buy weight on it.

use thiserror::Error;

mod events;
mod governor;
mod proposal;

pub use events::{
    GovernanceEvent, ProposalCanceledRecord, ProposalCreatedRecord, ProposalExecutedRecord,
    VoteCastRecord,
};
pub use governor::{Governor, GovernorConfig};
pub use proposal::{proposal_hash, Proposal, ProposalState, VoteSupport};

/// Error types for governance operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// The governor was configured with invalid parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The proposal is malformed or cannot be resolved
    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),

    /// The proposer's voting power is below the proposal threshold
    #[error("Insufficient voting power: {0}")]
    InsufficientVotingPower(String),

    /// The proposal is not in its active voting window
    #[error("Voting closed: {0}")]
    VotingClosed(String),

    /// The voter already cast a vote on this proposal
    #[error("Already voted: {0}")]
    AlreadyVoted(String),

    /// The proposal is not in the Succeeded state
    #[error("Proposal not executable: {0}")]
    ProposalNotExecutable(String),
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
