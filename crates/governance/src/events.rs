//! Event records emitted by the governance engine.

use serde::{Deserialize, Serialize};

use agora_common::{Address, Amount, BlockHeight};

use crate::proposal::VoteSupport;

/// A proposal was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCreatedRecord {
    /// Id assigned to the proposal
    pub proposal_id: u64,
    /// Account that proposed
    pub proposer: Address,
    /// Call targets of the action set
    pub targets: Vec<Address>,
    /// Values attached to each call
    pub values: Vec<Amount>,
    /// Encoded call data for each target
    pub calldatas: Vec<Vec<u8>>,
    /// The proposal description
    pub description: String,
    /// SHA-256 of the description
    pub description_hash: String,
    /// First block of the voting window
    pub start_block: BlockHeight,
    /// Last block of the voting window (inclusive)
    pub end_block: BlockHeight,
}

/// A vote was cast on a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCastRecord {
    /// The proposal voted on
    pub proposal_id: u64,
    /// The voting account
    pub voter: Address,
    /// The voter's position
    pub support: VoteSupport,
    /// Weight added to the matching tally (snapshot voting power)
    pub weight: Amount,
    /// Optional free-text reason
    pub reason: Option<String>,
}

/// A proposal was executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalExecutedRecord {
    /// The executed proposal
    pub proposal_id: u64,
    /// Account that triggered execution
    pub executor: Address,
    /// Block height of execution
    pub height: BlockHeight,
}

/// A proposal was canceled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCanceledRecord {
    /// The canceled proposal
    pub proposal_id: u64,
    /// Account that triggered cancellation
    pub canceler: Address,
    /// Block height of cancellation
    pub height: BlockHeight,
}

/// Every externally observable governance event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    /// Proposal created
    ProposalCreated(ProposalCreatedRecord),
    /// Vote cast
    VoteCast(VoteCastRecord),
    /// Proposal executed
    ProposalExecuted(ProposalExecutedRecord),
    /// Proposal canceled
    ProposalCanceled(ProposalCanceledRecord),
}
