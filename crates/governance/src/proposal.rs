//! Proposal data model and derived lifecycle state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use agora_common::{content_hash, Address, Amount, BlockHeight};

/// A voter's position on a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteSupport {
    /// Vote against the proposal
    Against = 0,
    /// Vote for the proposal
    For = 1,
    /// Abstain; counts toward quorum only
    Abstain = 2,
}

/// Lifecycle state of a proposal, derived from its stored fields and the
/// current block height rather than stored directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// Voting has not started yet
    Pending,
    /// Inside the voting window
    Active,
    /// Voting ended; the proposal passed and met quorum
    Succeeded,
    /// Voting ended; the proposal failed or missed quorum
    Defeated,
    /// The proposal was executed (terminal)
    Executed,
    /// The proposal was canceled (terminal)
    Canceled,
    /// Reserved for a future timelock extension; never produced
    Queued,
    /// Reserved for a future timelock extension; never produced
    Expired,
}

/// A governance proposal.
///
/// Immutable after creation except for the vote tallies, the voter set,
/// and the `executed`/`canceled` flags, of which at most one may ever
/// become true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Sequential id, 1-based
    pub id: u64,
    /// Account that created the proposal
    pub proposer: Address,
    /// Call targets of the action set
    pub targets: Vec<Address>,
    /// Values attached to each call
    pub values: Vec<Amount>,
    /// Encoded call data for each target
    pub calldatas: Vec<Vec<u8>>,
    /// SHA-256 of the description text
    pub description_hash: String,
    /// First block of the voting window
    pub start_block: BlockHeight,
    /// Last block of the voting window (inclusive)
    pub end_block: BlockHeight,
    /// Weight voted for
    pub for_votes: Amount,
    /// Weight voted against
    pub against_votes: Amount,
    /// Weight abstained
    pub abstain_votes: Amount,
    /// Whether the proposal was executed
    pub executed: bool,
    /// Whether the proposal was canceled
    pub canceled: bool,
    /// Accounts that already voted
    pub voters: HashSet<Address>,
}

impl Proposal {
    /// The snapshot height voting power and quorum are read at
    pub fn snapshot_height(&self) -> BlockHeight {
        self.start_block - 1
    }

    /// Total weight cast across all three tallies
    pub fn votes_cast(&self) -> Amount {
        self.for_votes
            .saturating_add(self.against_votes)
            .saturating_add(self.abstain_votes)
    }

    /// Derive the lifecycle state at `height` given the quorum requirement
    /// for this proposal's snapshot.
    pub fn state_at(&self, height: BlockHeight, quorum: Amount) -> ProposalState {
        if self.canceled {
            return ProposalState::Canceled;
        }
        if self.executed {
            return ProposalState::Executed;
        }
        if height < self.start_block {
            return ProposalState::Pending;
        }
        if height <= self.end_block {
            return ProposalState::Active;
        }
        if self.for_votes > self.against_votes && self.votes_cast() >= quorum {
            ProposalState::Succeeded
        } else {
            ProposalState::Defeated
        }
    }
}

/// Identity hash of a proposal's action set.
///
/// `execute` and `cancel` resolve proposals by recomputing this hash from
/// their raw arguments; the governor keeps a hash-to-id map built at
/// propose time so resolution is a lookup.
pub fn proposal_hash(
    targets: &[Address],
    values: &[Amount],
    calldatas: &[Vec<u8>],
    description_hash: &str,
) -> String {
    // Canonical encoding of the identity tuple; serializing these types
    // cannot fail
    let encoded =
        serde_json::to_vec(&(targets, values, calldatas, description_hash)).unwrap_or_default();
    content_hash(&encoded)
}
