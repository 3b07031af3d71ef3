//! Event records emitted by the ledger.
//!
//! Each state-mutating operation returns the record describing what
//! changed; the ledger also appends every record to its event log. Records
//! carry enough fields to reconstruct the transition.

use serde::{Deserialize, Serialize};

use agora_common::{Address, Amount, BlockHeight};

/// Tokens were minted to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRecord {
    /// Recipient of the minted tokens
    pub to: Address,
    /// Amount minted
    pub amount: Amount,
    /// Total supply after the mint
    pub total_supply: Amount,
    /// Block height of the mint
    pub height: BlockHeight,
}

/// Tokens were burned from an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnRecord {
    /// Account the tokens were burned from
    pub from: Address,
    /// Amount burned
    pub amount: Amount,
    /// Total supply after the burn
    pub total_supply: Amount,
    /// Block height of the burn
    pub height: BlockHeight,
}

/// An account changed its delegate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateChangedRecord {
    /// The delegating account
    pub delegator: Address,
    /// Previous delegate (self if never delegated before)
    pub old_delegate: Address,
    /// New delegate (the null address removes the power entirely)
    pub new_delegate: Address,
    /// Voting power moved between the delegates
    pub weight: Amount,
    /// Block height of the change
    pub height: BlockHeight,
}

/// The controller changed (or was renounced)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferredRecord {
    /// Previous controller
    pub previous_owner: Option<Address>,
    /// New controller; `None` after renouncement
    pub new_owner: Option<Address>,
}

/// Every externally observable ledger event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    /// Tokens minted
    Mint(MintRecord),
    /// Tokens burned
    Burn(BurnRecord),
    /// Delegate changed
    DelegateChanged(DelegateChangedRecord),
    /// Ownership transferred or renounced
    OwnershipTransferred(OwnershipTransferredRecord),
}
