//! Agora - the authoritative state machine for a decentralized organization
//!
//! Agora combines three tightly coupled subsystems:
//!
//! - [`token`]: a soul-bound governance token ledger with delegated,
//!   checkpointed voting power;
//! - [`governance`]: a proposal engine implementing the propose, vote,
//!   resolve, execute-or-cancel lifecycle, gated by voting-power thresholds
//!   and quorum;
//! - [`market`]: an escrow-backed task marketplace with competitive
//!   bidding and fee-deducted payment release.
//!
//! The surrounding application (UI, wallets, transport) is glue over this
//! core: it reads state snapshots and submits the operations defined here.
//! A factory component wires one token, governor, and market per
//! organization using the constructors each crate exposes.

pub use agora_common as common;
pub use agora_governance as governance;
pub use agora_market as market;
pub use agora_token as token;

/// Version of the Agora core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
