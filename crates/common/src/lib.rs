//! Common types and utilities for the Agora Network
//!
//! This crate provides the primitives shared by the governance token ledger,
//! the proposal governance engine, and the task market: account addresses,
//! amounts, block heights, the block clock, and content hashing.

mod clock;
mod hash;
mod types;

pub use clock::BlockClock;
pub use hash::content_hash;
pub use types::{mul_div, Address, Amount, BlockHeight};
