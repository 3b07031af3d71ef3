//! Core identity and numeric types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit of value and voting power.
///
/// All arithmetic on amounts is checked at the call site; overflow surfaces
/// as a typed error, never as a wrap or a panic.
pub type Amount = u128;

/// Logical block height used for voting-power checkpoints.
pub type BlockHeight = u64;

/// An account address.
///
/// Addresses are opaque strings held by wallets; the empty string is the
/// null address, used as a sentinel for "no account" (burn target for
/// voting power, renounced ownership).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create a new address
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The null address
    pub fn null() -> Self {
        Self(String::new())
    }

    /// Whether this is the null address
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    /// The address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "<null>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Exact floor of `amount * numerator / denominator` without intermediate
/// overflow.
///
/// Requires `numerator <= denominator` and `denominator > 0`; used for
/// quorum percentages and fee basis points, where both hold by
/// construction. The split keeps every intermediate product below
/// `denominator^2`.
pub fn mul_div(amount: Amount, numerator: Amount, denominator: Amount) -> Amount {
    debug_assert!(denominator > 0);
    debug_assert!(numerator <= denominator);
    (amount / denominator) * numerator + (amount % denominator) * numerator / denominator
}
