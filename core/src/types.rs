use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Whole currency units, used for stakes, balances and payouts.
pub type Amount = u64;

/// Count type used for tile counts, reveal counts and cut counts.
pub type TileCount = u16;

/// Fixed-point ratio where [`BPS_SCALE`] is `1.0`.
pub type Bps = u32;

pub const BPS_SCALE: Bps = 10_000;

/// Opaque identifier the settlement gateway issues when it accepts a stake.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundReference(String);

impl RoundReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RoundReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RoundReference {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl From<&str> for RoundReference {
    fn from(reference: &str) -> Self {
        Self(reference.into())
    }
}
