use alloc::string::String;
use thiserror::Error;

use crate::{Amount, TileCount};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    #[error("Invalid stake of {stake}: {reason}")]
    InvalidStake { stake: Amount, reason: StakeRejection },
    #[error("Cash-out needs at least {required} safe reveals, only {revealed} so far")]
    IneligibleCashOut {
        revealed: TileCount,
        required: TileCount,
    },
    #[error("Settlement failed: {0}")]
    Settlement(#[from] SettlementError),
    #[error("Protocol violation: {0}")]
    ProtocolViolation(#[from] Violation),
}

/// Why a stake was refused before contacting the gateway.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum StakeRejection {
    #[error("stake must be positive")]
    Zero,
    #[error("below the minimum stake of {0}")]
    BelowMinimum(Amount),
    #[error("above the maximum stake of {0}")]
    AboveMaximum(Amount),
    #[error("exceeds the available balance of {0}")]
    ExceedsBalance(Amount),
}

/// Failure reported by the settlement gateway or the account service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Rejected by server: {0}")]
    Rejected(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Intent that arrived when the engine could not accept it. These indicate a bug in the caller.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("a settlement call is still outstanding")]
    Busy,
    #[error("no round is active")]
    NotActive,
    #[error("a round is already in progress")]
    NotInSetup,
    #[error("tile {index} is outside a board of {tile_count}")]
    OutOfRange { index: usize, tile_count: TileCount },
    #[error("tile {0} was already revealed")]
    AlreadyRevealed(usize),
    #[error("no matching settlement call is outstanding")]
    NoPendingCall,
}

pub type Result<T> = core::result::Result<T, RoundError>;
