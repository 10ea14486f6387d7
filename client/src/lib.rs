//! Drives Cash or Cut rounds against the wagering backend.

use cashorcut_core::{RoundError, SettlementError};
use thiserror::Error;

pub use config::*;
pub use controller::*;
pub use entropy::*;
pub use format::*;
pub use gateway::*;
#[cfg(target_arch = "wasm32")]
pub use http::*;
pub use launch::*;

mod config;
mod controller;
mod entropy;
mod format;
mod gateway;
#[cfg(target_arch = "wasm32")]
mod http;
mod launch;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error("Could not load the account balance: {0}")]
    Account(SettlementError),
}

pub type Result<T> = core::result::Result<T, ClientError>;
