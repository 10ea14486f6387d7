//! JSON bodies exchanged with the wagering backend.

use cashorcut_core::{Amount, RoundReference};
use serde::{Deserialize, Serialize};

pub const STAKE_PATH: &str = "/api/web/bomber_game_play/";
pub const CASHOUT_PATH: &str = "/api/web/bomber_winnings/";
pub const USER_PATH: &str = "/api/web/user/";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameType {
    #[default]
    Bomber,
}

impl GameType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bomber => "BOMBER",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRequest {
    pub amount: Amount,
    pub game_type: GameType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeResponse {
    #[serde(default)]
    pub message: String,
    pub reference: RoundReference,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashoutRequest {
    pub reference: RoundReference,
    pub game_type: GameType,
    pub amount: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashoutResponse {
    #[serde(default)]
    pub message: String,
}

/// Subset of the user record the game reads. Balances arrive as JSON numbers and may carry decimals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub play_balance: f64,
    #[serde(default)]
    pub winning_balance: f64,
}

impl UserDetails {
    /// Play balance in whole units, what a stake is checked against.
    pub fn stakeable_balance(&self) -> Amount {
        if self.play_balance.is_finite() && self.play_balance > 0.0 {
            self.play_balance.floor() as Amount
        } else {
            0
        }
    }
}

/// Error body of a non-2xx response. The backend is not consistent about the field it fills in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn reason(&self) -> Option<&str> {
        [&self.message, &self.detail, &self.error]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|reason| !reason.trim().is_empty())
    }
}
