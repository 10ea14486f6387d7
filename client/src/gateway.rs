use cashorcut_core::SettlementError;
use cashorcut_protocol::*;

/// Service of record for stakes and payouts.
#[allow(async_fn_in_trait)]
pub trait SettlementGateway {
    async fn authorize_stake(&self, request: &StakeRequest)
    -> Result<StakeResponse, SettlementError>;

    async fn settle_cash_out(
        &self,
        request: &CashoutRequest,
    ) -> Result<CashoutResponse, SettlementError>;
}

/// Owner of the player's balance. The game only ever reads it.
#[allow(async_fn_in_trait)]
pub trait AccountService {
    async fn fetch_user(&self) -> Result<UserDetails, SettlementError>;
}

/// Maps a non-2xx response onto the error the engine understands.
pub fn rejection_for(status: u16, body: Option<&ApiErrorBody>) -> SettlementError {
    let reason = body.and_then(ApiErrorBody::reason).map(str::to_owned);
    match status {
        408 | 504 => SettlementError::Timeout,
        _ => SettlementError::Rejected(reason.unwrap_or_else(|| format!("HTTP {status}"))),
    }
}
