use cashorcut_core::{
    Amount, BoardGenerator, CashOutTicket, RandomSource, RevealOutcome, RoundEngine, RoundView,
    StakeTieredGenerator,
};
use cashorcut_protocol::{CashoutRequest, GameType, StakeRequest};

use crate::{AccountService, ClientConfig, ClientError, Result, SettlementGateway};

/// Connects a [`RoundEngine`] to the remote services. Every intent takes `&mut self`, so no two intents
/// can overlap on one controller.
pub struct RoundController<S, A, G> {
    engine: RoundEngine<G>,
    gateway: S,
    account: A,
    game_type: GameType,
    balance: Option<Amount>,
}

/// Holds the engine while a gateway call is outstanding. Dropping it before the answer arrives, as happens
/// when the intent's future is cancelled, abandons the call so the round is not left busy.
struct InFlight<'a, G: BoardGenerator> {
    engine: &'a mut RoundEngine<G>,
    answered: bool,
}

impl<'a, G: BoardGenerator> InFlight<'a, G> {
    fn new(engine: &'a mut RoundEngine<G>) -> Self {
        Self {
            engine,
            answered: false,
        }
    }

    fn answered(&mut self) -> &mut RoundEngine<G> {
        self.answered = true;
        self.engine
    }
}

impl<G: BoardGenerator> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        if !self.answered {
            self.engine.abandon_pending();
        }
    }
}

impl<S, A, G> RoundController<S, A, G>
where
    S: SettlementGateway,
    A: AccountService,
    G: BoardGenerator,
{
    pub fn new(engine: RoundEngine<G>, gateway: S, account: A, game_type: GameType) -> Self {
        Self {
            engine,
            gateway,
            account,
            game_type,
            balance: None,
        }
    }

    pub fn view(&self) -> RoundView {
        self.engine.view()
    }

    pub fn engine(&self) -> &RoundEngine<G> {
        &self.engine
    }

    pub fn gateway(&self) -> &S {
        &self.gateway
    }

    pub fn account(&self) -> &A {
        &self.account
    }

    /// Last balance reported by the account service, `None` until fetched or after a failed refresh.
    pub fn balance(&self) -> Option<Amount> {
        self.balance
    }

    pub async fn refresh_balance(&mut self) -> Result<Amount> {
        match self.account.fetch_user().await {
            Ok(user) => {
                let balance = user.stakeable_balance();
                log::trace!("Balance refreshed: {}", balance);
                self.balance = Some(balance);
                Ok(balance)
            }
            Err(err) => {
                self.balance = None;
                Err(ClientError::Account(err))
            }
        }
    }

    async fn refresh_after_settlement(&mut self) {
        if let Err(err) = self.refresh_balance().await {
            log::warn!("Balance refresh after settlement failed: {}", err);
        }
    }

    pub async fn start_round(&mut self, stake: Amount) -> Result<()> {
        let balance = match self.balance {
            Some(balance) => balance,
            None => self.refresh_balance().await?,
        };
        let ticket = self.engine.begin_round(stake, balance)?;
        let mut call = InFlight::new(&mut self.engine);

        let request = StakeRequest {
            amount: ticket.stake,
            game_type: self.game_type,
        };
        let authorization = self.gateway.authorize_stake(&request).await.map(|response| {
            log::debug!("Stake authorized: {}", response.message);
            response.reference
        });
        call.answered().complete_round(authorization)?;
        drop(call);

        self.refresh_after_settlement().await;
        Ok(())
    }

    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        self.engine.reveal(index)
    }

    /// Settles the current payout and returns the amount that was credited.
    pub async fn cash_out(&mut self) -> Result<Amount> {
        let CashOutTicket { reference, amount } = self.engine.begin_cash_out()?;
        let mut call = InFlight::new(&mut self.engine);

        let request = CashoutRequest {
            reference,
            game_type: self.game_type,
            amount,
        };
        let settlement = self.gateway.settle_cash_out(&request).await.map(|response| {
            log::debug!("Cash-out settled: {}", response.message);
        });
        call.answered().complete_cash_out(settlement)?;
        drop(call);

        self.refresh_after_settlement().await;
        Ok(amount)
    }

    pub fn new_round(&mut self) -> bool {
        self.engine.new_round()
    }
}

impl<S, A, R> RoundController<S, A, StakeTieredGenerator<R>>
where
    S: SettlementGateway,
    A: AccountService,
    R: RandomSource,
{
    /// Controller using the configured rules and density bands.
    pub fn from_config(config: &ClientConfig, source: R, gateway: S, account: A) -> Self {
        let generator = StakeTieredGenerator::new(config.density_table(), source);
        let engine = RoundEngine::new(config.round_config(), generator);
        Self::new(engine, gateway, account, config.game_type)
    }
}
