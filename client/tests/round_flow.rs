use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use cashorcut_client::{
    AccountService, ClientConfig, ClientError, RoundController, SessionSource, SettlementGateway,
};
use cashorcut_core::{
    Amount, Board, BoardGenerator, RevealOutcome, RoundEngine, RoundError, RoundPhase,
    SettlementError, StakeRejection, TileCount, TileState, Violation,
};
use cashorcut_protocol::*;
use futures::FutureExt;
use futures::executor::block_on;

/// Answers with queued replies, falling back to success.
#[derive(Default)]
struct FakeGateway {
    stake_replies: RefCell<VecDeque<Result<StakeResponse, SettlementError>>>,
    cashout_replies: RefCell<VecDeque<Result<CashoutResponse, SettlementError>>>,
    stake_requests: RefCell<Vec<StakeRequest>>,
    cashout_requests: RefCell<Vec<CashoutRequest>>,
    unresponsive: Cell<bool>,
}

impl FakeGateway {
    fn fail_next_stake(&self, err: SettlementError) {
        self.stake_replies.borrow_mut().push_back(Err(err));
    }

    fn fail_next_cash_out(&self, err: SettlementError) {
        self.cashout_replies.borrow_mut().push_back(Err(err));
    }

    async fn maybe_hang(&self) {
        if self.unresponsive.get() {
            futures::future::pending::<()>().await;
        }
    }
}

impl SettlementGateway for FakeGateway {
    async fn authorize_stake(
        &self,
        request: &StakeRequest,
    ) -> Result<StakeResponse, SettlementError> {
        self.stake_requests.borrow_mut().push(request.clone());
        self.maybe_hang().await;
        self.stake_replies.borrow_mut().pop_front().unwrap_or_else(|| {
            Ok(StakeResponse {
                message: "Game started".into(),
                reference: format!("BMB-{}", self.stake_requests.borrow().len()).into(),
            })
        })
    }

    async fn settle_cash_out(
        &self,
        request: &CashoutRequest,
    ) -> Result<CashoutResponse, SettlementError> {
        self.cashout_requests.borrow_mut().push(request.clone());
        self.maybe_hang().await;
        self.cashout_replies.borrow_mut().pop_front().unwrap_or_else(|| {
            Ok(CashoutResponse {
                message: "Winnings credited".into(),
            })
        })
    }
}

/// Reports queued balances, repeating the last one.
struct FakeAccount {
    balances: RefCell<VecDeque<Result<f64, SettlementError>>>,
    last: Cell<f64>,
    fetches: Cell<u32>,
}

impl FakeAccount {
    fn with_balance(balance: f64) -> Self {
        Self {
            balances: RefCell::default(),
            last: Cell::new(balance),
            fetches: Cell::new(0),
        }
    }

    fn then(self, reply: Result<f64, SettlementError>) -> Self {
        self.balances.borrow_mut().push_back(reply);
        self
    }
}

impl AccountService for FakeAccount {
    async fn fetch_user(&self) -> Result<UserDetails, SettlementError> {
        self.fetches.set(self.fetches.get() + 1);
        let balance = match self.balances.borrow_mut().pop_front() {
            Some(reply) => reply?,
            None => self.last.get(),
        };
        self.last.set(balance);
        Ok(UserDetails {
            play_balance: balance,
            ..Default::default()
        })
    }
}

struct FixedBoards(VecDeque<Board>);

impl BoardGenerator for FixedBoards {
    fn generate(&mut self, _stake: Amount, tile_count: TileCount) -> Board {
        let board = self.0.pop_front().expect("test ran out of boards");
        assert_eq!(board.tile_count(), tile_count);
        board
    }
}

type Controller = RoundController<FakeGateway, FakeAccount, FixedBoards>;

fn controller(account: FakeAccount, boards: &[&[usize]]) -> Controller {
    let config = ClientConfig::default();
    let boards = boards
        .iter()
        .map(|cuts| Board::from_cut_indices(config.tile_count, cuts).unwrap())
        .collect();
    let engine = RoundEngine::new(config.round_config(), FixedBoards(boards));
    RoundController::new(engine, FakeGateway::default(), account, config.game_type)
}

#[test]
fn start_round_authorizes_stake_and_activates_board() {
    let mut game = controller(FakeAccount::with_balance(1_000.0), &[&[7]]);

    block_on(game.start_round(500)).unwrap();

    let view = game.view();
    assert_eq!(view.phase, RoundPhase::Active);
    assert_eq!(view.cells.len(), 49);
    assert!(view.cells.iter().all(|cell| *cell == TileState::Hidden));
    assert_eq!(
        game.engine().reference().map(|reference| reference.as_str()),
        Some("BMB-1")
    );
    assert_eq!(
        *game.gateway().stake_requests.borrow(),
        vec![StakeRequest {
            amount: 500,
            game_type: GameType::Bomber
        }]
    );
    // once to validate the stake, once after the stake was taken
    assert_eq!(game.account().fetches.get(), 2);
}

#[test]
fn stake_above_balance_never_reaches_gateway() {
    let mut game = controller(FakeAccount::with_balance(300.0), &[&[7]]);

    let err = block_on(game.start_round(500)).unwrap_err();

    assert_eq!(
        err,
        ClientError::Round(RoundError::InvalidStake {
            stake: 500,
            reason: StakeRejection::ExceedsBalance(300)
        })
    );
    assert!(game.gateway().stake_requests.borrow().is_empty());
    assert_eq!(game.view().phase, RoundPhase::Setup);
}

#[test]
fn unknown_balance_blocks_the_stake() {
    let account = FakeAccount::with_balance(1_000.0).then(Err(SettlementError::Timeout));
    let mut game = controller(account, &[&[7]]);

    let err = block_on(game.start_round(500)).unwrap_err();

    assert_eq!(err, ClientError::Account(SettlementError::Timeout));
    assert!(game.gateway().stake_requests.borrow().is_empty());

    block_on(game.start_round(500)).unwrap();
    assert_eq!(game.view().phase, RoundPhase::Active);
}

#[test]
fn refused_stake_returns_to_setup() {
    let mut game = controller(FakeAccount::with_balance(1_000.0), &[&[7]]);
    game.gateway()
        .fail_next_stake(SettlementError::Rejected("Insufficient balance".into()));

    let err = block_on(game.start_round(500)).unwrap_err();

    assert_eq!(
        err,
        ClientError::Round(RoundError::Settlement(SettlementError::Rejected(
            "Insufficient balance".into()
        )))
    );
    let view = game.view();
    assert_eq!(view.phase, RoundPhase::Setup);
    assert!(!view.busy);
    assert_eq!(game.engine().reference(), None);

    block_on(game.start_round(500)).unwrap();
    assert_eq!(game.view().phase, RoundPhase::Active);
}

#[test]
fn safe_reveal_then_cash_out_settles_and_refreshes_balance() {
    let account = FakeAccount::with_balance(1_000.0)
        .then(Ok(1_000.0))
        .then(Ok(500.0))
        .then(Ok(1_025.0));
    let mut game = controller(account, &[&[7]]);
    block_on(game.start_round(500)).unwrap();
    assert_eq!(game.balance(), Some(500));

    assert_eq!(game.reveal(3), RevealOutcome::Safe { payout: 525 });
    let view = game.view();
    assert_eq!(view.cells[3], TileState::Safe);
    assert_eq!(view.safe_reveal_count, 1);
    assert_eq!(view.current_payout, Some(525));

    let credited = block_on(game.cash_out()).unwrap();

    assert_eq!(credited, 525);
    let view = game.view();
    assert_eq!(view.phase, RoundPhase::EndedWin);
    assert!(view.cells.iter().all(|cell| *cell != TileState::Hidden));
    assert_eq!(view.cells[7], TileState::Cut);
    assert_eq!(
        *game.gateway().cashout_requests.borrow(),
        vec![CashoutRequest {
            reference: "BMB-1".into(),
            game_type: GameType::Bomber,
            amount: 525
        }]
    );
    assert_eq!(game.account().fetches.get(), 3);
    assert_eq!(game.balance(), Some(1_025));
}

#[test]
fn cut_reveal_ends_round_without_settlement() {
    let mut game = controller(FakeAccount::with_balance(1_000.0), &[&[7, 30]]);
    block_on(game.start_round(500)).unwrap();
    game.reveal(3);

    assert_eq!(game.reveal(7), RevealOutcome::Cut);

    let view = game.view();
    assert_eq!(view.phase, RoundPhase::EndedLoss);
    assert_eq!(view.cells[7], TileState::Cut);
    assert_eq!(view.cells[30], TileState::Cut);
    assert_eq!(
        view.cells.iter().filter(|cell| **cell == TileState::Safe).count(),
        47
    );
    assert_eq!(view.current_payout, Some(525));
    assert_eq!(view.triggered_cut, Some(7));

    assert_eq!(
        block_on(game.cash_out()),
        Err(ClientError::Round(RoundError::ProtocolViolation(
            Violation::NotActive
        )))
    );
    assert!(game.gateway().cashout_requests.borrow().is_empty());
}

#[test]
fn cash_out_before_any_reveal_is_ineligible() {
    let mut game = controller(FakeAccount::with_balance(1_000.0), &[&[7]]);
    block_on(game.start_round(500)).unwrap();

    let err = block_on(game.cash_out()).unwrap_err();

    assert_eq!(
        err,
        ClientError::Round(RoundError::IneligibleCashOut {
            revealed: 0,
            required: 1
        })
    );
    assert_eq!(game.view().phase, RoundPhase::Active);
    assert!(game.gateway().cashout_requests.borrow().is_empty());
}

#[test]
fn failed_cash_out_can_be_retried_once_per_attempt() {
    let mut game = controller(FakeAccount::with_balance(1_000.0), &[&[7]]);
    block_on(game.start_round(500)).unwrap();
    game.reveal(3);
    game.gateway().fail_next_cash_out(SettlementError::Timeout);
    let fetches_before = game.account().fetches.get();

    let err = block_on(game.cash_out()).unwrap_err();

    assert_eq!(
        err,
        ClientError::Round(RoundError::Settlement(SettlementError::Timeout))
    );
    let view = game.view();
    assert_eq!(view.phase, RoundPhase::Active);
    assert!(!view.busy);
    assert_eq!(view.cells[7], TileState::Hidden);
    assert_eq!(game.account().fetches.get(), fetches_before);

    // the round stays playable between attempts
    assert_eq!(game.reveal(4), RevealOutcome::Safe { payout: 550 });
    assert_eq!(block_on(game.cash_out()), Ok(550));

    let requests = game.gateway().cashout_requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].amount, 525);
    assert_eq!(requests[1].amount, 550);
    assert!(requests.iter().all(|request| request.reference.as_str() == "BMB-1"));
}

#[test]
fn cancelled_cash_out_leaves_round_playable() {
    let mut game = controller(FakeAccount::with_balance(1_000.0), &[&[7]]);
    block_on(game.start_round(500)).unwrap();
    game.reveal(3);
    game.gateway().unresponsive.set(true);

    // polled once, then dropped while the settlement is still outstanding
    assert_eq!(game.cash_out().now_or_never(), None);

    let view = game.view();
    assert_eq!(view.phase, RoundPhase::Active);
    assert!(!view.busy);
    assert_eq!(view.cells[7], TileState::Hidden);

    game.gateway().unresponsive.set(false);
    assert_eq!(game.reveal(4), RevealOutcome::Safe { payout: 550 });
    assert_eq!(block_on(game.cash_out()), Ok(550));
    assert_eq!(game.view().phase, RoundPhase::EndedWin);
    assert_eq!(game.gateway().cashout_requests.borrow().len(), 2);
}

#[test]
fn cancelled_stake_authorization_returns_to_setup() {
    let mut game = controller(FakeAccount::with_balance(1_000.0), &[&[7]]);
    game.gateway().unresponsive.set(true);

    assert_eq!(game.start_round(500).now_or_never(), None);

    let view = game.view();
    assert_eq!(view.phase, RoundPhase::Setup);
    assert!(!view.busy);
    assert_eq!(game.engine().reference(), None);

    game.gateway().unresponsive.set(false);
    block_on(game.start_round(500)).unwrap();
    assert_eq!(game.view().phase, RoundPhase::Active);
    assert_eq!(
        game.engine().reference().map(|reference| reference.as_str()),
        Some("BMB-2")
    );
}

#[test]
fn balance_refresh_failure_does_not_undo_settlement() {
    let account = FakeAccount::with_balance(1_000.0)
        .then(Ok(1_000.0))
        .then(Ok(500.0))
        .then(Err(SettlementError::Network("offline".into())));
    let mut game = controller(account, &[&[7]]);
    block_on(game.start_round(500)).unwrap();
    game.reveal(0);

    assert_eq!(block_on(game.cash_out()), Ok(525));

    assert_eq!(game.view().phase, RoundPhase::EndedWin);
    assert_eq!(game.balance(), None);
}

#[test]
fn finished_round_ignores_intents_until_new_round() {
    let mut game = controller(FakeAccount::with_balance(1_000.0), &[&[7], &[0]]);
    block_on(game.start_round(500)).unwrap();
    game.reveal(7);
    let finished = game.view();

    assert_eq!(
        game.reveal(8),
        RevealOutcome::Ignored(Violation::NotActive)
    );
    assert!(block_on(game.start_round(500)).is_err());
    assert_eq!(game.view(), finished);

    assert!(game.new_round());
    assert_eq!(game.view().phase, RoundPhase::Setup);

    block_on(game.start_round(200)).unwrap();
    assert_eq!(game.engine().stake(), Some(200));
    assert_eq!(
        game.engine().reference().map(|reference| reference.as_str()),
        Some("BMB-2")
    );
    assert_eq!(game.reveal(0), RevealOutcome::Cut);
}

#[test]
fn from_config_uses_configured_rules() {
    let config = ClientConfig::from_toml_str(
        r#"
        tile_count = 9
        stake_presets = [100]

        [payout]
        step_bps = 1000
        "#,
    )
    .unwrap();
    let mut game = RoundController::from_config(
        &config,
        SessionSource::new(Some(77)),
        FakeGateway::default(),
        FakeAccount::with_balance(10_000.0),
    );

    block_on(game.start_round(1_000)).unwrap();

    let view = game.view();
    assert_eq!(view.cells.len(), 9);
    let safe_index = (0..9)
        .find(|&index| {
            let mut trial = game.engine().clone();
            matches!(trial.reveal(index), RevealOutcome::Safe { .. })
        })
        .unwrap();
    assert_eq!(game.reveal(safe_index), RevealOutcome::Safe { payout: 1_100 });
}
