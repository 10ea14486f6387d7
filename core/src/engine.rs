use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Setup -> Active, once the stake is authorized
/// - Active -> EndedLoss, on revealing a cut
/// - Active -> Settling -> EndedWin, on a confirmed cash-out
/// - Settling -> Active, when the cash-out is refused or abandoned
/// - EndedWin | EndedLoss -> Setup, on starting over
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Setup,
    Active,
    Settling,
    EndedWin,
    EndedLoss,
}

impl RoundPhase {
    pub const fn is_setup(self) -> bool {
        matches!(self, Self::Setup)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::EndedWin | Self::EndedLoss)
    }
}

impl Default for RoundPhase {
    fn default() -> Self {
        Self::Setup
    }
}

/// Stake authorization the driver must request from the settlement gateway.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StakeTicket {
    pub stake: Amount,
}

/// Cash-out settlement the driver must request from the settlement gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CashOutTicket {
    pub reference: RoundReference,
    pub amount: Amount,
}

/// Read-only snapshot handed to the presentation layer. The board itself never leaves the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundView {
    pub phase: RoundPhase,
    pub cells: Vec<TileState>,
    pub stake: Option<Amount>,
    pub current_payout: Option<Amount>,
    pub safe_reveal_count: TileCount,
    pub busy: bool,
    pub triggered_cut: Option<usize>,
    /// Only known once the round is over.
    pub cut_count: Option<TileCount>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PendingCall {
    StakeAuthorization { stake: Amount },
    CashOut { amount: Amount },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Round {
    stake: Amount,
    reference: RoundReference,
    board: Board,
    cells: Vec<TileState>,
    safe_reveals: TileCount,
    payout: Option<Amount>,
    phase: RoundPhase,
    triggered_cut: Option<usize>,
}

impl Round {
    fn new(stake: Amount, reference: RoundReference, board: Board) -> Self {
        let cells = vec![TileState::Hidden; usize::from(board.tile_count())];
        Self {
            stake,
            reference,
            board,
            cells,
            safe_reveals: 0,
            payout: None,
            phase: RoundPhase::Active,
            triggered_cut: None,
        }
    }

    /// Turns every hidden cell into its true state.
    fn disclose(&mut self) {
        for (cell, is_cut) in self.cells.iter_mut().zip(self.board.iter()) {
            if cell.is_hidden() {
                *cell = TileState::disclosed(is_cut);
            }
        }
    }
}

/// Drives one player's rounds. Remote steps are split into a `begin_*` call that hands out a ticket and a
/// `complete_*` call that applies the gateway's answer, so the engine itself never waits on anything.
#[derive(Clone, Debug)]
pub struct RoundEngine<G> {
    config: RoundConfig,
    generator: G,
    round: Option<Round>,
    pending: Option<PendingCall>,
}

impl<G: BoardGenerator> RoundEngine<G> {
    pub fn new(config: RoundConfig, generator: G) -> Self {
        Self {
            config,
            generator,
            round: None,
            pending: None,
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.round
            .as_ref()
            .map_or(RoundPhase::Setup, |round| round.phase)
    }

    /// Whether a gateway call is outstanding, all mutating intents are refused meanwhile.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn stake(&self) -> Option<Amount> {
        self.round.as_ref().map(|round| round.stake)
    }

    pub fn reference(&self) -> Option<&RoundReference> {
        self.round.as_ref().map(|round| &round.reference)
    }

    pub fn safe_reveal_count(&self) -> TileCount {
        self.round.as_ref().map_or(0, |round| round.safe_reveals)
    }

    pub fn current_payout(&self) -> Option<Amount> {
        self.round.as_ref().and_then(|round| round.payout)
    }

    pub fn cell_at(&self, index: usize) -> Option<TileState> {
        match &self.round {
            Some(round) => round.cells.get(index).copied(),
            None if index < usize::from(self.config.tile_count) => Some(TileState::Hidden),
            None => None,
        }
    }

    pub fn triggered_cut(&self) -> Option<usize> {
        self.round.as_ref().and_then(|round| round.triggered_cut)
    }

    pub fn view(&self) -> RoundView {
        let busy = self.is_busy();
        match &self.round {
            Some(round) => RoundView {
                phase: round.phase,
                cells: round.cells.clone(),
                stake: Some(round.stake),
                current_payout: round.payout,
                safe_reveal_count: round.safe_reveals,
                busy,
                triggered_cut: round.triggered_cut,
                cut_count: round.phase.is_finished().then(|| round.board.cut_count()),
            },
            None => RoundView {
                phase: RoundPhase::Setup,
                cells: vec![TileState::Hidden; usize::from(self.config.tile_count)],
                stake: self.pending_stake(),
                current_payout: None,
                safe_reveal_count: 0,
                busy,
                triggered_cut: None,
                cut_count: None,
            },
        }
    }

    fn pending_stake(&self) -> Option<Amount> {
        match self.pending {
            Some(PendingCall::StakeAuthorization { stake }) => Some(stake),
            _ => None,
        }
    }

    fn check_stake(&self, stake: Amount, available_balance: Amount) -> Result<()> {
        let reason = if stake == 0 {
            StakeRejection::Zero
        } else if stake < self.config.min_stake {
            StakeRejection::BelowMinimum(self.config.min_stake)
        } else if let Some(max) = self.config.max_stake.filter(|&max| stake > max) {
            StakeRejection::AboveMaximum(max)
        } else if stake > available_balance {
            StakeRejection::ExceedsBalance(available_balance)
        } else {
            return Ok(());
        };
        Err(RoundError::InvalidStake { stake, reason })
    }

    /// Validates the stake and reserves the single gateway slot for its authorization.
    pub fn begin_round(&mut self, stake: Amount, available_balance: Amount) -> Result<StakeTicket> {
        if self.is_busy() {
            return Err(Violation::Busy.into());
        }
        if !self.phase().is_setup() {
            return Err(Violation::NotInSetup.into());
        }
        self.check_stake(stake, available_balance)?;

        log::debug!("Authorizing stake of {}", stake);
        self.pending = Some(PendingCall::StakeAuthorization { stake });
        Ok(StakeTicket { stake })
    }

    /// Applies the gateway's answer to [`Self::begin_round`]. A fresh board is only drawn once the stake is
    /// on record.
    pub fn complete_round(
        &mut self,
        authorization: core::result::Result<RoundReference, SettlementError>,
    ) -> Result<()> {
        let stake = match self.pending {
            Some(PendingCall::StakeAuthorization { stake }) => stake,
            _ => return Err(Violation::NoPendingCall.into()),
        };
        self.pending = None;

        let reference = authorization.inspect_err(|err| {
            log::warn!("Stake of {} was not authorized: {}", stake, err);
        })?;

        let board = self.generator.generate(stake, self.config.tile_count);
        debug_assert_eq!(board.tile_count(), self.config.tile_count);
        log::debug!(
            "Round {} started with stake {} on {} tiles",
            reference,
            stake,
            board.tile_count()
        );
        self.round = Some(Round::new(stake, reference, board));
        Ok(())
    }

    /// Reveals a hidden tile. Intents the round cannot accept are dropped and reported as
    /// [`RevealOutcome::Ignored`].
    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        match self.reveal_tile(index) {
            Ok(outcome) => outcome,
            Err(violation) => {
                log::warn!("Ignoring reveal of tile {}: {}", index, violation);
                RevealOutcome::Ignored(violation)
            }
        }
    }

    fn reveal_tile(&mut self, index: usize) -> core::result::Result<RevealOutcome, Violation> {
        if self.is_busy() {
            return Err(Violation::Busy);
        }
        let Some(round) = self.round.as_mut().filter(|round| round.phase == RoundPhase::Active)
        else {
            return Err(Violation::NotActive);
        };
        let Some(cell) = round.cells.get(index).copied() else {
            return Err(Violation::OutOfRange {
                index,
                tile_count: self.config.tile_count,
            });
        };
        if !cell.is_hidden() {
            return Err(Violation::AlreadyRevealed(index));
        }

        if round.board[index] {
            round.cells[index] = TileState::Cut;
            round.triggered_cut = Some(index);
            round.disclose();
            round.phase = RoundPhase::EndedLoss;
            log::debug!(
                "Round {} lost on tile {} after {} safe reveals",
                round.reference,
                index,
                round.safe_reveals
            );
            Ok(RevealOutcome::Cut)
        } else {
            round.cells[index] = TileState::Safe;
            round.safe_reveals += 1;
            let payout = self.config.payout.value_at(round.stake, round.safe_reveals);
            round.payout = Some(payout);
            log::trace!(
                "Tile {} safe, {} reveals, payout now {}",
                index,
                round.safe_reveals,
                payout
            );
            Ok(RevealOutcome::Safe { payout })
        }
    }

    /// Locks the round into settling and hands out the cash-out to submit. Only one cash-out can be
    /// outstanding, a second request is refused with [`Violation::Busy`].
    pub fn begin_cash_out(&mut self) -> Result<CashOutTicket> {
        if self.is_busy() {
            return Err(Violation::Busy.into());
        }
        let required = self.config.min_safe_reveals.max(1);
        let Some(round) = self.round.as_mut().filter(|round| round.phase == RoundPhase::Active)
        else {
            return Err(Violation::NotActive.into());
        };

        let ineligible = RoundError::IneligibleCashOut {
            revealed: round.safe_reveals,
            required,
        };
        if round.safe_reveals < required {
            return Err(ineligible);
        }
        let Some(amount) = round.payout.filter(|&amount| amount > 0) else {
            return Err(ineligible);
        };

        log::debug!("Cashing out {} on round {}", amount, round.reference);
        round.phase = RoundPhase::Settling;
        self.pending = Some(PendingCall::CashOut { amount });
        Ok(CashOutTicket {
            reference: round.reference.clone(),
            amount,
        })
    }

    /// Applies the gateway's answer to [`Self::begin_cash_out`]. A refusal puts the round back into play
    /// so the cash-out can be retried.
    pub fn complete_cash_out(
        &mut self,
        settlement: core::result::Result<(), SettlementError>,
    ) -> Result<()> {
        let amount = match self.pending {
            Some(PendingCall::CashOut { amount }) => amount,
            _ => return Err(Violation::NoPendingCall.into()),
        };
        let Some(round) = self.round.as_mut() else {
            return Err(Violation::NotActive.into());
        };
        self.pending = None;

        match settlement {
            Ok(()) => {
                round.disclose();
                round.phase = RoundPhase::EndedWin;
                log::debug!("Round {} settled for {}", round.reference, amount);
                Ok(())
            }
            Err(err) => {
                round.phase = RoundPhase::Active;
                log::warn!(
                    "Cash-out of {} on round {} failed: {}",
                    amount,
                    round.reference,
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Releases a call whose answer will never be applied, e.g. because the driver gave up waiting.
    /// The round goes back to the phase it had before the call. Returns `false` when nothing was pending.
    pub fn abandon_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(PendingCall::StakeAuthorization { stake }) => {
                log::warn!("Abandoned authorization of stake {}", stake);
                true
            }
            Some(PendingCall::CashOut { amount }) => {
                if let Some(round) = self.round.as_mut() {
                    round.phase = RoundPhase::Active;
                    log::warn!("Abandoned cash-out of {} on round {}", amount, round.reference);
                }
                true
            }
            None => false,
        }
    }

    /// Discards a finished round. Returns `false` when there is nothing to discard.
    pub fn new_round(&mut self) -> bool {
        if self.is_busy() || !self.phase().is_finished() {
            log::warn!("Ignoring new round request in phase {:?}", self.phase());
            return false;
        }
        self.round = None;
        true
    }
}
