use serde::{Deserialize, Serialize};

use crate::*;

/// Linear cash-out curve: every safe reveal adds `step_bps` to the multiplier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutCurve {
    step_bps: Bps,
}

impl PayoutCurve {
    /// `+0.05x` per safe tile.
    pub const DEFAULT_STEP_BPS: Bps = 500;

    pub const fn new(step_bps: Bps) -> Self {
        Self { step_bps }
    }

    pub const fn step_bps(&self) -> Bps {
        self.step_bps
    }

    /// Multiplier after `safe_reveals`, in basis points (`10_500` is `1.05x`).
    pub const fn multiplier_bps(&self, safe_reveals: TileCount) -> u64 {
        BPS_SCALE as u64 + safe_reveals as u64 * self.step_bps as u64
    }

    /// `floor(stake * multiplier)`, saturating at `Amount::MAX`.
    pub fn value_at(&self, stake: Amount, safe_reveals: TileCount) -> Amount {
        let scaled = u128::from(stake) * u128::from(self.multiplier_bps(safe_reveals))
            / u128::from(BPS_SCALE);
        scaled.try_into().unwrap_or(Amount::MAX)
    }

    /// Smallest stake for which every extra reveal raises the floored payout.
    pub const fn strictly_increasing_from(&self) -> Amount {
        if self.step_bps == 0 {
            return Amount::MAX;
        }
        (BPS_SCALE as Amount).div_ceil(self.step_bps as Amount)
    }
}

impl Default for PayoutCurve {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP_BPS)
    }
}
