#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use payout::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod payout;
mod tile;
mod types;

/// Session-wide rules a [`RoundEngine`] is built with.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub tile_count: TileCount,
    pub min_stake: Amount,
    pub max_stake: Option<Amount>,
    pub payout: PayoutCurve,
    pub min_safe_reveals: TileCount,
}

impl RoundConfig {
    pub const DEFAULT_TILE_COUNT: TileCount = 49;
    pub const DEFAULT_MIN_STAKE: Amount = 100;

    pub const fn new_unchecked(
        tile_count: TileCount,
        min_stake: Amount,
        max_stake: Option<Amount>,
        payout: PayoutCurve,
        min_safe_reveals: TileCount,
    ) -> Self {
        Self {
            tile_count,
            min_stake,
            max_stake,
            payout,
            min_safe_reveals,
        }
    }

    /// Clamps the values into a playable configuration: two or more tiles, a positive minimum stake and
    /// at least one safe reveal before cashing out.
    pub fn new(
        tile_count: TileCount,
        min_stake: Amount,
        max_stake: Option<Amount>,
        payout: PayoutCurve,
        min_safe_reveals: TileCount,
    ) -> Self {
        let tile_count = tile_count.max(2);
        let min_stake = min_stake.max(1);
        let max_stake = max_stake.map(|max| max.max(min_stake));
        let min_safe_reveals = min_safe_reveals.clamp(1, tile_count - 1);
        Self::new_unchecked(tile_count, min_stake, max_stake, payout, min_safe_reveals)
    }

    pub fn with_tile_count(self, tile_count: TileCount) -> Self {
        Self::new(
            tile_count,
            self.min_stake,
            self.max_stake,
            self.payout,
            self.min_safe_reveals,
        )
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::new_unchecked(
            Self::DEFAULT_TILE_COUNT,
            Self::DEFAULT_MIN_STAKE,
            None,
            PayoutCurve::default(),
            1,
        )
    }
}

/// Hidden layout of a round, `true` marks a cut tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cuts: Vec<bool>,
    cut_count: TileCount,
}

impl Board {
    pub fn from_mask(cuts: Vec<bool>) -> Self {
        let cut_count = cuts
            .iter()
            .filter(|&&is_cut| is_cut)
            .count()
            .try_into()
            .unwrap_or(TileCount::MAX);
        Self { cuts, cut_count }
    }

    pub fn from_cut_indices(tile_count: TileCount, cut_indices: &[usize]) -> Result<Self> {
        let mut cuts = alloc::vec![false; usize::from(tile_count)];

        for &index in cut_indices {
            let Some(cell) = cuts.get_mut(index) else {
                return Err(Violation::OutOfRange { index, tile_count }.into());
            };
            *cell = true;
        }

        Ok(Self::from_mask(cuts))
    }

    pub fn tile_count(&self) -> TileCount {
        self.cuts.len().try_into().unwrap_or(TileCount::MAX)
    }

    pub fn cut_count(&self) -> TileCount {
        self.cut_count
    }

    pub fn safe_count(&self) -> TileCount {
        self.tile_count() - self.cut_count
    }

    pub fn is_cut(&self, index: usize) -> Option<bool> {
        self.cuts.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.cuts.iter().copied()
    }
}

impl Index<usize> for Board {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.cuts[index]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Intent dropped without touching the round.
    Ignored(Violation),
    Safe { payout: Amount },
    Cut,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            Ignored(_) => false,
            Safe { .. } => true,
            Cut => true,
        }
    }
}
