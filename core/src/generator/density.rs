use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use super::RandomSource;
use crate::*;

/// Stakes up to `max_stake` draw their base cut rate uniformly from `[min_rate, max_rate]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityBand {
    pub max_stake: Amount,
    pub min_rate: f64,
    pub max_rate: f64,
}

impl DensityBand {
    pub const fn new(max_stake: Amount, min_rate: f64, max_rate: f64) -> Self {
        Self {
            max_stake,
            min_rate,
            max_rate,
        }
    }

    fn normalized(self) -> Self {
        let a = self.min_rate.clamp(0.0, 1.0);
        let b = self.max_rate.clamp(0.0, 1.0);
        Self::new(self.max_stake, a.min(b), a.max(b))
    }
}

/// Maps a stake to the cut density of a freshly generated board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityTable {
    bands: Vec<DensityBand>,
    ceiling_rate: f64,
    jitter: f64,
}

impl DensityTable {
    pub const DEFAULT_JITTER: f64 = 0.05;
    pub const DEFAULT_CEILING_RATE: f64 = 0.40;

    /// Bands are sorted by `max_stake` and every rate is clamped into `[0, 1]`.
    pub fn new(mut bands: Vec<DensityBand>, ceiling_rate: f64, jitter: f64) -> Self {
        bands.sort_by_key(|band| band.max_stake);
        bands.dedup_by_key(|band| band.max_stake);
        Self {
            bands: bands.into_iter().map(DensityBand::normalized).collect(),
            ceiling_rate: ceiling_rate.clamp(0.0, 1.0),
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    pub fn bands(&self) -> &[DensityBand] {
        &self.bands
    }

    pub fn ceiling_rate(&self) -> f64 {
        self.ceiling_rate
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// First band whose `max_stake` covers `stake`, `None` above the last breakpoint.
    pub fn band_for(&self, stake: Amount) -> Option<&DensityBand> {
        self.bands.iter().find(|band| stake <= band.max_stake)
    }

    pub fn base_rate(&self, stake: Amount, source: &mut impl RandomSource) -> f64 {
        match self.band_for(stake) {
            Some(band) => band.min_rate + source.next_float() * (band.max_rate - band.min_rate),
            None => self.ceiling_rate,
        }
    }

    /// Base rate plus symmetric jitter of `±jitter`, clamped into `[0, 1]`.
    pub fn draw_rate(&self, stake: Amount, source: &mut impl RandomSource) -> f64 {
        let base = self.base_rate(stake, source);
        let variation = (source.next_float() - 0.5) * 2.0 * self.jitter;
        (base + variation).clamp(0.0, 1.0)
    }
}

impl Default for DensityTable {
    fn default() -> Self {
        Self::new(
            vec![
                DensityBand::new(500, 0.03, 0.08),
                DensityBand::new(2_000, 0.08, 0.25),
                DensityBand::new(5_000, 0.25, 0.40),
            ],
            Self::DEFAULT_CEILING_RATE,
            Self::DEFAULT_JITTER,
        )
    }
}

/// Converts a density into a cut count, rounding half up.
///
/// At least one tile is a cut and at least one stays safe whenever the board has two or more tiles.
pub fn cut_count_for(rate: f64, tile_count: TileCount) -> TileCount {
    let scaled = f64::from(tile_count) * rate.clamp(0.0, 1.0);
    // non-negative, so truncation after +0.5 rounds half up
    let rounded = (scaled + 0.5) as TileCount;
    rounded.clamp(1, tile_count.saturating_sub(1).max(1))
}
