use cashorcut_core::{Amount, Bps, DensityBand, DensityTable, PayoutCurve, RoundConfig, TileCount};
use cashorcut_protocol::GameType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Currency, CurrencyFormat};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutSettings {
    pub step_bps: Bps,
}

impl Default for PayoutSettings {
    fn default() -> Self {
        Self {
            step_bps: PayoutCurve::DEFAULT_STEP_BPS,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashOutSettings {
    pub min_safe_reveals: TileCount,
}

impl Default for CashOutSettings {
    fn default() -> Self {
        Self {
            min_safe_reveals: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensitySettings {
    pub jitter: f64,
    pub ceiling_rate: f64,
    pub bands: Vec<DensityBand>,
}

impl Default for DensitySettings {
    fn default() -> Self {
        let table = DensityTable::default();
        Self {
            jitter: table.jitter(),
            ceiling_rate: table.ceiling_rate(),
            bands: table.bands().to_vec(),
        }
    }
}

/// Everything the game page needs to know up front. Every field has a default, so an empty file is a
/// valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for API paths, empty means same origin.
    pub api_base_url: String,
    pub game_type: GameType,
    pub tile_count: TileCount,
    pub currency: Currency,
    pub stake_presets: Vec<Amount>,
    pub min_stake: Amount,
    pub max_stake: Option<Amount>,
    pub payout: PayoutSettings,
    pub cash_out: CashOutSettings,
    pub density: DensitySettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            game_type: GameType::default(),
            tile_count: RoundConfig::DEFAULT_TILE_COUNT,
            currency: Currency::default(),
            stake_presets: vec![200, 400, 500, 1_000, 1_500, 2_500, 5_000],
            min_stake: RoundConfig::DEFAULT_MIN_STAKE,
            max_stake: None,
            payout: PayoutSettings::default(),
            cash_out: CashOutSettings::default(),
            density: DensitySettings::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_count < 2 {
            return Err(invalid("tile_count", "a board needs at least two tiles"));
        }
        if self.min_stake == 0 {
            return Err(invalid("min_stake", "must be positive"));
        }
        if let Some(max) = self.max_stake.filter(|&max| max < self.min_stake) {
            return Err(invalid(
                "max_stake",
                format!("{max} is below min_stake {}", self.min_stake),
            ));
        }
        if let Some(&preset) = self
            .stake_presets
            .iter()
            .find(|&&preset| !self.stake_allowed(preset))
        {
            return Err(invalid(
                "stake_presets",
                format!("{preset} is outside the stake limits"),
            ));
        }
        if self.payout.step_bps == 0 {
            return Err(invalid("payout.step_bps", "payouts must grow with each reveal"));
        }
        let min_reveals = self.cash_out.min_safe_reveals;
        if min_reveals == 0 || min_reveals >= self.tile_count {
            return Err(invalid(
                "cash_out.min_safe_reveals",
                format!("must be between 1 and {}", self.tile_count - 1),
            ));
        }
        self.validate_density()
    }

    fn validate_density(&self) -> Result<(), ConfigError> {
        let unit = 0.0..=1.0;
        let density = &self.density;
        if !unit.contains(&density.jitter) {
            return Err(invalid("density.jitter", "must be within [0, 1]"));
        }
        if !unit.contains(&density.ceiling_rate) {
            return Err(invalid("density.ceiling_rate", "must be within [0, 1]"));
        }
        for band in &density.bands {
            if !unit.contains(&band.min_rate) || !unit.contains(&band.max_rate) {
                return Err(invalid(
                    "density.bands",
                    format!("rates for stakes up to {} must be within [0, 1]", band.max_stake),
                ));
            }
            if band.min_rate > band.max_rate {
                return Err(invalid(
                    "density.bands",
                    format!("min_rate exceeds max_rate for stakes up to {}", band.max_stake),
                ));
            }
        }
        if density
            .bands
            .windows(2)
            .any(|pair| pair[0].max_stake >= pair[1].max_stake)
        {
            return Err(invalid("density.bands", "breakpoints must be strictly increasing"));
        }
        Ok(())
    }

    pub fn stake_allowed(&self, stake: Amount) -> bool {
        stake >= self.min_stake && self.max_stake.is_none_or(|max| stake <= max)
    }

    pub fn round_config(&self) -> RoundConfig {
        RoundConfig::new(
            self.tile_count,
            self.min_stake,
            self.max_stake,
            PayoutCurve::new(self.payout.step_bps),
            self.cash_out.min_safe_reveals,
        )
    }

    pub fn density_table(&self) -> DensityTable {
        DensityTable::new(
            self.density.bands.clone(),
            self.density.ceiling_rate,
            self.density.jitter,
        )
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::new(self.currency)
    }
}
