//! Game configuration
//!
//! Everything the engine consumes at construction: the theme plus the
//! session's stake parameters. Loadable from JSON so a page can ship its own
//! reskin without recompiling.

use serde::{Deserialize, Serialize};

use crate::theme::{Theme, ThemeKind};

/// Largest symbol set a `SymbolId` can address
pub const MAX_SYMBOLS: usize = u8::MAX as usize + 1;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("symbol set is empty")]
    EmptySymbolSet,

    #[error("symbol set has {0} symbols (max 256)")]
    TooManySymbols(usize),

    #[error("{role} symbol {id} is outside the {count}-symbol set")]
    SymbolOutOfRange {
        role: &'static str,
        id: u8,
        count: usize,
    },

    #[error("wild and scatter must be different symbols")]
    WildIsScatter,

    #[error("bet must be positive")]
    ZeroBet,

    #[error("max paylines must be positive")]
    ZeroMaxPaylines,

    #[error("initial paylines {paylines} outside 1..={max}")]
    PaylinesOutOfRange { paylines: u32, max: u32 },

    #[error("invalid reel timing: {0}")]
    InvalidTiming(&'static str),

    #[error("invalid bonus rules: {0}")]
    InvalidBonus(&'static str),
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub theme: Theme,
    /// Upper bound for the player-selected payline count
    pub max_paylines: u32,
    /// Payline count when the session starts
    pub paylines: u32,
    /// Starting credit balance
    pub initial_credits: u64,
    /// Credits wagered per paid spin
    pub bet: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_preset(ThemeKind::default())
    }
}

impl GameConfig {
    /// Standard session for a built-in theme
    pub fn from_preset(kind: ThemeKind) -> Self {
        Self {
            theme: kind.theme(),
            max_paylines: 25,
            paylines: kind.initial_paylines(),
            initial_credits: 1000,
            bet: 10,
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let theme = &self.theme;
        let count = theme.symbol_count();
        if count == 0 {
            return Err(ConfigError::EmptySymbolSet);
        }
        if count > MAX_SYMBOLS {
            return Err(ConfigError::TooManySymbols(count));
        }

        let in_range = |role: &'static str, id: u8| {
            if (id as usize) < count {
                Ok(())
            } else {
                Err(ConfigError::SymbolOutOfRange { role, id, count })
            }
        };
        in_range("wild", theme.wild.0)?;
        if let Some(scatter) = theme.scatter {
            in_range("scatter", scatter.0)?;
            if scatter == theme.wild {
                return Err(ConfigError::WildIsScatter);
            }
        }
        for entry in &theme.payouts.entries {
            in_range("payout", entry.symbol.0)?;
        }

        if self.bet == 0 {
            return Err(ConfigError::ZeroBet);
        }
        if self.max_paylines == 0 {
            return Err(ConfigError::ZeroMaxPaylines);
        }
        if self.paylines == 0 || self.paylines > self.max_paylines {
            return Err(ConfigError::PaylinesOutOfRange {
                paylines: self.paylines,
                max: self.max_paylines,
            });
        }

        if theme.scatter.is_some() {
            let bonus = &theme.bonus;
            if bonus.scatter_threshold == 0 {
                return Err(ConfigError::InvalidBonus("scatter threshold must be positive"));
            }
            if bonus.free_spins == 0 {
                return Err(ConfigError::InvalidBonus("free spins must be positive"));
            }
        }

        let timing = &theme.timing;
        if !(timing.base_duration_ms > 0.0) {
            return Err(ConfigError::InvalidTiming("base duration must be positive"));
        }
        if !(timing.reel_height > 0.0) {
            return Err(ConfigError::InvalidTiming("reel height must be positive"));
        }
        if timing.stagger_ms < 0.0 || timing.duration_jitter_ms < 0.0 || timing.base_speed < 0.0 {
            return Err(ConfigError::InvalidTiming("negative stagger, jitter or speed"));
        }

        Ok(())
    }
}
