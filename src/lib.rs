//! Reel Engine - themed 3x3 slot machine core
//!
//! Core modules:
//! - `sim`: Deterministic spin/payout engine (outcomes, paylines, bonus, reel timing)
//! - `theme`: Per-theme symbol sets, payout tables and reel timing
//! - `config`: Game configuration supplied at construction
//! - `platform`: Browser binding that owns the frame loop

pub mod config;
pub mod platform;
pub mod sim;
pub mod theme;

pub use config::{ConfigError, GameConfig};
pub use sim::{SlotMachine, SpinResult};
pub use theme::{Theme, ThemeKind};

/// Engine constants
pub mod consts {
    /// Reel columns on the grid
    pub const REEL_COUNT: usize = 3;
    /// Visible rows per reel
    pub const ROW_COUNT: usize = 3;

    /// Reference frame length (ms) that reel speeds are expressed against
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Progress after which a reel stops scrolling and settles onto its symbols
    pub const SETTLE_START: f32 = 0.95;
    /// Offset decay rate during the settle window (1 / (1 - SETTLE_START))
    pub const SETTLE_RATE: f32 = 20.0;

    /// Paylines added or removed per step
    pub const PAYLINE_STEP: u32 = 2;
}

/// Quartic ease-in-out over [0, 1]
#[inline]
pub fn ease_in_out_quart(t: f32) -> f32 {
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
    }
}
