//! Deterministic simulation module
//!
//! All spin and payout logic lives here. This module must be pure and
//! deterministic:
//! - Injected RNG only
//! - Stable evaluation order (by payline index)
//! - Time advances only through `advance` / `tick`
//! - No rendering or platform dependencies

pub mod animation;
pub mod bonus;
pub mod evaluate;
pub mod grid;
pub mod payline;
pub mod rng;
pub mod state;
pub mod tick;

pub use animation::{ReelAnimation, ReelFrame, ReelPhase};
pub use bonus::{BonusPhase, BonusState};
pub use evaluate::{LineMatch, SpinResult, WinTier, WinningLine, evaluate, evaluate_line, substitute_wilds};
pub use grid::{Grid, Reel, SymbolId, generate_grid};
pub use payline::{PAYLINES, Payline, PaylineShape, active_paylines};
pub use rng::{RandomSource, RngState, SequenceSource};
pub use state::{SlotMachine, SpinEvent, SpinTicket};
pub use tick::{TickInput, tick};
