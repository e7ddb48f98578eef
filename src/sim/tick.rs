//! Per-frame driver
//!
//! Applies one frame of player input to the machine, then advances the reel
//! animations by the frame time.

use super::evaluate::SpinResult;
use super::rng::RandomSource;
use super::state::SlotMachine;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start a spin (space / spin button)
    pub spin: bool,
    /// Add paylines (arrow up)
    pub paylines_up: bool,
    /// Remove paylines (arrow down)
    pub paylines_down: bool,
    /// Attract mode: spin again whenever the reels are idle
    pub auto_spin: bool,
}

/// Advance the machine by one frame of `dt_ms`
///
/// Returns the result on the frame a spin commits. Payline changes are
/// applied before a spin started on the same frame.
pub fn tick<R: RandomSource>(
    machine: &mut SlotMachine<R>,
    input: &TickInput,
    dt_ms: f32,
) -> Option<SpinResult> {
    if input.paylines_up {
        machine.increase_paylines();
    }
    if input.paylines_down {
        machine.decrease_paylines();
    }

    if (input.spin || input.auto_spin) && !machine.is_spinning() {
        // Results reach tick callers through the return value and events
        if machine.spin().is_none() && input.auto_spin {
            log::debug!("Auto spin stopped: out of credits");
        }
    }

    machine.advance(dt_ms)
}
