//! Free-spin bonus state machine
//!
//! `Idle` (no free spins, multiplier 1) and `Active` (free spins pending,
//! multiplier fixed by the theme). Scatter triggers add spins; each spin
//! taken while active consumes one, and the machine collapses back to idle
//! when the last one is consumed.

use serde::{Deserialize, Serialize};

use crate::theme::BonusRules;

/// Bonus phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusPhase {
    Idle,
    Active,
}

/// Free spins remaining and the win multiplier they carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusState {
    free_spins_remaining: u32,
    multiplier: u32,
}

impl Default for BonusState {
    fn default() -> Self {
        Self {
            free_spins_remaining: 0,
            multiplier: 1,
        }
    }
}

impl BonusState {
    pub fn free_spins_remaining(&self) -> u32 {
        self.free_spins_remaining
    }

    /// Win multiplier (1 when idle)
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn phase(&self) -> BonusPhase {
        if self.free_spins_remaining > 0 {
            BonusPhase::Active
        } else {
            BonusPhase::Idle
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase() == BonusPhase::Active
    }

    /// Scatter trigger: add free spins, set the bonus multiplier
    ///
    /// Retriggering while active extends the count; the multiplier stays at
    /// the theme's fixed value.
    pub fn trigger(&mut self, rules: &BonusRules) {
        self.free_spins_remaining = self.free_spins_remaining.saturating_add(rules.free_spins);
        if self.free_spins_remaining > 0 {
            self.multiplier = rules.multiplier.max(1);
        }
    }

    /// Take one free spin; returns true if that was the last one
    ///
    /// No-op while idle.
    pub fn consume_spin(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.free_spins_remaining -= 1;
        if self.free_spins_remaining == 0 {
            self.multiplier = 1;
            true
        } else {
            false
        }
    }
}
