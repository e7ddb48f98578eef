//! Reel stop animation
//!
//! Purely cosmetic: the outcome is fixed before any reel moves. Each reel
//! waits out its stagger delay, spins with an eased slowdown over a
//! randomized duration, settles onto its symbols and reports stopped. The
//! controller joins on all three before committing the result.

use serde::{Deserialize, Serialize};

use crate::consts::{FRAME_MS, SETTLE_RATE, SETTLE_START};
use crate::ease_in_out_quart;
use crate::theme::ReelTiming;

/// Where a reel is in its stop sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReelPhase {
    /// Stagger delay not yet elapsed
    Waiting,
    Spinning,
    Stopped,
}

/// Per-frame values published to the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReelFrame {
    /// Vertical scroll offset in px, within [0, reel_height)
    pub offset: f32,
    /// Current scroll speed in px per reference frame
    pub speed: f32,
}

/// One reel's animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelAnimation {
    delay_ms: f32,
    duration_ms: f32,
    /// Time since the spin began, including the delay
    clock_ms: f32,
    phase: ReelPhase,
    frame: ReelFrame,
}

impl Default for ReelAnimation {
    fn default() -> Self {
        Self::stopped()
    }
}

impl ReelAnimation {
    /// A reel at rest
    pub fn stopped() -> Self {
        Self {
            delay_ms: 0.0,
            duration_ms: 0.0,
            clock_ms: 0.0,
            phase: ReelPhase::Stopped,
            frame: ReelFrame::default(),
        }
    }

    /// Start reel `reel` of a new spin; `unit` in [0, 1) picks the duration
    pub fn start(reel: usize, timing: &ReelTiming, unit: f32) -> Self {
        Self {
            delay_ms: reel as f32 * timing.stagger_ms,
            duration_ms: timing.base_duration_ms + unit * timing.duration_jitter_ms,
            clock_ms: 0.0,
            phase: ReelPhase::Waiting,
            frame: ReelFrame::default(),
        }
    }

    pub fn phase(&self) -> ReelPhase {
        self.phase
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.phase == ReelPhase::Stopped
    }

    pub fn frame(&self) -> ReelFrame {
        self.frame
    }

    /// Spin duration after the stagger delay (ms)
    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Total time from spin start until this reel stops (ms)
    pub fn stop_time_ms(&self) -> f32 {
        self.delay_ms + self.duration_ms
    }

    /// Linear progress through the spin, 0 while waiting
    pub fn progress(&self) -> f32 {
        match self.phase {
            ReelPhase::Waiting => 0.0,
            ReelPhase::Stopped => 1.0,
            ReelPhase::Spinning => {
                ((self.clock_ms - self.delay_ms) / self.duration_ms.max(f32::EPSILON)).min(1.0)
            }
        }
    }

    /// Advance by `dt_ms`; returns true on the frame the reel stops
    pub fn advance(&mut self, dt_ms: f32, timing: &ReelTiming) -> bool {
        if self.phase == ReelPhase::Stopped {
            return false;
        }

        let previous_ms = self.clock_ms;
        self.clock_ms += dt_ms.max(0.0);
        if self.clock_ms < self.delay_ms {
            return false;
        }
        self.phase = ReelPhase::Spinning;

        // Only the part of this step after the delay moves the reel
        let moving_ms = self.clock_ms - previous_ms.max(self.delay_ms);
        let progress = self.progress();
        let eased = ease_in_out_quart(progress);
        self.frame.speed = timing.base_speed * (1.0 - eased);

        if progress < SETTLE_START {
            self.frame.offset += self.frame.speed * (moving_ms / FRAME_MS);
            self.frame.offset = self.frame.offset.rem_euclid(timing.reel_height);
        } else {
            // Decay is per reference frame
            let decay = (1.0 - (progress - SETTLE_START) * SETTLE_RATE).max(0.0);
            self.frame.offset *= decay.powf(moving_ms / FRAME_MS);
        }

        if progress >= 1.0 {
            self.frame = ReelFrame::default();
            self.phase = ReelPhase::Stopped;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> ReelTiming {
        ReelTiming::default()
    }

    #[test]
    fn test_stagger_and_duration() {
        let t = timing();
        let first = ReelAnimation::start(0, &t, 0.0);
        let third = ReelAnimation::start(2, &t, 0.5);
        assert_eq!(first.stop_time_ms(), 1000.0);
        assert_eq!(third.stop_time_ms(), 600.0 + 1250.0);
        assert_eq!(third.phase(), ReelPhase::Waiting);
    }

    #[test]
    fn test_waits_out_delay() {
        let t = timing();
        let mut reel = ReelAnimation::start(1, &t, 0.0);
        assert!(!reel.advance(299.0, &t));
        assert_eq!(reel.phase(), ReelPhase::Waiting);
        assert_eq!(reel.frame(), ReelFrame::default());

        reel.advance(10.0, &t);
        assert_eq!(reel.phase(), ReelPhase::Spinning);
        assert!(reel.frame().speed > 0.0);
    }

    #[test]
    fn test_stops_exactly_once() {
        let t = timing();
        let mut reel = ReelAnimation::start(0, &t, 0.2);
        let mut stops = 0;
        let mut elapsed = 0.0;
        while elapsed < 3000.0 {
            if reel.advance(FRAME_MS, &t) {
                stops += 1;
                assert!(elapsed + FRAME_MS >= reel.stop_time_ms() - 0.01);
            }
            elapsed += FRAME_MS;
        }
        assert_eq!(stops, 1);
        assert!(reel.is_stopped());
        assert_eq!(reel.frame(), ReelFrame::default());
    }

    #[test]
    fn test_offset_stays_within_cell() {
        let t = timing();
        let mut reel = ReelAnimation::start(0, &t, 0.9);
        while !reel.is_stopped() {
            reel.advance(FRAME_MS, &t);
            let frame = reel.frame();
            assert!(frame.offset >= 0.0 && frame.offset < t.reel_height);
            assert!(frame.speed >= 0.0 && frame.speed <= t.base_speed);
        }
    }

    #[test]
    fn test_speed_decreases_after_midpoint() {
        let t = timing();
        let mut reel = ReelAnimation::start(0, &t, 0.0);
        reel.advance(500.0, &t);
        let mid = reel.frame().speed;
        reel.advance(300.0, &t);
        assert!(reel.frame().speed < mid);
    }

    #[test]
    fn test_settle_ignores_empty_steps() {
        let t = timing();
        let mut reel = ReelAnimation::start(0, &t, 0.0);
        while reel.progress() < 0.96 {
            reel.advance(FRAME_MS / 4.0, &t);
        }
        let settling = reel.frame();
        assert!(!reel.advance(0.0, &t));
        assert_eq!(reel.frame(), settling);
    }

    #[test]
    fn test_settle_independent_of_frame_rate() {
        let t = timing();
        let mut at_60 = ReelAnimation::start(0, &t, 0.0);
        let mut at_240 = ReelAnimation::start(0, &t, 0.0);
        // Same path up to the settle window
        at_60.advance(950.0, &t);
        at_240.advance(950.0, &t);
        assert_eq!(at_60.frame(), at_240.frame());

        at_60.advance(FRAME_MS, &t);
        for _ in 0..4 {
            at_240.advance(FRAME_MS / 4.0, &t);
        }
        let (a, b) = (at_60.frame().offset, at_240.frame().offset);
        assert!((a - b).abs() <= 0.25 * a.max(b) + 1e-3, "{} vs {}", a, b);
    }

    #[test]
    fn test_single_large_step_finishes() {
        let t = timing();
        let mut reel = ReelAnimation::start(2, &t, 0.99);
        assert!(reel.advance(10_000.0, &t));
        assert!(!reel.advance(16.0, &t));
    }
}
