//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing (animation frame timestamps to engine deltas)
//! - The browser binding and its render loop (`web`, wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::consts::FRAME_MS;

/// Longest step fed to the engine in one frame (ms)
///
/// A backgrounded tab resumes with a huge timestamp gap; clamping keeps
/// the reels animating instead of snapping to their stop.
pub const MAX_FRAME_DELTA_MS: f32 = 100.0;

/// Turns monotonically increasing frame timestamps into clamped deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_time_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous frame; the first frame counts as one
    /// reference frame
    pub fn delta(&mut self, time_ms: f64) -> f32 {
        let dt = match self.last_time_ms {
            Some(last) => ((time_ms - last) as f32).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => FRAME_MS,
        };
        self.last_time_ms = Some(time_ms);
        dt
    }

    /// Forget the previous timestamp (tab hidden, loop restarted)
    pub fn reset(&mut self) {
        self.last_time_ms = None;
    }
}
