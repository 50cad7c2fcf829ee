//! Knob values owned by the host panel.

use serde::{Deserialize, Serialize};

use crate::MAX_STEPS;

pub const CLOCK_MIN: f32 = -2.0;
pub const CLOCK_MAX: f32 = 6.0;
pub const CLOCK_DEFAULT: f32 = 2.0;
pub const PITCH_MIN: f32 = 0.0;
pub const PITCH_MAX: f32 = 6.0;

/// Panel knob values read by the engine every sample.
///
/// These are not part of the module document; the host stores them next to
/// it (see the patch file in gatestep-core).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelParams {
    /// Clock rate exponent: tempo is `2^clock` steps per second.
    pub clock: f32,
    /// Active step count knob, rounded by the engine.
    pub steps: f32,
    /// Pitch CV per step.
    pub pitches: [f32; MAX_STEPS],
}

impl PanelParams {
    pub fn new() -> Self {
        Self {
            clock: CLOCK_DEFAULT,
            steps: MAX_STEPS as f32,
            pitches: [0.0; MAX_STEPS],
        }
    }

    pub fn set_clock(&mut self, clock: f32) {
        self.clock = clock.clamp(CLOCK_MIN, CLOCK_MAX);
    }

    pub fn set_steps(&mut self, steps: f32) {
        self.steps = steps.clamp(1.0, MAX_STEPS as f32);
    }

    /// Set one step's pitch; out-of-range steps are ignored.
    pub fn set_pitch(&mut self, step: usize, pitch: f32) {
        if let Some(p) = self.pitches.get_mut(step) {
            *p = pitch.clamp(PITCH_MIN, PITCH_MAX);
        }
    }
}

impl Default for PanelParams {
    fn default() -> Self {
        Self::new()
    }
}
