//! Per-sample input and output buses of the sequencer.

use gatestep_types::MAX_STEPS;

/// Raw port and button values for one sample.
///
/// Buttons are momentary: the engine runs its own edge detectors on them,
/// so holding a button down counts as a single press.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeqInputs {
    pub run_button: f32,
    pub reset_button: f32,
    pub reset_input: f32,
    pub clock_cv: f32,
    /// External clock signal; `None` when nothing is patched in, which
    /// selects the internal clock.
    pub ext_clock: Option<f32>,
    pub steps_cv: f32,
    pub pitch_edit_button: f32,
    pub gate_edit_button: f32,
}

/// Outputs produced for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeqOutputs {
    /// Pitch CV of the current step.
    pub pitch: f32,
    /// 0.0 or `GATE_HIGH`.
    pub gate: f32,
    /// 1.0 while the gate output is high.
    pub gate_light: f32,
    pub step_lights: [f32; MAX_STEPS],
}

impl SeqOutputs {
    pub fn silent() -> Self {
        Self {
            pitch: 0.0,
            gate: 0.0,
            gate_light: 0.0,
            step_lights: [0.0; MAX_STEPS],
        }
    }

    pub fn gate_high(&self) -> bool {
        self.gate > 0.0
    }
}

impl Default for SeqOutputs {
    fn default() -> Self {
        Self::silent()
    }
}
