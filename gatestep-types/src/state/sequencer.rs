//! Step sequencer pattern state.

use serde::{Deserialize, Serialize};

use crate::MAX_STEPS;

/// How an enabled step's gate is shaped on the gate output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Fixed-width blip at the start of the step.
    #[default]
    Trigger,
    /// Full step minus a short gap at its start.
    Retrigger,
    /// High for the whole step.
    Gate,
}

impl GateMode {
    pub const ALL: [GateMode; 3] = [GateMode::Trigger, GateMode::Retrigger, GateMode::Gate];

    /// Integer code used in saved documents.
    pub fn code(self) -> i64 {
        match self {
            GateMode::Trigger => 0,
            GateMode::Retrigger => 1,
            GateMode::Gate => 2,
        }
    }

    /// Decode a saved integer. Codes outside the known range behave as `Gate`,
    /// the policy that passes the gate table through unshaped.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => GateMode::Trigger,
            1 => GateMode::Retrigger,
            _ => GateMode::Gate,
        }
    }

    pub fn next(self) -> Self {
        match self {
            GateMode::Trigger => GateMode::Retrigger,
            GateMode::Retrigger => GateMode::Gate,
            GateMode::Gate => GateMode::Trigger,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GateMode::Trigger => "trigger",
            GateMode::Retrigger => "retrigger",
            GateMode::Gate => "gate",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trigger" | "trig" => Some(GateMode::Trigger),
            "retrigger" | "retrig" => Some(GateMode::Retrigger),
            "gate" => Some(GateMode::Gate),
            _ => None,
        }
    }
}

impl std::fmt::Display for GateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Transport run state, derived from `SequencerState::running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// Which per-step control set the panel is showing. Runtime only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Pitch,
    Gate,
}

/// Persisted pattern state of one sequencer instance.
///
/// The gate table has a fixed length of `MAX_STEPS`. Steps past the active
/// step count keep their values; shortening the pattern never erases them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerState {
    pub running: bool,
    pub gates: [bool; MAX_STEPS],
    pub gate_mode: GateMode,
}

impl SequencerState {
    pub fn new() -> Self {
        Self {
            running: false,
            gates: [false; MAX_STEPS],
            gate_mode: GateMode::default(),
        }
    }

    pub fn run_state(&self) -> RunState {
        if self.running {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }

    /// Gate flag for a step; out-of-range steps read as disabled.
    pub fn gate(&self, step: usize) -> bool {
        self.gates.get(step).copied().unwrap_or(false)
    }

    pub fn active_gate_count(&self) -> usize {
        self.gates.iter().filter(|g| **g).count()
    }
}

impl Default for SequencerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_stopped_and_empty() {
        let state = SequencerState::default();
        assert!(!state.running);
        assert_eq!(state.run_state(), RunState::Stopped);
        assert_eq!(state.active_gate_count(), 0);
        assert_eq!(state.gate_mode, GateMode::Trigger);
    }

    #[test]
    fn gate_mode_codes_round_trip() {
        for mode in GateMode::ALL {
            assert_eq!(GateMode::from_code(mode.code()), mode);
        }
    }

    #[test]
    fn unknown_gate_mode_code_is_gate() {
        assert_eq!(GateMode::from_code(7), GateMode::Gate);
        assert_eq!(GateMode::from_code(-1), GateMode::Gate);
    }

    #[test]
    fn gate_mode_cycles_through_all() {
        let mut mode = GateMode::Trigger;
        for _ in 0..3 {
            mode = mode.next();
        }
        assert_eq!(mode, GateMode::Trigger);
    }

    #[test]
    fn gate_mode_names() {
        assert_eq!(GateMode::from_name("RETRIG"), Some(GateMode::Retrigger));
        assert_eq!(GateMode::from_name("gate"), Some(GateMode::Gate));
        assert_eq!(GateMode::from_name("nope"), None);
        assert_eq!(GateMode::Trigger.to_string(), "trigger");
    }

    #[test]
    fn gate_out_of_range_is_false() {
        let mut state = SequencerState::new();
        state.gates[MAX_STEPS - 1] = true;
        assert!(state.gate(MAX_STEPS - 1));
        assert!(!state.gate(MAX_STEPS));
    }
}
