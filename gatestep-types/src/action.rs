//! Control-plane actions on the pattern state.
//!
//! These come from panel buttons, the CLI or a loaded patch. They are applied
//! by `reduce::reduce_action`, either directly (outside the audio path) or on
//! the audio side at a block boundary.

use crate::state::{EditMode, GateMode};

#[derive(Debug, Clone, PartialEq)]
pub enum SequencerAction {
    /// Flip running/stopped (one press = one toggle)
    ToggleRun,
    SetRunning(bool),
    /// Flip one step's gate flag
    ToggleGate(usize),
    SetGate(usize, bool),
    SetGateMode(GateMode),
    /// Advance to the next gate mode
    CycleGateMode,
    /// Disable every gate
    ClearGates,
    /// Fill the gate table from a seeded generator (about half the steps on)
    RandomizeGates { seed: u64 },
    SetEditMode(EditMode),
}
