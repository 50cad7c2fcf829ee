//! # gatestep-types
//!
//! Shared type definitions for the gatestep step sequencer.
//! This crate holds the persisted pattern state, the host-owned panel
//! parameters, control-plane actions and the pure reducers that apply them.
//! It is used by gatestep-audio (the per-sample engine) and gatestep-core
//! (persistence, config, rendering).

pub mod action;
pub mod reduce;
pub mod state;

pub use action::SequencerAction;
pub use state::*;

/// Number of steps in a pattern. The gate table always has this length.
pub const MAX_STEPS: usize = 16;

/// Output voltage of a high gate.
pub const GATE_HIGH: f32 = 10.0;

/// Width of the pulse that shapes trigger/retrigger gates, in seconds.
pub const GATE_PULSE_SECS: f32 = 1e-3;
