//! Command and feedback types between the control thread and the engine.

use gatestep_types::{SequencerAction, SequencerState};

/// Commands sent to the engine. Applied at the next block boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SeqCmd {
    /// Pattern edit (run toggle, gate edits, gate mode, ...)
    Action(SequencerAction),
    /// Replace the persisted fields, e.g. after loading a patch
    Restore(SequencerState),
    /// Same effect as an edge on the reset input
    Reset,
}

/// Notifications from the engine for displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqFeedback {
    /// A step-advance landed on this step.
    Step { index: usize },
    RunChanged { running: bool },
}
