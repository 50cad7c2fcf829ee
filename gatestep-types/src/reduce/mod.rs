//! Pure state-mutation reducers.
//!
//! These functions are the single source of truth for action → state
//! mutations. The CLI applies them directly to a loaded pattern; the audio
//! engine applies them when it drains its command queue.
//!
//! Reducers only touch `SequencerState` and the edit mode. They never move
//! the transport (phase, step index, pulse) and never fail.

mod sequencer;

use crate::{EditMode, SequencerAction, SequencerState};

pub use sequencer::Lcg;

/// Apply an action's mutations to the given state.
/// Returns true if anything changed.
pub fn reduce_action(
    action: &SequencerAction,
    state: &mut SequencerState,
    edit_mode: &mut EditMode,
) -> bool {
    match action {
        SequencerAction::SetEditMode(mode) => {
            let changed = *edit_mode != *mode;
            *edit_mode = *mode;
            changed
        }
        other => sequencer::reduce(other, state),
    }
}
