//! SeqHandle: control-thread side of the engine's command channel.
//!
//! The engine stays the only writer of its state. Everything else sends
//! commands through the handle and reads feedback back.

use crossbeam_channel::{Receiver, Sender};

use super::commands::{SeqCmd, SeqFeedback};
use gatestep_types::SequencerAction;

/// Feedback capacity. Step notices beyond this are dropped, not queued.
pub const FEEDBACK_CAPACITY: usize = 1024;

/// Engine end of the channels; hand it to `StepSequencer::attach`.
pub struct EngineLink {
    pub(crate) cmd_rx: Receiver<SeqCmd>,
    pub(crate) feedback_tx: Sender<SeqFeedback>,
}

impl EngineLink {
    /// Non-blocking feedback send; a full or closed channel drops the message.
    #[inline]
    pub(crate) fn notify(&self, feedback: SeqFeedback) {
        let _ = self.feedback_tx.try_send(feedback);
    }
}

pub struct SeqHandle {
    cmd_tx: Sender<SeqCmd>,
    feedback_rx: Receiver<SeqFeedback>,
}

impl SeqHandle {
    /// Create a connected handle/engine pair.
    pub fn new() -> (Self, EngineLink) {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (feedback_tx, feedback_rx) = crossbeam_channel::bounded(FEEDBACK_CAPACITY);
        (
            Self { cmd_tx, feedback_rx },
            EngineLink { cmd_rx, feedback_tx },
        )
    }

    pub fn send(&self, cmd: SeqCmd) {
        if self.cmd_tx.send(cmd).is_err() {
            log::warn!(target: "engine", "sequencer engine is gone, command dropped");
        }
    }

    pub fn dispatch(&self, action: SequencerAction) {
        self.send(SeqCmd::Action(action));
    }

    /// Drain all pending feedback.
    pub fn poll_feedback(&self) -> Vec<SeqFeedback> {
        self.feedback_rx.try_iter().collect()
    }
}
