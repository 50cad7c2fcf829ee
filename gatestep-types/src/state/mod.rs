pub mod panel;
pub mod sequencer;

pub use panel::*;
pub use sequencer::*;
