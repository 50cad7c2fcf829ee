//! Real-time engine of the gatestep step sequencer.

pub mod bus;
pub mod commands;
pub mod edge;
pub mod handle;
pub mod lights;
pub mod phase;
pub mod pulse;
pub mod sequencer;
pub mod telemetry;

pub use bus::{SeqInputs, SeqOutputs};
pub use commands::{SeqCmd, SeqFeedback};
pub use edge::EdgeDetector;
pub use handle::{EngineLink, SeqHandle};
pub use lights::StepLights;
pub use phase::PhaseAccumulator;
pub use pulse::PulseGenerator;
pub use sequencer::{Playhead, StepSequencer};
pub use telemetry::{RenderTelemetry, TelemetrySummary};
