//! Host-side services for the gatestep sequencer: configuration, patch
//! persistence and offline rendering.

pub mod config;
pub mod persistence;
pub mod render;

pub use config::Config;
pub use persistence::{apply_document, load_patch, save_patch, to_document};
pub use render::{render, write_wav, RenderSettings, Rendered};
