pub mod document;

pub use document::{apply_document, to_document};

use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use gatestep_types::{PanelParams, SequencerState};

#[derive(Serialize)]
struct PatchFile<'a> {
    params: &'a PanelParams,
    data: Value,
}

/// Save panel knobs and the module document as pretty JSON.
///
/// Parent directories are created as needed.
pub fn save_patch(path: &Path, params: &PanelParams, state: &SequencerState) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let patch = PatchFile {
        params,
        data: to_document(state),
    };
    let json = serde_json::to_string_pretty(&patch)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)?;
    log::debug!(target: "persistence", "saved patch to {}", path.display());
    Ok(())
}

/// Load a patch written by [`save_patch`].
///
/// Only unreadable files and invalid JSON are errors. Missing or malformed
/// `params` fall back to the panel defaults, and `data` is applied over a
/// default state with the document's usual tolerance.
pub fn load_patch(path: &Path) -> io::Result<(PanelParams, SequencerState)> {
    let contents = std::fs::read_to_string(path)?;
    let root: Value = serde_json::from_str(&contents)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let params = match root.get("params") {
        None => PanelParams::default(),
        Some(value) => match serde_json::from_value::<PanelParams>(value.clone()) {
            Ok(params) => sanitize_params(params),
            Err(e) => {
                log::warn!(target: "persistence", "ignoring malformed params in {}: {}", path.display(), e);
                PanelParams::default()
            }
        },
    };

    let mut state = SequencerState::default();
    match root.get("data") {
        Some(doc) => apply_document(doc, &mut state),
        None => {
            log::warn!(target: "persistence", "{} has no module data, using defaults", path.display())
        }
    }

    log::debug!(target: "persistence", "loaded patch from {}", path.display());
    Ok((params, state))
}

/// Run loaded knob values back through the panel's clamping setters.
fn sanitize_params(raw: PanelParams) -> PanelParams {
    let mut params = PanelParams::default();
    params.set_clock(raw.clock);
    params.set_steps(raw.steps);
    for (step, pitch) in raw.pitches.iter().enumerate() {
        params.set_pitch(step, *pitch);
    }
    params
}
