//! Offline rendering of a patch to a stereo float WAV.
//!
//! Channel 0 carries the pitch CV and channel 1 the gate, both scaled by
//! `1 / GATE_HIGH` so a high gate lands at 1.0.

use std::path::Path;
use std::time::{Duration, Instant};

use gatestep_audio::handle::FEEDBACK_CAPACITY;
use gatestep_audio::telemetry::block_budget_us;
use gatestep_audio::{
    RenderTelemetry, SeqCmd, SeqFeedback, SeqHandle, SeqInputs, SeqOutputs, StepSequencer,
    TelemetrySummary,
};
use gatestep_types::{PanelParams, SequencerState, GATE_HIGH};

use crate::config::Config;

const FEEDBACK_CHUNK: usize = FEEDBACK_CAPACITY / 2;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub sample_rate: u32,
    pub block_size: usize,
    pub seconds: f32,
    /// Square wave fed to the external clock input. `None` leaves it unpatched.
    pub ext_clock_hz: Option<f32>,
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sample_rate: config.sample_rate(),
            block_size: config.block_size(),
            seconds: config.render_seconds(),
            ext_clock_hz: None,
        }
    }

    pub fn total_frames(&self) -> usize {
        if !self.seconds.is_finite() || self.seconds <= 0.0 {
            return 0;
        }
        (self.seconds as f64 * self.sample_rate as f64).round() as usize
    }
}

pub struct Rendered {
    /// Interleaved `[pitch, gate]` frames.
    pub frames: Vec<[f32; 2]>,
    /// Step index of every step advance, in order.
    pub steps: Vec<usize>,
    pub telemetry: TelemetrySummary,
}

impl Rendered {
    pub fn gate_high_frames(&self) -> usize {
        self.frames.iter().filter(|f| f[1] >= 1.0).count()
    }
}

/// Run the engine over `settings.seconds` of audio.
///
/// `state` is handed to the engine through its command channel, exactly as a
/// host restores a saved patch.
pub fn render(
    params: &PanelParams,
    state: &SequencerState,
    inputs: &SeqInputs,
    settings: &RenderSettings,
) -> Rendered {
    let total = settings.total_frames();
    let block_size = settings.block_size.max(1);
    let sample_rate = settings.sample_rate as f32;
    let budget_us = block_budget_us(block_size, sample_rate);

    let (handle, link) = SeqHandle::new();
    let mut seq = StepSequencer::new();
    seq.attach(link);
    handle.send(SeqCmd::Restore(state.clone()));

    let clock = settings
        .ext_clock_hz
        .filter(|hz| hz.is_finite() && *hz > 0.0)
        .map(|hz| SquareClock::new(hz as f64, settings.sample_rate as f64));

    let mut telemetry = RenderTelemetry::new();
    let mut frames = Vec::with_capacity(total);
    let mut steps = Vec::new();
    let mut block = vec![SeqOutputs::silent(); block_size];
    let mut written = 0;

    while written < total {
        let len = block_size.min(total - written);
        seq.poll_commands();
        collect_steps(&handle, &mut steps);

        // A sample sends at most a step and a run change, so draining every
        // FEEDBACK_CHUNK samples keeps the bounded feedback channel from filling.
        let mut elapsed = Duration::ZERO;
        let mut start = 0;
        while start < len {
            let end = (start + FEEDBACK_CHUNK).min(len);
            let started = Instant::now();
            match &clock {
                Some(clock) => {
                    for (i, out) in block[start..end].iter_mut().enumerate() {
                        let frame_inputs = SeqInputs {
                            ext_clock: Some(clock.level(written + start + i)),
                            ..*inputs
                        };
                        *out = seq.process(params, &frame_inputs, sample_rate);
                    }
                }
                None => seq.process_block(params, inputs, sample_rate, &mut block[start..end]),
            }
            elapsed += started.elapsed();
            collect_steps(&handle, &mut steps);
            start = end;
        }
        telemetry.record(elapsed, budget_us);

        frames.extend(
            block[..len]
                .iter()
                .map(|o| [o.pitch / GATE_HIGH, o.gate / GATE_HIGH]),
        );
        written += len;
    }

    let summary = telemetry.summary();
    log::info!(
        target: "render",
        "rendered {} frames in {} blocks: {} steps, avg {}us, p95 {}us, max {}us, {} overruns",
        frames.len(),
        summary.blocks,
        steps.len(),
        summary.avg_us,
        summary.p95_us,
        summary.max_us,
        summary.overruns
    );

    Rendered {
        frames,
        steps,
        telemetry: summary,
    }
}

fn collect_steps(handle: &SeqHandle, steps: &mut Vec<usize>) {
    for feedback in handle.poll_feedback() {
        if let SeqFeedback::Step { index } = feedback {
            steps.push(index);
        }
    }
}

/// 50% duty square wave between 0 V and the gate level.
struct SquareClock {
    hz: f64,
    sample_rate: f64,
}

impl SquareClock {
    fn new(hz: f64, sample_rate: f64) -> Self {
        Self { hz, sample_rate }
    }

    fn level(&self, frame: usize) -> f32 {
        let phase = (frame as f64 * self.hz / self.sample_rate).fract();
        if phase < 0.5 {
            GATE_HIGH
        } else {
            0.0
        }
    }
}

pub fn write_wav(path: &Path, rendered: &Rendered, sample_rate: u32) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
    }

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| format!("Failed to create WAV writer: {}", e))?;

    for frame in &rendered.frames {
        for &sample in frame {
            writer
                .write_sample(sample)
                .map_err(|e| format!("Failed to write sample: {}", e))?;
        }
    }

    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(seconds: f32) -> RenderSettings {
        RenderSettings {
            sample_rate: 1000,
            block_size: 64,
            seconds,
            ext_clock_hz: None,
        }
    }

    #[test]
    fn total_frames_rounds_and_rejects_bad_lengths() {
        assert_eq!(settings(1.0).total_frames(), 1000);
        assert_eq!(settings(0.0015).total_frames(), 2);
        assert_eq!(settings(-1.0).total_frames(), 0);
        assert_eq!(settings(f32::NAN).total_frames(), 0);
    }

    #[test]
    fn square_clock_has_half_duty() {
        let clock = SquareClock::new(10.0, 1000.0);
        let high = (0..100).filter(|&n| clock.level(n) > 0.0).count();
        assert_eq!(high, 50);
        assert_eq!(clock.level(0), GATE_HIGH);
        assert_eq!(clock.level(50), 0.0);
    }

    #[test]
    fn stopped_patch_renders_silence() {
        let rendered = render(
            &PanelParams::new(),
            &SequencerState::new(),
            &SeqInputs::default(),
            &settings(0.5),
        );
        assert_eq!(rendered.frames.len(), 500);
        assert!(rendered.steps.is_empty());
        assert_eq!(rendered.gate_high_frames(), 0);
        assert_eq!(rendered.telemetry.blocks, 8);
    }
}
