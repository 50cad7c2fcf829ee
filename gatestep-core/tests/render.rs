use gatestep_audio::SeqInputs;
use gatestep_core::{load_patch, render, save_patch, write_wav, RenderSettings};
use gatestep_types::{GateMode, PanelParams, SequencerState};

fn running_state(gates: &[usize], mode: GateMode) -> SequencerState {
    let mut state = SequencerState::new();
    state.running = true;
    state.gate_mode = mode;
    for &g in gates {
        state.gates[g] = true;
    }
    state
}

#[test]
fn internal_clock_render_follows_gate_table() {
    let mut params = PanelParams::new();
    params.set_clock(2.0);
    params.set_pitch(0, 5.0);
    let state = running_state(&[0, 2], GateMode::Gate);
    let settings = RenderSettings {
        sample_rate: 8000,
        block_size: 128,
        seconds: 1.1,
        ext_clock_hz: None,
    };

    let rendered = render(&params, &state, &SeqInputs::default(), &settings);
    assert_eq!(rendered.frames.len(), 8800);
    assert_eq!(rendered.steps, vec![0, 1, 2, 3]);

    // two enabled steps of 2000 samples each
    let high = rendered.gate_high_frames();
    assert!((3990..=4010).contains(&high), "gate high for {} frames", high);

    // step 0 sits between the first and second advance
    let frame = rendered.frames[3000];
    assert!((frame[0] - 0.5).abs() < 1e-6);
    assert_eq!(frame[1], 1.0);
    assert_eq!(rendered.frames[5000][1], 0.0);
    assert!(rendered.telemetry.blocks > 0);
}

#[test]
fn external_clock_render_steps_on_every_edge() {
    let state = running_state(&[], GateMode::Trigger);
    let settings = RenderSettings {
        sample_rate: 1000,
        block_size: 64,
        seconds: 1.0,
        ext_clock_hz: Some(10.0),
    };

    let rendered = render(&PanelParams::new(), &state, &SeqInputs::default(), &settings);
    assert_eq!(rendered.steps, (0..10).collect::<Vec<_>>());
}

#[test]
fn dense_external_clock_keeps_every_step_in_large_blocks() {
    let state = running_state(&[], GateMode::Trigger);
    // a rising edge on every other sample: 2000 steps inside one 4096-frame block
    let settings = RenderSettings {
        sample_rate: 1000,
        block_size: 4096,
        seconds: 4.0,
        ext_clock_hz: Some(500.0),
    };

    let rendered = render(&PanelParams::new(), &state, &SeqInputs::default(), &settings);
    assert_eq!(rendered.telemetry.blocks, 1);
    assert_eq!(rendered.steps.len(), 2000);
    assert!(rendered.steps.iter().enumerate().all(|(i, &s)| s == i % 16));
}

#[test]
fn patch_render_and_wav_export() {
    let dir = tempfile::tempdir().unwrap();
    let patch = dir.path().join("patch.json");
    let wav = dir.path().join("out").join("render.wav");

    let mut params = PanelParams::new();
    params.set_clock(3.0);
    save_patch(&patch, &params, &running_state(&[1, 3], GateMode::Retrigger)).unwrap();

    let (params, state) = load_patch(&patch).unwrap();
    assert_eq!(state.gate_mode, GateMode::Retrigger);
    let settings = RenderSettings {
        sample_rate: 44_100,
        block_size: 64,
        seconds: 0.45,
        ext_clock_hz: None,
    };
    let rendered = render(&params, &state, &SeqInputs::default(), &settings);
    // 8 steps per second
    assert_eq!(rendered.steps, vec![0, 1, 2]);

    write_wav(&wav, &rendered, settings.sample_rate).unwrap();
    let reader = hound::WavReader::open(&wav).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(reader.len() as usize, rendered.frames.len() * 2);
}
