//! Step sequencer engine.
//!
//! Advances a step index from the internal or external clock, applies the
//! gate-mode policy to the gate table and produces one frame of pitch and
//! gate output per call. `process` runs on the real-time path: it takes the
//! sample rate as an argument, never allocates and never blocks.

use gatestep_types::reduce::reduce_action;
use gatestep_types::{
    EditMode, GateMode, PanelParams, SequencerAction, SequencerState, GATE_HIGH, GATE_PULSE_SECS,
    MAX_STEPS,
};

use super::bus::{SeqInputs, SeqOutputs};
use super::commands::{SeqCmd, SeqFeedback};
use super::edge::EdgeDetector;
use super::handle::EngineLink;
use super::lights::StepLights;
use super::phase::{tempo_hz, PhaseAccumulator};
use super::pulse::PulseGenerator;

/// Position of the step index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playhead {
    /// Before the first step: the next advance lands on step 0.
    Primed,
    Step(usize),
}

/// Active step count from the steps knob and CV, rounded and clamped to
/// `[1, MAX_STEPS]`.
pub fn active_steps(steps_knob: f32, steps_cv: f32) -> usize {
    let sum = (steps_knob + steps_cv).round();
    if sum.is_nan() {
        return 1;
    }
    sum.clamp(1.0, MAX_STEPS as f32) as usize
}

/// Shape the raw gate intent with the gate-mode policy.
#[inline]
pub fn shape_gate(mode: GateMode, gate_on: bool, pulse_active: bool) -> bool {
    match mode {
        GateMode::Trigger => gate_on && pulse_active,
        GateMode::Retrigger => gate_on && !pulse_active,
        GateMode::Gate => gate_on,
    }
}

pub struct StepSequencer {
    state: SequencerState,
    edit_mode: EditMode,
    clock: PhaseAccumulator,
    playhead: Playhead,
    pulse: PulseGenerator,
    lights: StepLights,
    run_edge: EdgeDetector,
    reset_button_edge: EdgeDetector,
    reset_input_edge: EdgeDetector,
    ext_clock_edge: EdgeDetector,
    pitch_edit_edge: EdgeDetector,
    gate_edit_edge: EdgeDetector,
    /// Reset requested through the command channel, taken on the next sample
    pending_reset: bool,
    link: Option<EngineLink>,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self::with_state(SequencerState::default())
    }

    pub fn with_state(state: SequencerState) -> Self {
        Self {
            state,
            edit_mode: EditMode::default(),
            clock: PhaseAccumulator::new(),
            playhead: Playhead::Primed,
            pulse: PulseGenerator::new(),
            lights: StepLights::new(),
            run_edge: EdgeDetector::new(),
            reset_button_edge: EdgeDetector::new(),
            reset_input_edge: EdgeDetector::new(),
            ext_clock_edge: EdgeDetector::new(),
            pitch_edit_edge: EdgeDetector::new(),
            gate_edit_edge: EdgeDetector::new(),
            pending_reset: false,
            link: None,
        }
    }

    /// Connect the command/feedback channels created by `SeqHandle::new`.
    pub fn attach(&mut self, link: EngineLink) {
        self.link = Some(link);
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn playhead(&self) -> Playhead {
        self.playhead
    }

    /// Current step, or None before the first advance.
    pub fn current_step(&self) -> Option<usize> {
        match self.playhead {
            Playhead::Step(i) => Some(i),
            Playhead::Primed => None,
        }
    }

    pub fn phase(&self) -> f64 {
        self.clock.phase()
    }

    pub fn lights(&self) -> &[f32; MAX_STEPS] {
        self.lights.values()
    }

    /// Apply a pattern edit directly. Only call this while audio processing
    /// for this instance is quiesced; use the handle otherwise.
    pub fn apply(&mut self, action: &SequencerAction) -> bool {
        let was_running = self.state.running;
        let changed = reduce_action(action, &mut self.state, &mut self.edit_mode);
        if self.state.running != was_running {
            self.notify(SeqFeedback::RunChanged {
                running: self.state.running,
            });
        }
        changed
    }

    /// Replace the persisted fields. Transport state is kept.
    pub fn restore(&mut self, state: SequencerState) {
        let running = state.running;
        let run_changed = running != self.state.running;
        self.state = state;
        if run_changed {
            self.notify(SeqFeedback::RunChanged { running });
        }
    }

    /// Request a transport reset on the next processed sample.
    pub fn request_reset(&mut self) {
        self.pending_reset = true;
    }

    /// Apply every queued command. Call at block boundaries only.
    pub fn poll_commands(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let cmd = match &self.link {
                Some(link) => match link.cmd_rx.try_recv() {
                    Ok(cmd) => cmd,
                    Err(_) => break,
                },
                None => break,
            };
            log::debug!(target: "engine", "applying {:?}", cmd);
            match cmd {
                SeqCmd::Action(action) => {
                    self.apply(&action);
                }
                SeqCmd::Restore(state) => self.restore(state),
                SeqCmd::Reset => self.request_reset(),
            }
            applied += 1;
        }
        applied
    }

    /// Process one sample.
    pub fn process(
        &mut self,
        params: &PanelParams,
        inputs: &SeqInputs,
        sample_rate: f32,
    ) -> SeqOutputs {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return SeqOutputs::silent();
        }
        let dt = 1.0 / sample_rate;
        let mut advance = false;

        // Run button: one edge, one toggle
        if self.run_edge.process(inputs.run_button) {
            self.state.running = !self.state.running;
            self.notify(SeqFeedback::RunChanged {
                running: self.state.running,
            });
        }

        // Clock. The external edge detector tracks its input even while
        // stopped so a clock that is already high does not fire on start.
        match inputs.ext_clock {
            Some(signal) => {
                let edge = self.ext_clock_edge.process(signal);
                if self.state.running && edge {
                    self.clock.reset();
                    advance = true;
                }
            }
            None => {
                self.ext_clock_edge.reset();
                if self.state.running {
                    let tempo = tempo_hz(params.clock, inputs.clock_cv);
                    advance = self.clock.advance(tempo, sample_rate);
                }
            }
        }

        // Reset works while stopped too; both sources must see every sample.
        let reset_button = self.reset_button_edge.process(inputs.reset_button);
        let reset_input = self.reset_input_edge.process(inputs.reset_input);
        if reset_button || reset_input || std::mem::take(&mut self.pending_reset) {
            self.clock.reset();
            self.playhead = Playhead::Primed;
            advance = true;
        }

        if self.pitch_edit_edge.process(inputs.pitch_edit_button) {
            self.edit_mode = EditMode::Pitch;
        }
        if self.gate_edit_edge.process(inputs.gate_edit_button) {
            self.edit_mode = EditMode::Gate;
        }

        // The step count can drop between clocks; never play a step past it.
        let steps = active_steps(params.steps, inputs.steps_cv);
        if let Playhead::Step(i) = self.playhead {
            if i >= steps {
                self.playhead = Playhead::Step(i % steps);
            }
        }
        if advance {
            let index = match self.playhead {
                Playhead::Primed => 0,
                Playhead::Step(i) => (i + 1) % steps,
            };
            self.playhead = Playhead::Step(index);
            self.lights.flash(index);
            self.pulse.trigger(GATE_PULSE_SECS);
            self.notify(SeqFeedback::Step { index });
        }

        // The triggering sample counts toward the pulse width.
        let pulse_active = self.pulse.is_active();
        self.pulse.process(dt);
        let index = self.current_step();
        let gate_on = self.state.running && index.is_some_and(|i| self.state.gate(i));
        let gate = shape_gate(self.state.gate_mode, gate_on, pulse_active);
        let pitch = params
            .pitches
            .get(index.unwrap_or(0))
            .copied()
            .unwrap_or(0.0);

        self.lights.decay(sample_rate);

        SeqOutputs {
            pitch,
            gate: if gate { GATE_HIGH } else { 0.0 },
            gate_light: if gate { 1.0 } else { 0.0 },
            step_lights: *self.lights.values(),
        }
    }

    /// Process a block with inputs held constant across it.
    pub fn process_block(
        &mut self,
        params: &PanelParams,
        inputs: &SeqInputs,
        sample_rate: f32,
        out: &mut [SeqOutputs],
    ) {
        for frame in out.iter_mut() {
            *frame = self.process(params, inputs, sample_rate);
        }
    }

    #[inline]
    fn notify(&self, feedback: SeqFeedback) {
        if let Some(link) = &self.link {
            link.notify(feedback);
        }
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}
