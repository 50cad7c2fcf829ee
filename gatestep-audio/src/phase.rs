//! Internal clock: normalized phase driven by an exponential tempo control.

/// Clock exponent range applied before `2^x`. Keeps a runaway CV from
/// producing a tempo that overflows or stalls the clock.
pub const CLOCK_EXP_MIN: f32 = -10.0;
pub const CLOCK_EXP_MAX: f32 = 10.0;

/// Tempo in steps per second for a clock knob + CV pair (1 V/oct, 1 Hz at 0).
pub fn tempo_hz(clock_knob: f32, clock_cv: f32) -> f64 {
    let exp = clock_knob + clock_cv;
    let exp = if exp.is_finite() {
        exp.clamp(CLOCK_EXP_MIN, CLOCK_EXP_MAX)
    } else {
        0.0
    };
    2.0_f64.powf(exp as f64)
}

/// Phase in [0, 1) within the current step.
///
/// Wrapping subtracts 1.0 rather than zeroing so the fractional overshoot
/// carries into the next step and step timing stays sample-accurate on
/// average.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseAccumulator {
    phase: f64,
}

impl PhaseAccumulator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Advance one sample. Returns true on the sample the phase wraps.
    #[inline]
    pub fn advance(&mut self, tempo_hz: f64, sample_rate: f32) -> bool {
        if sample_rate <= 0.0 || !tempo_hz.is_finite() {
            return false;
        }
        self.phase += tempo_hz / sample_rate as f64;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            true
        } else {
            false
        }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
