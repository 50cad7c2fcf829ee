//! Per-step indicator brightness with exponential decay.

use gatestep_types::MAX_STEPS;

/// Decay time constant of a step light, in seconds.
pub const LIGHT_LAMBDA: f32 = 0.075;

#[derive(Debug, Clone, Copy)]
pub struct StepLights {
    values: [f32; MAX_STEPS],
}

impl StepLights {
    pub fn new() -> Self {
        Self {
            values: [0.0; MAX_STEPS],
        }
    }

    /// Set a step's light to full brightness.
    pub fn flash(&mut self, step: usize) {
        if let Some(v) = self.values.get_mut(step) {
            *v = 1.0;
        }
    }

    /// Decay every light by one sample.
    #[inline]
    pub fn decay(&mut self, sample_rate: f32) {
        if sample_rate <= 0.0 {
            return;
        }
        let k = (1.0 / (LIGHT_LAMBDA * sample_rate)).min(1.0);
        for v in self.values.iter_mut() {
            *v -= *v * k;
        }
    }

    pub fn values(&self) -> &[f32; MAX_STEPS] {
        &self.values
    }
}

impl Default for StepLights {
    fn default() -> Self {
        Self::new()
    }
}
