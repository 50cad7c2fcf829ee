//! Self-expiring timed pulse.

/// One-shot pulse measured in elapsed processing time.
///
/// `trigger` always restarts the timer with the new duration; pulses are
/// never queued or extended.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseGenerator {
    remaining: f32,
}

impl PulseGenerator {
    pub fn new() -> Self {
        Self { remaining: 0.0 }
    }

    pub fn trigger(&mut self, duration_secs: f32) {
        self.remaining = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
    }

    /// Advance by `delta_secs` and report whether the pulse is still active.
    #[inline]
    pub fn process(&mut self, delta_secs: f32) -> bool {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - delta_secs).max(0.0);
        }
        self.remaining > 0.0
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_duration() {
        let d = 0.01;
        let mut pulse = PulseGenerator::new();
        pulse.trigger(d);
        assert!(pulse.process(d / 2.0));
        assert!(!pulse.process(d / 2.0 + 1e-6));
        assert_eq!(pulse.remaining(), 0.0);
    }

    #[test]
    fn retrigger_restarts_instead_of_extending() {
        let mut pulse = PulseGenerator::new();
        pulse.trigger(1.0);
        pulse.process(0.25);
        pulse.trigger(0.5);
        assert_eq!(pulse.remaining(), 0.5);
        assert!(pulse.process(0.4));
        assert!(!pulse.process(0.2));
    }

    #[test]
    fn idle_pulse_stays_inactive() {
        let mut pulse = PulseGenerator::new();
        assert!(!pulse.is_active());
        assert!(!pulse.process(0.001));
        assert_eq!(pulse.remaining(), 0.0);
    }

    #[test]
    fn bad_durations_do_not_arm() {
        let mut pulse = PulseGenerator::new();
        pulse.trigger(f32::NAN);
        assert!(!pulse.is_active());
        pulse.trigger(-1.0);
        assert!(!pulse.is_active());
    }
}
