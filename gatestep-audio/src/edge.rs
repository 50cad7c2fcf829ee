//! Rising-edge detection with hysteresis.

/// Signal must fall to this level before another edge can fire.
pub const EDGE_LOW: f32 = 0.1;
/// Signal must reach this level to fire an edge.
pub const EDGE_HIGH: f32 = 1.0;

/// Turns a control-voltage signal into a one-sample rising-edge pulse.
///
/// Holds a single bit: whether the signal is currently considered high.
/// Fires once when the signal reaches `EDGE_HIGH` from the low state and
/// re-arms only after it drops to `EDGE_LOW` or below. Values between the
/// thresholds keep the current state, so noise around a single threshold
/// cannot produce a burst of edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    high: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self { high: false }
    }

    #[inline]
    pub fn process(&mut self, signal: f32) -> bool {
        if self.high {
            if signal <= EDGE_LOW {
                self.high = false;
            }
            false
        } else if signal >= EDGE_HIGH {
            self.high = true;
            true
        } else {
            false
        }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    pub fn reset(&mut self) {
        self.high = false;
    }
}
