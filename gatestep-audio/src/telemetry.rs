//! Block render timing.
//!
//! One `RenderTelemetry` covers a whole render. Block durations go into a
//! fixed histogram, so `record` never allocates and memory does not grow
//! with render length. The p95 is read off the histogram and is exact to
//! one bucket.

use std::time::Duration;

/// Width of one histogram bucket.
const BUCKET_US: u32 = 10;
/// Buckets cover 0..2560 us; slower blocks land in the last one.
const BUCKETS: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySummary {
    pub avg_us: u32,
    pub max_us: u32,
    pub p95_us: u32,
    /// Blocks that took longer than their budget.
    pub overruns: u64,
    pub blocks: u64,
}

pub struct RenderTelemetry {
    histogram: [u64; BUCKETS],
    total_us: u64,
    max_us: u32,
    overruns: u64,
    blocks: u64,
}

impl Default for RenderTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Real-time budget of a block in microseconds.
pub fn block_budget_us(block_len: usize, sample_rate: f32) -> u32 {
    if sample_rate <= 0.0 {
        return u32::MAX;
    }
    let us = block_len as f64 * 1_000_000.0 / sample_rate as f64;
    us.min(u32::MAX as f64) as u32
}

impl RenderTelemetry {
    pub fn new() -> Self {
        Self {
            histogram: [0; BUCKETS],
            total_us: 0,
            max_us: 0,
            overruns: 0,
            blocks: 0,
        }
    }

    #[inline]
    pub fn record(&mut self, duration: Duration, budget_us: u32) {
        let us = duration.as_micros().min(u32::MAX as u128) as u32;
        let bucket = ((us / BUCKET_US) as usize).min(BUCKETS - 1);
        self.histogram[bucket] += 1;
        self.total_us += us as u64;
        self.max_us = self.max_us.max(us);
        self.blocks += 1;
        if us > budget_us {
            self.overruns += 1;
        }
    }

    /// Totals for everything recorded so far.
    pub fn summary(&self) -> TelemetrySummary {
        if self.blocks == 0 {
            return TelemetrySummary::default();
        }
        TelemetrySummary {
            avg_us: (self.total_us / self.blocks) as u32,
            max_us: self.max_us,
            p95_us: self.percentile_us(95),
            overruns: self.overruns,
            blocks: self.blocks,
        }
    }

    /// Upper edge of the bucket holding the `pct` percentile, capped at the
    /// slowest block seen.
    fn percentile_us(&self, pct: u64) -> u32 {
        let rank = (self.blocks * pct).div_ceil(100).max(1);
        let mut seen = 0;
        for (bucket, &count) in self.histogram.iter().enumerate() {
            seen += count;
            if seen >= rank {
                if bucket == BUCKETS - 1 {
                    return self.max_us;
                }
                let upper = (bucket as u32 + 1) * BUCKET_US - 1;
                return upper.min(self.max_us);
            }
        }
        self.max_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_three_blocks() {
        let mut t = RenderTelemetry::new();
        t.record(Duration::from_micros(100), 1000);
        t.record(Duration::from_micros(200), 1000);
        t.record(Duration::from_micros(300), 1000);
        let s = t.summary();
        assert_eq!(s.avg_us, 200);
        assert_eq!(s.max_us, 300);
        assert_eq!(s.p95_us, 300);
        assert_eq!(s.overruns, 0);
        assert_eq!(s.blocks, 3);
        // reading the summary does not reset anything
        assert_eq!(t.summary(), s);
    }

    #[test]
    fn overruns_counted_against_budget() {
        let mut t = RenderTelemetry::new();
        let budget = block_budget_us(64, 48_000.0);
        assert_eq!(budget, 1333);
        t.record(Duration::from_micros(2000), budget);
        t.record(Duration::from_micros(10), budget);
        assert_eq!(t.summary().overruns, 1);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(RenderTelemetry::new().summary(), TelemetrySummary::default());
    }

    #[test]
    fn p95_ignores_rare_slow_blocks() {
        let mut t = RenderTelemetry::new();
        for _ in 0..99 {
            t.record(Duration::from_micros(42), 1000);
        }
        t.record(Duration::from_micros(5000), 1000);
        let s = t.summary();
        assert_eq!(s.p95_us, 49);
        assert_eq!(s.max_us, 5000);
        assert_eq!(s.blocks, 100);
    }

    #[test]
    fn slow_blocks_past_the_histogram_report_max() {
        let mut t = RenderTelemetry::new();
        for us in [3000, 4000, 9000] {
            t.record(Duration::from_micros(us), 1000);
        }
        assert_eq!(t.summary().p95_us, 9000);
    }
}
