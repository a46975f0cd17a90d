//! Progress emission for long-running ranges
//!
//! A 500k-block range can stream for minutes; workers emit a progress line
//! whenever another slice of the range has been covered so operators can
//! tell a healthy slow stream from a stalled one.

use std::time::Instant;

const DEFAULT_PERCENTAGE_STEP: f64 = 10.0;

/// Percentage-step progress tracker over one block range.
#[derive(Debug, Clone)]
pub struct RangeProgress {
    from_block: u64,
    to_block: u64,
    started: Instant,
    blocks_seen: u64,
    last_reported_pct: f64,
    percentage_step: f64,
}

impl RangeProgress {
    /// Track the inclusive range `[from_block, to_block]`.
    pub fn new(from_block: u64, to_block: u64) -> Self {
        Self {
            from_block,
            to_block,
            started: Instant::now(),
            blocks_seen: 0,
            last_reported_pct: 0.0,
            percentage_step: DEFAULT_PERCENTAGE_STEP,
        }
    }

    /// Override the emission step (percent of the range per update).
    pub fn with_percentage_step(mut self, step: f64) -> Self {
        self.percentage_step = step;
        self
    }

    /// Record a consumed block; returns a progress line when another
    /// percentage step of the range has been covered.
    pub fn update(&mut self, block_number: u64) -> Option<String> {
        self.blocks_seen += 1;
        let pct = self.percentage(block_number);
        if pct - self.last_reported_pct < self.percentage_step {
            return None;
        }
        self.last_reported_pct = pct;

        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            self.blocks_seen as f64 / elapsed
        } else {
            0.0
        };
        Some(format!(
            "at block {} - {:.1}% of range, {:.0} blocks/sec observed",
            block_number, pct, rate
        ))
    }

    fn percentage(&self, block_number: u64) -> f64 {
        let span = (self.to_block - self.from_block) as f64;
        if span <= 0.0 {
            return 100.0;
        }
        let position = block_number.clamp(self.from_block, self.to_block) - self.from_block;
        (position as f64 / span) * 100.0
    }
}
