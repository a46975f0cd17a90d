//! Per-range session state and throughput accounting
//!
//! A [`StreamSession`] lives for exactly one `stream_range` run: created when
//! the range is requested, mutated once per consumed line, finished when the
//! cursor reaches the target block. [`RangeStats`] is the shared, read-only
//! view of the same run handed to the caller.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Mutable state threaded through one logical range run.
#[derive(Debug)]
pub struct StreamSession {
    started: Instant,
    from_block: u64,
    target_to_block: u64,
    last_block: Option<u64>,
    total_bytes: u64,
    restarts: u64,
}

impl StreamSession {
    /// Start a session for the inclusive range `[from_block, target_to_block]`.
    pub fn new(from_block: u64, target_to_block: u64) -> Self {
        Self {
            started: Instant::now(),
            from_block,
            target_to_block,
            last_block: None,
            total_bytes: 0,
            restarts: 0,
        }
    }

    /// Where the next request should start: one past the cursor, or the
    /// original `from_block` when nothing has been consumed yet.
    pub fn next_from_block(&self) -> u64 {
        match self.last_block {
            Some(block) => block + 1,
            None => self.from_block,
        }
    }

    /// The fixed upper bound of the requested range.
    pub fn target_to_block(&self) -> u64 {
        self.target_to_block
    }

    /// Last successfully consumed block, if any.
    pub fn last_block(&self) -> Option<u64> {
        self.last_block
    }

    /// Bytes consumed so far, summed over raw line lengths.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Short-read restarts so far.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Account for one raw line before it is parsed.
    pub fn record_line(&mut self, len: usize) {
        self.total_bytes += len as u64;
    }

    /// Advance the resume cursor to a consumed block.
    pub fn advance(&mut self, block_number: u64) {
        self.last_block = Some(block_number);
    }

    /// Whether the full range has been delivered. True only when the cursor
    /// sits exactly on the target block; an absent cursor never completes.
    pub fn is_complete(&self) -> bool {
        self.last_block == Some(self.target_to_block)
    }

    /// Count one short-read restart.
    pub fn note_restart(&mut self) {
        self.restarts += 1;
    }

    /// Wall-clock time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Build the throughput report for a completed range.
    pub fn report(&self, reported_blocks: u64) -> ThroughputReport {
        ThroughputReport::compute(self.elapsed(), reported_blocks, self.total_bytes, self.restarts)
    }
}

/// Aggregate throughput figures for one completed range.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputReport {
    /// Wall-clock seconds from first request to range completion.
    pub elapsed_secs: f64,
    /// Reported block rate (fixed numerator / elapsed).
    pub blocks_per_sec: f64,
    /// Consumed megabytes per second.
    pub mb_per_sec: f64,
    /// Total raw line bytes consumed across all restarts.
    pub total_bytes: u64,
    /// Short-read restarts it took to finish the range.
    pub restarts: u64,
}

impl ThroughputReport {
    /// Compute the report from raw session figures.
    pub fn compute(
        elapsed: Duration,
        reported_blocks: u64,
        total_bytes: u64,
        restarts: u64,
    ) -> Self {
        // Sub-resolution clocks can report zero elapsed time in tests.
        let elapsed_secs = elapsed.as_secs_f64().max(f64::MIN_POSITIVE);
        Self {
            elapsed_secs,
            blocks_per_sec: reported_blocks as f64 / elapsed_secs,
            mb_per_sec: total_bytes as f64 / 1024.0 / 1024.0 / elapsed_secs,
            total_bytes,
            restarts,
        }
    }
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished stream. Elapsed: {:.1}s. Speed: {:.1} blocks/sec. Throughput: {:.1} MB/s",
            self.elapsed_secs, self.blocks_per_sec, self.mb_per_sec
        )
    }
}

/// Shared, lock-free view of a running range, handed to the caller alongside
/// the record stream.
#[derive(Debug, Default)]
pub struct RangeStats {
    total_bytes: AtomicU64,
    blocks_delivered: AtomicU64,
    restarts: AtomicU64,
    completed: AtomicBool,
}

impl RangeStats {
    pub(crate) fn observe_line(&self, len: usize) {
        self.total_bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub(crate) fn observe_block(&self) {
        self.blocks_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn observe_restart(&self) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn mark_complete(&self) {
        self.completed.store(true, Ordering::Relaxed);
    }

    /// Total raw line bytes consumed so far.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    /// Records yielded so far.
    pub fn blocks_delivered(&self) -> u64 {
        self.blocks_delivered.load(Ordering::Relaxed)
    }

    /// Short-read restarts so far.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// Whether the range ran to completion.
    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Relaxed)
    }
}
