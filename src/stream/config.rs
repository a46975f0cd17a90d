//! Stream configuration constants

/// Number of blocks requested in one logical load-test iteration.
/// Large enough that a single range exercises many server-side stream
/// restarts, small enough that one iteration finishes within a test slot.
pub const RANGE_SIZE: u64 = 500_000;

/// Numerator of the reported blocks/sec figure.
/// Note: this does NOT equal [`RANGE_SIZE`]. The value is kept at the
/// historical constant so reported rates stay comparable across runs; see
/// DESIGN.md before changing either constant.
pub const REPORTED_BLOCKS: u64 = 100_000;

/// Tunable parameters for one [`BlockStreamer`](crate::stream::BlockStreamer).
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Blocks per requested range: `to_block = from_block + range_size`.
    pub range_size: u64,
    /// Numerator used for the blocks/sec throughput figure.
    pub reported_blocks: u64,
    /// Upper bound on short-read restarts within one range. `None` restarts
    /// forever, which is the long-soak default; a stalled server that never
    /// returns data then loops indefinitely.
    pub max_restarts: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            range_size: RANGE_SIZE,
            reported_blocks: REPORTED_BLOCKS,
            max_restarts: None,
        }
    }
}
