//! Resumable range streaming
//!
//! Drives the portal client repeatedly with adjusted range parameters until a
//! requested block range is fully delivered, yielding parsed block records
//! and aggregate throughput statistics to the caller.
//!
//! # Overview
//!
//! 1. **Configuration**: range size and reporting constants in [`config`]
//! 2. **Session State**: resume cursor and byte accounting in [`session`]
//! 3. **Streaming**: the restart loop itself in [`streamer`]
//! 4. **Progress**: periodic progress emission for long ranges in [`progress`]
//!
//! A short read (the server closing the connection before the target block)
//! is not an error: the streamer reissues the request from `last_block + 1`
//! and the caller never notices beyond a warn-level log line.

use std::pin::Pin;

use futures_util::Stream;

pub mod config;
pub mod progress;
pub mod session;
pub mod streamer;

pub use config::StreamConfig;
pub use session::{RangeStats, StreamSession, ThroughputReport};
pub use streamer::{BlockStreamer, RangeRun};

use crate::client::ClientError;
use crate::BlockRecord;

/// Streaming errors
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Transport-level failure surfaced by the portal client
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// The starting block token did not parse into a valid range
    #[error("invalid starting block token {token:?}: {message}")]
    InvalidStartBlock {
        /// The offending token
        token: String,
        /// Why it was rejected
        message: String,
    },

    /// A line could not be parsed as a block record. Fatal: the byte stream
    /// may be desynchronized from record boundaries, so no recovery is
    /// attempted.
    #[error("malformed block record after cursor {cursor:?}: {message}")]
    Parse {
        /// Last successfully consumed block, if any
        cursor: Option<u64>,
        /// Parser diagnostic
        message: String,
    },

    /// The configured restart bound was exceeded before range completion
    #[error("stream restarted {0} times without completing the range")]
    RestartLimitExceeded(u64),
}

/// Result type for streaming operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Boxed stream of parsed block records
pub type BlockStream = Pin<Box<dyn Stream<Item = StreamResult<BlockRecord>> + Send>>;
