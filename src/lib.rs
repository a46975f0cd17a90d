//! # Portal Load Test Worker
//!
//! A load-generation library for the Portal blockchain-data streaming API.
//! Workers issue streaming POST requests that return newline-delimited JSON
//! block records, paginate through fixed-size block ranges, and report
//! throughput once a range has been fully delivered.
//!
//! ## Features
//!
//! - **Resumable Streaming**: tracks the last consumed block and transparently
//!   restarts the stream from the cursor when the server closes early
//! - **Transparent Retry**: 429/503 responses are retried with a pluggable
//!   backoff policy without disturbing the resume cursor
//! - **Canned Scenarios**: the four production query payloads (fetch-all,
//!   multiple instructions, single instruction, empty) ship with the crate
//! - **Throughput Reporting**: elapsed time, blocks/sec and MB/s per completed
//!   range, surfaced through logs and Prometheus metrics
//!
//! ## Quick Start
//!
//! ```no_run
//! use portal_loadtest::scenario::{LoadScenario, ScenarioKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let worker = LoadScenario::new("http://portal.internal:8080/datasets/solana-beta");
//! worker.setup(None).await;
//!
//! let summary = worker.fire(ScenarioKind::FetchAll, "250000000").await?;
//! println!("streamed {} blocks in {} bytes", summary.blocks, summary.bytes);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`client`] - Portal transport: connection open, status classification,
//!   transient retry, newline framing
//! - [`stream`] - Resumable range streamer: cursor, restart policy, session
//!   state and throughput statistics
//! - [`query`] - Query template model and the canned scenario payloads
//! - [`scenario`] - Worker lifecycle: setup, fire-one-range, teardown
//! - [`metrics`] - Prometheus metric registration and recording helpers
//! - [`cli`] - CLI command implementations

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// CLI command implementations
pub mod cli;

/// Portal transport client
pub mod client;

/// Prometheus metrics registration and helpers
pub mod metrics;

/// Query template model and canned scenario payloads
pub mod query;

/// Worker lifecycle: scenarios, setup and teardown hooks
pub mod scenario;

/// Resumable range streaming
pub mod stream;

// Re-export the types most callers touch.
pub use client::PortalClient;
pub use query::Query;
pub use scenario::{LoadScenario, ScenarioKind};
pub use stream::{BlockStreamer, StreamConfig};

/// Header of one streamed block record.
///
/// Only `number` is required by the streaming loop; the remaining fields
/// mirror the header selection requested by the canned queries and are kept
/// when present so consumers can inspect them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Block height. Drives the resume cursor and range-completion check.
    pub number: u64,
    /// Chain height, if the server included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    /// Parent block height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_number: Option<u64>,
    /// Parent block hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_hash: Option<String>,
    /// Block timestamp (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// One parsed unit of the response stream.
///
/// A record is owned by the consumer once yielded; the streaming loop keeps
/// no reference to it beyond updating its cursor from the header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockRecord {
    /// Block header carrying the height.
    pub header: BlockHeader,
    /// Everything else the query selected (transactions, instructions,
    /// balances, ...), kept as raw JSON.
    #[serde(flatten)]
    pub body: serde_json::Map<String, serde_json::Value>,
}

impl BlockRecord {
    /// Block height of this record.
    pub fn number(&self) -> u64 {
        self.header.number
    }
}
