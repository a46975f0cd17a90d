//! Worker lifecycle: scenarios, setup and teardown hooks
//!
//! The surrounding load harness runs many worker processes; each worker gets
//! `setup` once before load starts, then fires scenario iterations, then
//! `teardown`. The harness contract requires teardown to terminate the
//! worker process directly instead of returning.

use std::str::FromStr;

use futures_util::StreamExt;
use tracing::{debug, info};

use crate::client::transport::{ReqwestTransport, StreamTransport};
use crate::client::PortalClient;
use crate::metrics::ScenarioTimer;
use crate::query;
use crate::query::Query;
use crate::stream::{BlockStreamer, StreamResult};

/// The built-in load scenarios, one per canned query payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    /// Stream everything the dataset has.
    FetchAll,
    /// Instruction filters over eight heavily-traded programs.
    MultipleInstructions,
    /// One busy program with the full discriminator list.
    SingleInstruction,
    /// A filter that matches nothing; headers-only traffic.
    EmptyQuery,
}

impl ScenarioKind {
    /// Every built-in scenario, in listing order.
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::FetchAll,
        ScenarioKind::MultipleInstructions,
        ScenarioKind::SingleInstruction,
        ScenarioKind::EmptyQuery,
    ];

    /// Stable name used for metric labels and CLI arguments.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::FetchAll => "fetch_all",
            ScenarioKind::MultipleInstructions => "multiple_instructions",
            ScenarioKind::SingleInstruction => "single_instruction",
            ScenarioKind::EmptyQuery => "empty_query",
        }
    }

    /// One-line description for the scenario listing.
    pub fn describe(&self) -> &'static str {
        match self {
            ScenarioKind::FetchAll => "all categories, match-all filters; the heaviest stream",
            ScenarioKind::MultipleInstructions => {
                "eight program filters with mixed d1/d8 discriminators"
            }
            ScenarioKind::SingleInstruction => "one busy program, full discriminator list",
            ScenarioKind::EmptyQuery => "non-matching filter; exercises empty responses",
        }
    }

    /// The query payload this scenario sends.
    pub fn query(&self) -> Query {
        match self {
            ScenarioKind::FetchAll => query::fetch_all(),
            ScenarioKind::MultipleInstructions => query::multiple_instructions(),
            ScenarioKind::SingleInstruction => query::single_instruction(),
            ScenarioKind::EmptyQuery => query::empty(),
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fetch_all" => Ok(ScenarioKind::FetchAll),
            "multiple_instructions" => Ok(ScenarioKind::MultipleInstructions),
            "single_instruction" => Ok(ScenarioKind::SingleInstruction),
            "empty_query" | "empty" => Ok(ScenarioKind::EmptyQuery),
            _ => Err(format!(
                "Invalid scenario: {s}. Valid options: fetch_all, multiple_instructions, single_instruction, empty_query"
            )),
        }
    }
}

/// What one scenario iteration produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSummary {
    /// Block records delivered.
    pub blocks: u64,
    /// Raw line bytes consumed.
    pub bytes: u64,
    /// Short-read restarts it took to complete the range.
    pub restarts: u64,
}

/// One worker's scenario object: owns the streamer and exposes the harness
/// lifecycle hooks around it.
pub struct LoadScenario<T: StreamTransport = ReqwestTransport> {
    streamer: BlockStreamer<T>,
}

impl LoadScenario<ReqwestTransport> {
    /// Create a worker scenario against the dataset at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(PortalClient::new(base_url))
    }
}

impl<T: StreamTransport + 'static> LoadScenario<T> {
    /// Create a worker scenario over an existing client.
    pub fn with_client(client: PortalClient<T>) -> Self {
        Self {
            streamer: BlockStreamer::new(client),
        }
    }

    /// Create a worker scenario over a fully configured streamer.
    pub fn with_streamer(streamer: BlockStreamer<T>) -> Self {
        Self { streamer }
    }

    /// Runs once per worker before the load starts. Extension point; the
    /// default does nothing with the harness-supplied parameter.
    pub async fn setup(&self, param: Option<&str>) {
        debug!(param = ?param, "Worker setup");
    }

    /// Fire one scenario iteration: stream the full range starting at
    /// `start_block` and drain it, timing the whole run under the scenario's
    /// name.
    pub async fn fire(&self, kind: ScenarioKind, start_block: &str) -> StreamResult<RangeSummary> {
        let _timer = ScenarioTimer::start(kind.name());

        let run = self.streamer.stream_range(&kind.query(), start_block)?;
        let stats = run.stats();
        let mut records = run.into_stream();
        while let Some(record) = records.next().await {
            record?;
        }

        Ok(RangeSummary {
            blocks: stats.blocks_delivered(),
            bytes: stats.total_bytes(),
            restarts: stats.restarts(),
        })
    }

    /// Runs once per worker after the end of the test.
    ///
    /// Post-condition required by the harness: the worker process terminates
    /// here and this function never returns.
    pub fn teardown(&self) -> ! {
        info!("Worker teardown, terminating process");
        std::process::exit(0);
    }
}
