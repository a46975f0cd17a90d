//! Run command: one load-test worker process

use std::net::SocketAddr;

use clap::Args;
use tracing::{info, warn};

use crate::cli::CliError;
use crate::metrics;
use crate::scenario::{LoadScenario, ScenarioKind};
use crate::stream::config::RANGE_SIZE;

/// Run subcommand
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Scenario to fire (fetch_all, multiple_instructions, single_instruction, empty_query)
    #[arg(long, default_value = "fetch_all")]
    pub scenario: ScenarioKind,

    /// Starting block token for the first iteration
    #[arg(long)]
    pub from_block: String,

    /// Portal dataset base URL
    #[arg(long, default_value = "http://127.0.0.1:8080/datasets/solana-beta")]
    pub base_url: String,

    /// Ranges to stream before tearing down; each iteration starts just past
    /// the previous target block
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub iterations: u64,

    /// Parameter handed to the worker setup hook
    #[arg(long)]
    pub setup_param: Option<String>,

    /// Bind address for the Prometheus scrape endpoint; omit to disable the
    /// exporter
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

impl RunCommand {
    /// Execute the worker: setup, fire the requested iterations, teardown.
    ///
    /// On success this never returns: teardown terminates the process, per
    /// the harness contract. Errors return so main can exit non-zero.
    pub async fn execute(&self) -> Result<(), CliError> {
        if let Some(addr) = self.metrics_addr {
            metrics::init_metrics(addr).map_err(|e| CliError::Metrics(e.to_string()))?;
        }

        let mut start_block: u64 = self.from_block.trim().parse().map_err(|e| {
            CliError::InvalidArgument(format!("invalid --from-block {:?}: {e}", self.from_block))
        })?;

        let worker = LoadScenario::new(self.base_url.clone());
        worker.setup(self.setup_param.as_deref()).await;

        for iteration in 0..self.iterations {
            info!(
                iteration,
                start_block,
                scenario = %self.scenario,
                "Firing scenario"
            );

            let start_block_str = start_block.to_string();
            let summary = tokio::select! {
                result = worker.fire(self.scenario, &start_block_str) => result?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupt received, tearing down worker");
                    break;
                }
            };

            info!(
                iteration,
                blocks = summary.blocks,
                bytes = summary.bytes,
                restarts = summary.restarts,
                "Scenario iteration finished"
            );

            start_block = start_block.saturating_add(RANGE_SIZE + 1);
        }

        worker.teardown()
    }
}
