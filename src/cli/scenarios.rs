//! CLI command for listing the built-in scenarios

use anyhow::{Context, Result};
use clap::Args;

use crate::scenario::ScenarioKind;

/// Scenarios subcommand
#[derive(Debug, Args)]
pub struct ScenariosCommand {
    /// Print the JSON query payload for one scenario instead of the listing
    #[arg(long)]
    pub payload: Option<ScenarioKind>,
}

impl ScenariosCommand {
    /// Execute the scenarios command.
    pub fn execute(&self) -> Result<()> {
        match self.payload {
            Some(kind) => {
                let payload = serde_json::to_string_pretty(&kind.query())
                    .context("Failed to serialize query payload")?;
                println!("{payload}");
            }
            None => {
                for kind in ScenarioKind::ALL {
                    println!("{:<24} {}", kind.name(), kind.describe());
                }
            }
        }
        Ok(())
    }
}
