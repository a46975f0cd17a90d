//! CLI command implementations

use clap::{Parser, Subcommand};

pub mod error;
pub mod run;
pub mod scenarios;

pub use error::CliError;
pub use run::RunCommand;
pub use scenarios::ScenariosCommand;

/// Portal load-test worker CLI
#[derive(Parser, Debug)]
#[command(name = "portal-loadtest")]
#[command(about = "Generate synthetic streaming load against a Portal dataset", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one load-test worker against a portal endpoint
    Run(RunCommand),

    /// List the built-in scenarios and their query payloads
    Scenarios(ScenariosCommand),
}
