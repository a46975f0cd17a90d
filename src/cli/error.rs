//! CLI error types and conversions

use crate::client::ClientError;
use crate::stream::StreamError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Stream error
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Client error
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Metrics initialization error
    #[error("metrics error: {0}")]
    Metrics(String),
}
