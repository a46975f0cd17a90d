//! Portal transport client
//!
//! Owns the HTTP streaming connection lifecycle: issuing the request,
//! classifying the response status, retrying transient server conditions and
//! exposing the body as a lazy sequence of newline-delimited records.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

pub mod lines;
pub mod portal;
pub mod retry;
pub mod transport;

pub use lines::LineFramer;
pub use portal::PortalClient;
pub use retry::{FixedBackoff, RetryPolicy};
pub use transport::{ReqwestTransport, StreamResponse, StreamTransport};

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection-level failure, before or during body consumption
    #[error("network error: {0}")]
    Network(String),

    /// Non-200 response outside the transient set; carries the response body
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code returned by the portal
        status: u16,
        /// Response body text, for diagnostics
        body: String,
    },

    /// A bounded retry policy gave up on transient statuses
    #[error("transient retries exhausted after {0} attempts")]
    RetriesExhausted(u32),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Stream of raw body chunks from one open connection
pub type ByteStream = Pin<Box<dyn Stream<Item = ClientResult<Bytes>> + Send>>;

/// Stream of newline-delimited records, one JSON document per item,
/// produced lazily as bytes arrive over the wire
pub type LineStream = Pin<Box<dyn Stream<Item = ClientResult<Bytes>> + Send>>;
