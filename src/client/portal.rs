//! Portal streaming client
//!
//! Performs one logical "open a streamed response for this query" operation,
//! hiding transient-failure retries from the caller.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::client::lines;
use crate::client::retry::{FixedBackoff, RetryPolicy};
use crate::client::transport::{ReqwestTransport, StreamTransport};
use crate::client::{ByteStream, ClientError, ClientResult, LineStream};
use crate::metrics;
use crate::query::Query;

/// Server-side buffering hint sent with every stream request.
pub const DEFAULT_BUFFER_SIZE: u32 = 70;

/// Client for the portal's finalized-block streaming endpoint.
///
/// Holds no cross-call state: each [`finalized_stream`](Self::finalized_stream)
/// call owns at most one open connection, and the returned line sequence is
/// consumed by a single caller.
pub struct PortalClient<T: StreamTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
    buffer_size: u32,
    retry: Arc<dyn RetryPolicy>,
}

impl PortalClient<ReqwestTransport> {
    /// Create a client for the dataset at `base_url`
    /// (e.g. `http://portal.internal:8080/datasets/solana-beta`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(base_url, ReqwestTransport::new())
    }
}

impl<T: StreamTransport> PortalClient<T> {
    /// Create a client over a custom transport. Tests use this to script
    /// responses without a network.
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            transport,
            base_url,
            buffer_size: DEFAULT_BUFFER_SIZE,
            retry: Arc::new(FixedBackoff::default()),
        }
    }

    /// Replace the transient-status retry policy.
    pub fn with_retry_policy(mut self, retry: impl RetryPolicy + 'static) -> Self {
        self.retry = Arc::new(retry);
        self
    }

    /// Override the server-side buffering hint.
    pub fn with_buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a streamed response for `query` and return its body as a lazy
    /// sequence of newline-delimited records.
    ///
    /// Status handling:
    /// - 429/503: transient; wait per the retry policy and reissue the same
    ///   request. Invisible to the caller and never touches its cursor.
    /// - other non-200: fatal for this call; the drained body text is
    ///   carried in the error.
    /// - 200: the body is exposed line by line. The server closing the
    ///   connection before the full range was delivered ends the sequence
    ///   without error; the caller resumes from its cursor.
    pub async fn finalized_stream(&self, query: &Query) -> ClientResult<LineStream> {
        let url = format!(
            "{}/finalized-stream/debug?buffer_size={}",
            self.base_url, self.buffer_size
        );

        let mut attempt: u32 = 0;
        loop {
            let response = self.transport.open(&url, query).await?;
            metrics::record_portal_request(response.status);

            match response.status {
                200 => {
                    debug!(from_block = ?query.from_block, to_block = ?query.to_block, "stream opened");
                    return Ok(lines::lines(response.body));
                }
                status @ (429 | 503) => {
                    attempt += 1;
                    metrics::record_transient_status(status);
                    let Some(delay) = self.retry.next_delay(attempt) else {
                        return Err(ClientError::RetriesExhausted(attempt));
                    };
                    warn!(
                        status,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient status from portal, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                status => {
                    let body = read_body_text(response.body).await;
                    warn!(status, body = %body, "portal rejected stream request");
                    return Err(ClientError::Status { status, body });
                }
            }
        }
    }
}

/// Drain a response body into text for error reporting.
async fn read_body_text(mut body: ByteStream) -> String {
    let mut buf = Vec::new();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => buf.extend_from_slice(&bytes),
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
