//! HTTP transport seam for the portal client
//!
//! The [`StreamTransport`] trait is the single point where real network I/O
//! happens; production uses [`ReqwestTransport`], tests script responses.

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::client::{ByteStream, ClientError, ClientResult};
use crate::query::Query;

/// One opened streaming response: the status line plus the (lazy) body.
pub struct StreamResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as it arrives over the wire
    pub body: ByteStream,
}

/// Opens one streaming request against the portal.
///
/// Implementations issue a POST with the query as JSON body and hand back the
/// status together with the raw byte stream. Status classification and retry
/// live above this seam, in [`PortalClient`](crate::client::PortalClient).
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Issue the request and return the response without consuming its body.
    async fn open(&self, url: &str, query: &Query) -> ClientResult<StreamResponse>;
}

/// Production transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default client configuration.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl StreamTransport for ReqwestTransport {
    async fn open(&self, url: &str, query: &Query) -> ClientResult<StreamResponse> {
        let response = self
            .client
            .post(url)
            .json(query)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| ClientError::Network(e.to_string()))),
        );

        Ok(StreamResponse { status, body })
    }
}
