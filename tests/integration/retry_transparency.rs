//! Integration tests for transparent transient-status retry
//!
//! A client that sees 429 N times before a 200 must look identical to one
//! that got the 200 immediately, apart from the elapsed backoff time, and
//! must never disturb the streamer's cursor.

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use portal_loadtest::client::{ClientError, FixedBackoff, PortalClient};
use portal_loadtest::query;
use portal_loadtest::stream::{BlockStreamer, StreamError};

use crate::support::{ndjson, test_config, MockTransport, Scripted};

fn fast_retry_client(transport: &MockTransport, delay: Duration) -> PortalClient<MockTransport> {
    PortalClient::with_transport("http://portal.test/datasets/solana-beta", transport.clone())
        .with_retry_policy(FixedBackoff::limited(delay, 16))
}

#[tokio::test]
async fn test_transient_statuses_are_invisible_to_the_consumer() {
    let transport = MockTransport::new(vec![
        Scripted::Status(429, ""),
        Scripted::Status(503, ""),
        Scripted::Chunks(ndjson(100..=105)),
    ]);
    let backoff = Duration::from_millis(10);
    let client = fast_retry_client(&transport, backoff);
    let streamer = BlockStreamer::with_config(client, test_config(5));

    let started = Instant::now();
    let blocks: Vec<u64> = streamer
        .stream_range(&query::fetch_all(), "100")
        .unwrap()
        .map(|r| r.unwrap().number())
        .collect()
        .await;

    // Output is indistinguishable from an immediate 200.
    assert_eq!(blocks, vec![100, 101, 102, 103, 104, 105]);
    // Every attempt reissued the identical range: the cursor never moved.
    assert_eq!(transport.calls(), 3);
    assert!(transport
        .requests()
        .iter()
        .all(|&range| range == (Some(100), Some(105))));
    // Two retries means at least two backoff intervals of wall time.
    assert!(started.elapsed() >= backoff * 2);
}

#[tokio::test]
async fn test_transient_retry_after_short_read_keeps_cursor() {
    let transport = MockTransport::new(vec![
        Scripted::Chunks(ndjson(100..=102)),
        Scripted::Status(429, ""),
        Scripted::Chunks(ndjson(103..=105)),
    ]);
    let client = fast_retry_client(&transport, Duration::from_millis(1));
    let streamer = BlockStreamer::with_config(client, test_config(5));

    let blocks: Vec<u64> = streamer
        .stream_range(&query::fetch_all(), "100")
        .unwrap()
        .map(|r| r.unwrap().number())
        .collect()
        .await;

    assert_eq!(blocks, vec![100, 101, 102, 103, 104, 105]);
    // The retried request resumes from the cursor, like the one it repeats.
    assert_eq!(
        transport.requests(),
        vec![
            (Some(100), Some(105)),
            (Some(103), Some(105)),
            (Some(103), Some(105)),
        ]
    );
}

#[tokio::test]
async fn test_bounded_policy_surfaces_exhaustion() {
    let transport = MockTransport::new(vec![
        Scripted::Status(429, ""),
        Scripted::Status(429, ""),
        Scripted::Status(429, ""),
    ]);
    let client = PortalClient::with_transport("http://portal.test", transport.clone())
        .with_retry_policy(FixedBackoff::limited(Duration::from_millis(1), 2));
    let streamer = BlockStreamer::with_config(client, test_config(5));

    let results: Vec<_> = streamer
        .stream_range(&query::fetch_all(), "100")
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0],
        Err(StreamError::Client(ClientError::RetriesExhausted(3)))
    ));
    assert_eq!(transport.calls(), 3);
}
