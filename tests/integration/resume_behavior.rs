//! Integration tests for cursor-based stream resumption
//!
//! The properties under test: every block in the range is delivered exactly
//! once and in order no matter where the server cuts the connection, the
//! range completes only on the exact target block, and byte accounting sums
//! raw line lengths across all restarts.

use futures_util::StreamExt;
use portal_loadtest::client::PortalClient;
use portal_loadtest::stream::{BlockStreamer, StreamError};
use portal_loadtest::{query, BlockRecord};

use crate::support::{block_line, ndjson, test_config, MockTransport, Scripted};

fn streamer(transport: &MockTransport, range_size: u64) -> BlockStreamer<MockTransport> {
    let client = PortalClient::with_transport("http://portal.test/datasets/solana-beta", transport.clone());
    BlockStreamer::with_config(client, test_config(range_size))
}

async fn collect_blocks(
    streamer: &BlockStreamer<MockTransport>,
    start_block: &str,
) -> Vec<Result<BlockRecord, StreamError>> {
    let run = streamer
        .stream_range(&query::fetch_all(), start_block)
        .expect("valid start token");
    run.collect().await
}

#[tokio::test]
async fn test_range_completes_on_single_stream() {
    let transport = MockTransport::new(vec![Scripted::Chunks(ndjson(100..=105))]);
    let streamer = streamer(&transport, 5);

    let run = streamer.stream_range(&query::fetch_all(), "100").unwrap();
    let stats = run.stats();
    let blocks: Vec<u64> = run.map(|r| r.unwrap().number()).collect().await;

    assert_eq!(blocks, vec![100, 101, 102, 103, 104, 105]);
    assert_eq!(transport.requests(), vec![(Some(100), Some(105))]);
    assert!(stats.is_complete());
    assert_eq!(stats.restarts(), 0);
}

#[tokio::test]
async fn test_short_read_resumes_from_cursor() {
    let transport = MockTransport::new(vec![
        Scripted::Chunks(ndjson(100..=102)),
        Scripted::Chunks(ndjson(103..=105)),
    ]);
    let streamer = streamer(&transport, 5);

    let run = streamer.stream_range(&query::fetch_all(), "100").unwrap();
    let stats = run.stats();
    let blocks: Vec<u64> = run.map(|r| r.unwrap().number()).collect().await;

    // Gap-free, duplicate-free, strictly increasing across the restart.
    assert_eq!(blocks, vec![100, 101, 102, 103, 104, 105]);
    // The reissued request starts one past the cursor; the target is fixed.
    assert_eq!(
        transport.requests(),
        vec![(Some(100), Some(105)), (Some(103), Some(105))]
    );
    assert_eq!(stats.restarts(), 1);
    assert!(stats.is_complete());
}

#[tokio::test]
async fn test_many_short_reads_still_gap_free() {
    let transport = MockTransport::new(vec![
        Scripted::Chunks(ndjson(100..=100)),
        Scripted::Chunks(ndjson(101..=103)),
        Scripted::Chunks(ndjson(104..=104)),
        Scripted::Chunks(ndjson(105..=110)),
    ]);
    let streamer = streamer(&transport, 10);

    let blocks: Vec<u64> = streamer
        .stream_range(&query::fetch_all(), "100")
        .unwrap()
        .map(|r| r.unwrap().number())
        .collect()
        .await;

    assert_eq!(blocks, (100..=110).collect::<Vec<u64>>());
    assert_eq!(transport.calls(), 4);
}

#[tokio::test]
async fn test_empty_first_response_restarts_from_original_block() {
    let transport = MockTransport::new(vec![
        Scripted::Chunks(vec![]),
        Scripted::Chunks(ndjson(100..=105)),
    ]);
    let streamer = streamer(&transport, 5);

    let blocks = collect_blocks(&streamer, "100").await;
    assert_eq!(blocks.len(), 6);

    // With no cursor yet, the restart reuses the original from_block.
    assert_eq!(
        transport.requests(),
        vec![(Some(100), Some(105)), (Some(100), Some(105))]
    );
}

#[tokio::test]
async fn test_completion_requires_exact_target_block() {
    // First stream stops one block short of the target; the loop must issue
    // another request even though only a single block remains.
    let transport = MockTransport::new(vec![
        Scripted::Chunks(ndjson(100..=104)),
        Scripted::Chunks(ndjson(105..=105)),
    ]);
    let streamer = streamer(&transport, 5);

    let run = streamer.stream_range(&query::fetch_all(), "100").unwrap();
    let stats = run.stats();
    let blocks: Vec<u64> = run.map(|r| r.unwrap().number()).collect().await;

    assert_eq!(blocks.last(), Some(&105));
    assert_eq!(transport.calls(), 2);
    assert!(stats.is_complete());
}

#[tokio::test]
async fn test_byte_accounting_sums_lines_across_restarts() {
    let transport = MockTransport::new(vec![
        Scripted::Chunks(ndjson(100..=101)),
        Scripted::Chunks(ndjson(102..=103)),
    ]);
    let streamer = streamer(&transport, 3);

    let run = streamer.stream_range(&query::fetch_all(), "100").unwrap();
    let stats = run.stats();
    let blocks: Vec<u64> = run.map(|r| r.unwrap().number()).collect().await;
    assert_eq!(blocks, vec![100, 101, 102, 103]);

    let expected: u64 = (100..=103).map(|n| block_line(n).len() as u64).sum();
    assert_eq!(stats.total_bytes(), expected);
    assert_eq!(stats.blocks_delivered(), 4);
}

#[tokio::test]
async fn test_restart_limit_bounds_stalled_server() {
    // A server that never returns data would loop forever under the
    // production default; the configured bound turns that into an error.
    let transport = MockTransport::new(vec![
        Scripted::Chunks(vec![]),
        Scripted::Chunks(vec![]),
        Scripted::Chunks(vec![]),
    ]);
    let client = PortalClient::with_transport("http://portal.test", transport.clone());
    let mut config = test_config(5);
    config.max_restarts = Some(2);
    let streamer = BlockStreamer::with_config(client, config);

    let results = collect_blocks(&streamer, "100").await;
    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0],
        Err(StreamError::RestartLimitExceeded(3))
    ));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_lines_split_across_chunks_parse_whole() {
    // One record split across three body chunks plus a second complete one.
    let line = block_line(100);
    let (a, rest) = line.as_bytes().split_at(10);
    let (b, c) = rest.split_at(7);
    let mut last_chunk = c.to_vec();
    last_chunk.push(b'\n');
    last_chunk.extend_from_slice(block_line(101).as_bytes());
    last_chunk.push(b'\n');

    let transport = MockTransport::new(vec![Scripted::Chunks(vec![
        a.to_vec(),
        b.to_vec(),
        last_chunk,
    ])]);
    let streamer = streamer(&transport, 1);

    let blocks: Vec<u64> = streamer
        .stream_range(&query::fetch_all(), "100")
        .unwrap()
        .map(|r| r.unwrap().number())
        .collect()
        .await;
    assert_eq!(blocks, vec![100, 101]);
}

#[tokio::test]
async fn test_invalid_start_token_is_rejected_up_front() {
    let transport = MockTransport::new(vec![]);
    let streamer = streamer(&transport, 5);

    let err = streamer
        .stream_range(&query::fetch_all(), "not-a-block")
        .unwrap_err();
    assert!(matches!(err, StreamError::InvalidStartBlock { .. }));
    assert_eq!(transport.calls(), 0);
}
