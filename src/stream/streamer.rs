//! Resumable block-range streamer
//!
//! Delivers every block in `[from_block, from_block + range_size]` inclusive
//! exactly once, transparently restarting the underlying stream as many times
//! as the server requires, and reports throughput once the range completes.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::{stream, Stream, StreamExt};
use tracing::{info, warn};

use crate::client::transport::StreamTransport;
use crate::client::{LineStream, PortalClient};
use crate::metrics;
use crate::query::Query;
use crate::stream::config::StreamConfig;
use crate::stream::progress::RangeProgress;
use crate::stream::session::{RangeStats, StreamSession};
use crate::stream::{BlockStream, StreamError, StreamResult};
use crate::BlockRecord;

/// Streams fixed-size block ranges from a portal dataset.
pub struct BlockStreamer<T: StreamTransport> {
    client: Arc<PortalClient<T>>,
    config: StreamConfig,
}

impl<T: StreamTransport + 'static> BlockStreamer<T> {
    /// Create a streamer with the default configuration.
    pub fn new(client: PortalClient<T>) -> Self {
        Self::with_config(client, StreamConfig::default())
    }

    /// Create a streamer with an explicit configuration.
    pub fn with_config(client: PortalClient<T>, config: StreamConfig) -> Self {
        Self {
            client: Arc::new(client),
            config,
        }
    }

    /// The streamer's configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Stream the range starting at `start_block` (a decimal block-height
    /// token) through `start_block + range_size`, inclusive.
    ///
    /// The returned [`RangeRun`] yields each block exactly once, in order,
    /// across however many underlying connections it takes. The range
    /// completes when a line's `header.number` equals the target block; the
    /// throughput report is then logged and recorded, and the sequence ends.
    ///
    /// Any error (fatal status, mid-body transport failure, malformed line)
    /// is yielded once, after which the sequence yields nothing further.
    pub fn stream_range(&self, template: &Query, start_block: &str) -> StreamResult<RangeRun> {
        let token = start_block.trim();
        let from_block: u64 = token
            .parse()
            .map_err(|e: std::num::ParseIntError| StreamError::InvalidStartBlock {
                token: token.to_string(),
                message: e.to_string(),
            })?;
        let target_to_block = from_block.checked_add(self.config.range_size).ok_or_else(|| {
            StreamError::InvalidStartBlock {
                token: token.to_string(),
                message: "range end overflows the block height space".to_string(),
            }
        })?;

        info!(from_block, to_block = target_to_block, "Starting stream");

        let stats = Arc::new(RangeStats::default());
        let state = RangeState {
            client: Arc::clone(&self.client),
            template: template.clone(),
            config: self.config.clone(),
            session: StreamSession::new(from_block, target_to_block),
            progress: RangeProgress::new(from_block, target_to_block),
            stats: Arc::clone(&stats),
            lines: None,
            done: false,
        };

        Ok(RangeRun {
            stats,
            stream: Box::pin(stream::unfold(state, drive_range)),
        })
    }
}

/// One running range: a stream of block records plus a shared statistics
/// handle that stays readable during and after the run.
pub struct RangeRun {
    stats: Arc<RangeStats>,
    stream: BlockStream,
}

impl std::fmt::Debug for RangeRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeRun").field("stats", &self.stats).finish()
    }
}

impl RangeRun {
    /// Shared statistics for this run (bytes, blocks, restarts, completion).
    pub fn stats(&self) -> Arc<RangeStats> {
        Arc::clone(&self.stats)
    }

    /// Discard the statistics handle and keep only the record stream.
    pub fn into_stream(self) -> BlockStream {
        self.stream
    }
}

impl Stream for RangeRun {
    type Item = StreamResult<BlockRecord>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().stream.as_mut().poll_next(cx)
    }
}

struct RangeState<T: StreamTransport> {
    client: Arc<PortalClient<T>>,
    template: Query,
    config: StreamConfig,
    session: StreamSession,
    progress: RangeProgress,
    stats: Arc<RangeStats>,
    lines: Option<LineStream>,
    done: bool,
}

/// One turn of the resume loop: open a connection if none is live, then pull
/// the next line, park the cursor on it and yield the parsed record. A clean
/// end-of-stream either completes the range or restarts from the cursor.
async fn drive_range<T: StreamTransport>(
    mut state: RangeState<T>,
) -> Option<(StreamResult<BlockRecord>, RangeState<T>)> {
    if state.done {
        return None;
    }

    loop {
        if state.lines.is_none() {
            let query = state
                .template
                .with_range(state.session.next_from_block(), state.session.target_to_block());
            match state.client.finalized_stream(&query).await {
                Ok(lines) => state.lines = Some(lines),
                Err(e) => {
                    state.done = true;
                    return Some((Err(e.into()), state));
                }
            }
        }
        let Some(lines) = state.lines.as_mut() else {
            continue;
        };

        match lines.next().await {
            Some(Ok(line)) => {
                state.session.record_line(line.len());
                state.stats.observe_line(line.len());

                let record: BlockRecord = match serde_json::from_slice(&line) {
                    Ok(record) => record,
                    Err(e) => {
                        state.done = true;
                        return Some((
                            Err(StreamError::Parse {
                                cursor: state.session.last_block(),
                                message: e.to_string(),
                            }),
                            state,
                        ));
                    }
                };

                state.session.advance(record.number());
                state.stats.observe_block();
                if let Some(update) = state.progress.update(record.number()) {
                    info!("{update}");
                }
                return Some((Ok(record), state));
            }
            Some(Err(e)) => {
                state.done = true;
                return Some((Err(e.into()), state));
            }
            None => {
                // Connection closed by the server.
                state.lines = None;

                if state.session.is_complete() {
                    state.stats.mark_complete();
                    let report = state.session.report(state.config.reported_blocks);
                    metrics::record_range_complete(
                        report.elapsed_secs,
                        report.total_bytes,
                        state.stats.blocks_delivered(),
                    );
                    info!("{report}");
                    state.done = true;
                    return None;
                }

                state.session.note_restart();
                state.stats.observe_restart();
                metrics::record_stream_restart();

                if let Some(max) = state.config.max_restarts {
                    if state.session.restarts() > max {
                        state.done = true;
                        return Some((
                            Err(StreamError::RestartLimitExceeded(state.session.restarts())),
                            state,
                        ));
                    }
                }

                warn!(
                    resume_from = state.session.next_from_block(),
                    to_block = state.session.target_to_block(),
                    "Restarting stream"
                );
            }
        }
    }
}
