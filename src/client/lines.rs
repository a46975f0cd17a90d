//! Newline framing over a chunked response body
//!
//! The portal delivers one JSON document per line, but the transport hands us
//! arbitrary byte chunks. [`LineFramer`] re-assembles complete lines across
//! chunk boundaries; [`lines`] adapts a whole body stream.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use futures_util::{stream, StreamExt};

use crate::client::{ByteStream, LineStream};

/// Incremental line splitter.
///
/// Lines are terminated by `\n`; a preceding `\r` is stripped. Blank lines
/// (keep-alive noise) are skipped. Byte lengths reported downstream exclude
/// the delimiter, matching what the throughput accounting counts.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
}

impl LineFramer {
    /// Feed one chunk and collect every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line = self.buf.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            if !line.is_empty() {
                lines.push(line.freeze());
            }
        }
        lines
    }

    /// Flush the trailing unterminated line once the body has ended.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.buf.is_empty() {
            return None;
        }
        let mut line = self.buf.split();
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        if line.is_empty() {
            None
        } else {
            Some(line.freeze())
        }
    }
}

struct LineState {
    body: ByteStream,
    framer: LineFramer,
    pending: VecDeque<Bytes>,
    done: bool,
}

/// Turn a raw body stream into a stream of complete lines.
///
/// The adapter pulls chunks only when its own consumer asks for the next
/// line, so the body stays lazy. A transport error ends the stream after the
/// error item; a clean close flushes any trailing partial line first.
pub fn lines(body: ByteStream) -> LineStream {
    let state = LineState {
        body,
        framer: LineFramer::default(),
        pending: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                return Some((Ok(line), state));
            }
            if state.done {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => state.pending.extend(state.framer.push(&chunk)),
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    if let Some(rest) = state.framer.finish() {
                        state.pending.push_back(rest);
                    }
                }
            }
        }
    }))
}
