//! Chunked body producers.
//!
//! Each download spawns one task that pushes [`CHUNK_SIZE`] slices through
//! a bounded channel into the streamed response body. The channel holds
//! only a few chunks, so the producer runs at the pace the socket drains.
//!
//! When the client goes away hyper drops the body, the receiver with it,
//! and the next `send` fails. The producer logs how far it got and stops.
//! That is the normal end of an aborted transfer, not an error.

use std::time::Duration;

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::{CHUNK_SIZE, PROGRESS_INTERVAL};

/// Chunks buffered between a producer and its connection.
const CHANNEL_DEPTH: usize = 4;

static ZEROES: [u8; CHUNK_SIZE] = [0; CHUNK_SIZE];

/// How a producer ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum End {
    Complete,
    Disconnected,
    Failed,
}

/// What a producer did before it ended.
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct Outcome {
    pub(crate) end: End,
    pub(crate) sent: u64,
    /// Progress lines logged at `info`.
    pub(crate) reports: u64,
}

/// Streams `total` zero bytes, sleeping `delay` after each chunk.
pub(crate) fn zeroes(total: u64, delay: Duration) -> mpsc::Receiver<Bytes> {
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
    tokio::spawn(async move { finish(send_zeroes(tx, total, delay).await, total) });
    rx
}

/// Streams the contents of `file`, expected to be `total` bytes long.
pub(crate) fn file(file: File, total: u64) -> mpsc::Receiver<Bytes> {
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
    tokio::spawn(async move { finish(send_file(tx, file, total).await, total) });
    rx
}

fn finish(outcome: Outcome, total: u64) {
    let Outcome { end, sent, reports } = outcome;
    match end {
        End::Complete => info!(sent, reports, "transfer complete"),
        End::Disconnected => info!(sent, total, "client disconnected"),
        End::Failed => error!(sent, total, "transfer aborted"),
    }
}

async fn send_zeroes(tx: mpsc::Sender<Bytes>, total: u64, delay: Duration) -> Outcome {
    let mut sent: u64 = 0;

    while sent < total {
        // Bounded by CHUNK_SIZE, so the cast cannot truncate.
        let len = (total - sent).min(CHUNK_SIZE as u64) as usize;
        if tx.send(Bytes::from_static(&ZEROES[..len])).await.is_err() {
            return Outcome { end: End::Disconnected, sent, reports: 0 };
        }
        sent += len as u64;
        debug!(sent, total, "sending: {:.1}%", percent(sent, total));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Outcome { end: End::Complete, sent, reports: 0 }
}

async fn send_file(tx: mpsc::Sender<Bytes>, mut file: File, total: u64) -> Outcome {
    let mut sent: u64 = 0;
    let mut reports: u64 = 0;
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match file.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                error!(sent, total, "read error: {e}");
                return Outcome { end: End::Failed, sent, reports };
            }
        };

        if tx.send(Bytes::copy_from_slice(&buf[..n])).await.is_err() {
            return Outcome { end: End::Disconnected, sent, reports };
        }
        sent += n as u64;

        if sent / PROGRESS_INTERVAL > reports {
            reports = sent / PROGRESS_INTERVAL;
            info!(sent, total, "progress: {:.1}%", percent(sent, total));
        }
    }

    Outcome { end: End::Complete, sent, reports }
}

fn percent(sent: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    sent as f64 / total as f64 * 100.0
}
