//! Streaming reads
//!
//! [`read_stream`] hands back a [`ContentStream`] immediately. A background
//! task resolves the descriptor, opens the entry and feeds chunks into the
//! stream while hashing them. Every failure, including ones that happen before
//! the first byte is read, arrives as an `Err` item on the stream, after which
//! the stream ends.
//!
//! Chunks are yielded as they are read, so a consumer sees bytes before the
//! digest has been checked. The integrity check runs once the file is
//! exhausted; a mismatch is reported as the final item. A declared size is
//! enforced as bytes arrive: content longer than declared fails on the chunk
//! that overruns it (with `found` counting bytes read so far), shorter content
//! fails at EOF.

use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use cask_core::{CaskError, CaskResult, ContentConfig, ReadOpts};
use futures::{Stream, StreamExt};
use ssri::{Integrity, IntegrityChecker};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::descriptor::Descriptor;
use crate::resolve::with_content_path;

const CHUNK_SIZE: usize = 64 * 1024;
const CHANNEL_CAPACITY: usize = 16;

/// Verified byte stream over one store entry
#[derive(Debug)]
pub struct ContentStream {
    rx: mpsc::Receiver<CaskResult<Vec<u8>>>,
}

impl ContentStream {
    /// Drain the stream into a single buffer
    pub async fn read_to_end(mut self) -> CaskResult<Vec<u8>> {
        let mut data = Vec::new();
        while let Some(chunk) = self.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }
}

impl Stream for ContentStream {
    type Item = CaskResult<Vec<u8>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Open a verified stream over the content addressed by `descriptor`.
///
/// Must be called from within a Tokio runtime. Dropping the returned stream
/// stops the background task at its next chunk.
pub fn read_stream<D>(root: &Path, descriptor: &D, opts: &ReadOpts) -> ContentStream
where
    D: Descriptor + ?Sized,
{
    read_stream_with_config(root, descriptor, opts, &ContentConfig::default())
}

pub(crate) fn read_stream_with_config<D>(
    root: &Path,
    descriptor: &D,
    opts: &ReadOpts,
    config: &ContentConfig,
) -> ContentStream
where
    D: Descriptor + ?Sized,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let parsed = descriptor.to_integrity();
    let root = root.to_path_buf();
    let size = opts.size;
    let max_fanout = config.max_fanout;

    tokio::spawn(async move {
        if let Err(err) = pump(&root, parsed, size, max_fanout, &tx).await {
            debug!(error = %err, "content stream failed");
            // A closed receiver has nobody left to tell
            let _ = tx.send(Err(err)).await;
        }
    });

    ContentStream { rx }
}

async fn pump(
    root: &Path,
    parsed: CaskResult<Integrity>,
    size: Option<u64>,
    max_fanout: Option<usize>,
    tx: &mpsc::Sender<CaskResult<Vec<u8>>>,
) -> CaskResult<()> {
    let sri = parsed?;
    let (cpath, sri) = with_content_path(root, &sri, max_fanout, |cpath, sri| async move {
        tokio::fs::metadata(&cpath)
            .await
            .map_err(|e| CaskError::io(format!("Failed to stat content file {}", cpath.display()), e))?;
        Ok((cpath, sri))
    })
    .await?;

    let mut file = tokio::fs::File::open(&cpath)
        .await
        .map_err(|e| CaskError::io(format!("Failed to open content file {}", cpath.display()), e))?;

    let mut checker = IntegrityChecker::new(sri.clone());
    let mut found = 0u64;
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| CaskError::io(format!("Failed to read content file {}", cpath.display()), e))?;
        if n == 0 {
            break;
        }
        found += n as u64;
        // Oversized content fails before the excess reaches the consumer
        if let Some(expected) = size {
            if found > expected {
                return Err(CaskError::bad_size(expected, found));
            }
        }
        checker.input(&buf[..n]);
        if tx.send(Ok(buf[..n].to_vec())).await.is_err() {
            trace!(path = %cpath.display(), "content stream dropped by consumer");
            return Ok(());
        }
    }

    if let Some(expected) = size {
        if expected != found {
            return Err(CaskError::bad_size(expected, found));
        }
    }
    checker
        .result()
        .map_err(|_| CaskError::integrity_mismatch(sri, &cpath))?;
    Ok(())
}
