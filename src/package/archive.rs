//! Streaming extraction of a single JSON file from an npm tarball
//!
//! The download is pushed chunk by chunk into a channel. A blocking task reads
//! the channel as a plain [`Read`] and walks the tar entries in order, so only
//! the requested entry is ever buffered.

use std::io::{self, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use reqwest::Response;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::FetchError;

/// Number of body chunks buffered between the download and the decoder
const CHUNK_BUFFER: usize = 16;

/// Largest documentation file accepted from a tarball
pub const MAX_DOCUMENT_BYTES: u64 = 32 * 1024 * 1024;

/// Path of a package file inside an npm tarball
pub fn entry_path(main: &str) -> String {
    format!("package/{}", main.trim_start_matches("./"))
}

/// Blocking reader over body chunks received from an async task
pub struct ChunkReader {
    rx: mpsc::Receiver<Vec<u8>>,
    current: Vec<u8>,
    pos: usize,
}

impl ChunkReader {
    pub fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            current: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.pos < self.current.len() {
                let n = buf.len().min(self.current.len() - self.pos);
                buf[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            match self.rx.blocking_recv() {
                Some(chunk) => {
                    self.current = chunk;
                    self.pos = 0;
                }
                // Sender dropped: end of body
                None => return Ok(0),
            }
        }
    }
}

/// Reads a gzipped tarball and returns the parsed JSON of the entry at `target`.
///
/// Entries are visited lazily; unread entry data is skipped by the tar reader.
/// A target entry whose header declares more than [`MAX_DOCUMENT_BYTES`] is
/// rejected before anything is buffered.
/// The remainder of the stream is always drained, even after the target was
/// found, so the producer never blocks on a full channel.
pub fn extract_json_entry<R: Read>(
    reader: R,
    target: &str,
) -> Result<Option<serde_json::Value>, FetchError> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let mut found: Option<Vec<u8>> = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let is_target = found.is_none() && entry.path()? == Path::new(target);
        if is_target {
            let size = entry.size();
            if size > MAX_DOCUMENT_BYTES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{} declares {} bytes, limit is {}", target, size, MAX_DOCUMENT_BYTES),
                )
                .into());
            }
            let mut buf = Vec::new();
            entry.by_ref().take(MAX_DOCUMENT_BYTES).read_to_end(&mut buf)?;
            found = Some(buf);
        }
    }

    // Trailing padding after the end-of-archive marker
    io::copy(&mut archive.into_inner(), &mut io::sink())?;

    match found {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => {
            debug!("{} not found in archive", target);
            Ok(None)
        }
    }
}

/// Streams a tarball download through [`extract_json_entry`]
pub async fn extract_from_response(
    mut response: Response,
    target: String,
) -> Result<Option<serde_json::Value>, FetchError> {
    let (tx, rx) = mpsc::channel::<Vec<u8>>(CHUNK_BUFFER);
    let decoder =
        tokio::task::spawn_blocking(move || extract_json_entry(ChunkReader::new(rx), &target));

    let mut transfer = Ok(());
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                // The decoder stops receiving only when it failed
                if tx.send(chunk.to_vec()).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                transfer = Err(e);
                break;
            }
        }
    }
    drop(tx);

    let extracted = decoder
        .await
        .map_err(|e| FetchError::Worker(e.to_string()))?;
    transfer?;
    extracted
}
