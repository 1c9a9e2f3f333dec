//! Streaming HTTP GET downloader.
//!
//! Writes the response body to the destination in fixed-size chunks so the
//! payload is never held in memory at once. The destination is opened lazily
//! on the first byte of a 2xx body: an error status never touches it.

use crate::config::{IngestConfig, DEFAULT_CHUNK_SIZE};
use crate::error::{IngestError, Result};
use sha2::{Digest, Sha256};
use std::cell::Cell;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str;
use std::time::Duration;

/// Knobs for a single download.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Bytes buffered before each write to disk.
    pub chunk_size: usize,
    /// Optional connect timeout; None leaves libcurl's default in place.
    pub connect_timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout: None,
        }
    }
}

impl From<&IngestConfig> for FetchOptions {
    fn from(cfg: &IngestConfig) -> Self {
        Self {
            chunk_size: cfg.chunk_size_bytes,
            connect_timeout: cfg.connect_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Result of a completed download.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub path: PathBuf,
    /// Final HTTP status (after redirects).
    pub status: u32,
    pub bytes_written: u64,
    /// Number of non-empty chunks written to disk.
    pub chunks_written: u64,
    /// Lowercase hex SHA-256 of the bytes written.
    pub sha256: String,
}

/// Accumulates body bytes into a chunk buffer and writes full chunks to the file.
struct ChunkedSink<'p> {
    path: &'p Path,
    file: Option<File>,
    buf: Vec<u8>,
    chunk_size: usize,
    bytes_written: u64,
    chunks_written: u64,
    hasher: Sha256,
    error: Option<io::Error>,
}

impl<'p> ChunkedSink<'p> {
    fn new(path: &'p Path, chunk_size: usize) -> Self {
        Self {
            path,
            file: None,
            buf: Vec::with_capacity(chunk_size),
            chunk_size,
            bytes_written: 0,
            chunks_written: 0,
            hasher: Sha256::new(),
            error: None,
        }
    }

    fn accept(&mut self, mut data: &[u8]) -> io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.hasher.update(data);
        while !data.is_empty() {
            let room = self.chunk_size - self.buf.len();
            let take = room.min(data.len());
            self.buf.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.buf.len() == self.chunk_size {
                self.write_chunk()?;
            }
        }
        Ok(())
    }

    fn file(&mut self) -> io::Result<&mut File> {
        let file = match self.file.take() {
            Some(f) => f,
            None => File::create(self.path)?,
        };
        Ok(self.file.insert(file))
    }

    fn write_chunk(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::take(&mut self.buf);
        self.file()?.write_all(&chunk)?;
        self.bytes_written += chunk.len() as u64;
        self.chunks_written += 1;
        self.buf = chunk;
        self.buf.clear();
        Ok(())
    }

    /// Flush the trailing partial chunk and sync. Creates the file for empty bodies.
    fn finish(mut self) -> io::Result<(u64, u64, String)> {
        self.write_chunk()?;
        let file = self.file()?;
        file.flush()?;
        file.sync_all()?;
        let digest = hex::encode(self.hasher.finalize());
        Ok((self.bytes_written, self.chunks_written, digest))
    }
}

fn is_success(status: u32) -> bool {
    (200..300).contains(&status)
}

/// Parse the status code out of an `HTTP/x.y NNN reason` header line.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

fn check_scheme(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| IngestError::Config(format!("invalid URL {url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(IngestError::Config(format!(
            "unsupported URL scheme {other:?} (expected http or https)"
        ))),
    }
}

/// Downloads `url` with a single GET, streaming the body to `dest`.
///
/// Non-2xx responses fail with [`IngestError::Download`]; their bodies are
/// discarded and `dest` is left as it was. Runs in the current thread; call
/// from `spawn_blocking` if used from async code.
pub fn download_to_path(url: &str, dest: &Path, opts: &FetchOptions) -> Result<FetchOutcome> {
    check_scheme(url)?;
    if opts.chunk_size == 0 {
        return Err(IngestError::Config("chunk size must be greater than zero".into()));
    }

    let status = Cell::new(0u32);
    let mut sink = ChunkedSink::new(dest, opts.chunk_size);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    if let Some(timeout) = opts.connect_timeout {
        easy.connect_timeout(timeout)?;
    }

    tracing::info!(url, dest = %dest.display(), chunk_size = opts.chunk_size, "download started");

    let perform_result = {
        let mut transfer = easy.transfer();
        // Each response in a redirect chain starts with its own status line;
        // the last one seen before the body is the one that counts.
        transfer.header_function(|line| {
            if let Some(code) = parse_status_line(line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| {
            if !is_success(status.get()) {
                return Ok(data.len());
            }
            match sink.accept(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    tracing::warn!("download write failed: {}", e);
                    sink.error = Some(e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if e.is_write_error() {
            if let Some(io_err) = sink.error.take() {
                return Err(IngestError::storage(dest, io_err));
            }
        }
        return Err(IngestError::Transfer(e));
    }

    let code = easy.response_code()?;
    if !is_success(code) {
        tracing::warn!(url, status = code, "download rejected");
        return Err(IngestError::Download {
            url: url.to_string(),
            status: code,
        });
    }

    let (bytes_written, chunks_written, sha256) =
        sink.finish().map_err(|e| IngestError::storage(dest, e))?;

    tracing::info!(
        url,
        bytes = bytes_written,
        chunks = chunks_written,
        sha256 = %sha256,
        "download finished"
    );

    Ok(FetchOutcome {
        path: dest.to_path_buf(),
        status: code,
        bytes_written,
        chunks_written,
        sha256,
    })
}
