//! Error types for the ingest pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while downloading, parsing, or loading a dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Remote server answered with a non-2xx status.
    #[error("failed to download {url}: HTTP {status}")]
    Download { url: String, status: u32 },

    /// Curl reported a transport failure (DNS, refused connection, dropped transfer).
    #[error("transfer failed: {0}")]
    Transfer(#[from] curl::Error),

    /// Local file I/O failed.
    #[error("storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid columnar data (e.g. truncated download).
    #[error("parse failed: {0}")]
    Parse(String),

    /// Database unreachable or credentials rejected.
    #[error("connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Dropping, creating, or filling the target table failed.
    #[error("write to table {table} failed: {source}")]
    Write {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// The validation count query failed.
    #[error("count query on table {table} failed: {source}")]
    Query {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// Invalid configuration or connection parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A blocking step (download or parse) panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Target table row count differs from the dataset (strict runs only).
    #[error("row count mismatch: dataset has {expected} rows, table has {actual}")]
    RowCountMismatch { expected: u64, actual: i64 },
}

impl IngestError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Storage {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(table: &str, source: sqlx::Error) -> Self {
        IngestError::Write {
            table: table.to_string(),
            source,
        }
    }
}

impl From<parquet::errors::ParquetError> for IngestError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IngestError::Parse(e.to_string())
    }
}

impl From<arrow::error::ArrowError> for IngestError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IngestError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
