//! End-to-end ingest: download → load → replace → count, strictly in sequence.

use crate::artifact::{self, ArtifactEncoding};
use crate::config::IngestConfig;
use crate::error::Result;
use crate::fetcher::{self, FetchOptions};
use crate::loader::{self, LoadOptions};
use crate::sink::{ConnectParams, PgSink, ReplaceOptions};
use crate::validator::{self, RowCountCheck};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// One ingest run.
#[derive(Debug, Clone)]
pub struct IngestJob {
    pub connect: ConnectParams,
    pub table_name: String,
    pub url: String,
    /// Directory the artifact is written to.
    pub work_dir: PathBuf,
}

/// Progress notifications, emitted in order.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    DownloadStarted { url: String },
    DownloadFinished { path: PathBuf, bytes: u64 },
    ReadingArtifact { path: PathBuf },
    SchemaInferred { ddl: String },
    TableReplaced { table: String, rows: u64 },
    RowCount(RowCountCheck),
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub url: String,
    pub artifact: PathBuf,
    pub bytes_downloaded: u64,
    pub sha256: String,
    pub table: String,
    pub dataset_rows: u64,
    pub table_rows: i64,
    pub row_count_matches: bool,
    pub elapsed_secs: f64,
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Runs the full pipeline for `job`, reporting progress through `on_event`.
///
/// The artifact is left in `job.work_dir` afterwards, and an existing file of
/// the same name is overwritten.
pub async fn run_ingest<F>(job: &IngestJob, cfg: &IngestConfig, mut on_event: F) -> Result<IngestReport>
where
    F: FnMut(&IngestEvent),
{
    let started = Instant::now();
    let encoding = ArtifactEncoding::from_url(&job.url);
    let dest = artifact::artifact_path(&job.work_dir, &job.url);

    on_event(&IngestEvent::DownloadStarted {
        url: job.url.clone(),
    });
    let fetched = {
        let url = job.url.clone();
        let dest = dest.clone();
        let opts = FetchOptions::from(cfg);
        blocking(move || fetcher::download_to_path(&url, &dest, &opts)).await?
    };
    on_event(&IngestEvent::DownloadFinished {
        path: fetched.path.clone(),
        bytes: fetched.bytes_written,
    });

    on_event(&IngestEvent::ReadingArtifact { path: dest.clone() });
    let dataset = {
        let path = dest.clone();
        let opts = LoadOptions::from(cfg);
        blocking(move || loader::load_parquet(&path, encoding, &opts)).await?
    };

    let mut sink = PgSink::connect(&job.connect).await?;
    on_event(&IngestEvent::SchemaInferred {
        ddl: PgSink::schema_ddl(&job.table_name, &dataset.descriptor),
    });

    let inserted = sink
        .replace_table(&job.table_name, &dataset, &ReplaceOptions::from(cfg))
        .await?;
    on_event(&IngestEvent::TableReplaced {
        table: job.table_name.clone(),
        rows: inserted,
    });

    let actual = validator::count_rows(&mut sink, &job.table_name).await?;
    let check = validator::check(dataset.num_rows, actual);
    on_event(&IngestEvent::RowCount(check));

    if let Err(e) = sink.close().await {
        tracing::debug!("closing database connection: {}", e);
    }

    Ok(IngestReport {
        url: job.url.clone(),
        artifact: dest,
        bytes_downloaded: fetched.bytes_written,
        sha256: fetched.sha256,
        table: job.table_name.clone(),
        dataset_rows: dataset.num_rows,
        table_rows: actual,
        row_count_matches: check.matches(),
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}
