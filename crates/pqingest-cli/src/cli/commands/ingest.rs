//! Download → load → replace → count, with progress on stdout.

use anyhow::{Context, Result};
use pqingest_core::config::IngestConfig;
use pqingest_core::pipeline::{self, IngestEvent, IngestJob, IngestReport};
use pqingest_core::sink::ConnectParams;
use pqingest_core::validator::RowCountCheck;
use std::path::PathBuf;

use crate::cli::Cli;

/// Everything the ingest command needs, detached from clap.
#[derive(Debug, Clone)]
pub struct IngestArgs {
    pub job: IngestJob,
    pub strict: bool,
    pub json: bool,
}

impl IngestArgs {
    pub fn from_cli(cli: Cli, work_dir: PathBuf) -> Self {
        Self {
            job: IngestJob {
                connect: ConnectParams {
                    user: cli.user,
                    password: cli.password,
                    host: cli.host,
                    port: cli.port,
                    database: cli.db,
                },
                table_name: cli.table_name,
                url: cli.url,
                work_dir,
            },
            strict: cli.strict,
            json: cli.json,
        }
    }
}

fn print_event(event: &IngestEvent) {
    match event {
        IngestEvent::DownloadStarted { url } => println!("Downloading file from: {url}"),
        IngestEvent::DownloadFinished { path, bytes } => {
            println!("File downloaded: {} ({bytes} bytes)", path.display())
        }
        IngestEvent::ReadingArtifact { .. } => println!("Reading parquet file..."),
        IngestEvent::SchemaInferred { ddl } => println!("{ddl}"),
        IngestEvent::TableReplaced { table, rows } => {
            println!("Loaded {rows} rows into table {table}")
        }
        IngestEvent::RowCount(check) => {
            if check.matches() {
                println!("Row count: {}", check.actual);
            } else {
                println!(
                    "Row count: {} (expected {} from the parquet file)",
                    check.actual, check.expected
                );
            }
        }
    }
}

/// Under `--strict`, a row count mismatch fails the run.
pub fn enforce_row_count(report: &IngestReport, strict: bool) -> Result<()> {
    if strict {
        RowCountCheck {
            expected: report.dataset_rows,
            actual: report.table_rows,
        }
        .into_result()?;
    }
    Ok(())
}

pub async fn run_ingest(args: IngestArgs, cfg: &IngestConfig) -> Result<()> {
    let job = &args.job;
    tracing::info!(url = %job.url, table = %job.table_name, "ingest started");

    let report = pipeline::run_ingest(job, cfg, print_event)
        .await
        .with_context(|| format!("ingest of {} into {} failed", job.url, job.table_name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    enforce_row_count(&report, args.strict)?;

    tracing::info!(
        rows = report.table_rows,
        elapsed_secs = report.elapsed_secs,
        "ingest finished"
    );
    Ok(())
}
