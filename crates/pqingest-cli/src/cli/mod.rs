//! CLI for pqingest.

mod commands;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use pqingest_core::config::{self, ReplaceMode};
use std::path::PathBuf;

use commands::{run_ingest, IngestArgs};

/// Replace strategy as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReplaceModeArg {
    /// Drop, create and insert in one transaction.
    InPlace,
    /// Load a staging table, then swap it in.
    Swap,
}

impl From<ReplaceModeArg> for ReplaceMode {
    fn from(arg: ReplaceModeArg) -> Self {
        match arg {
            ReplaceModeArg::InPlace => ReplaceMode::InPlace,
            ReplaceModeArg::Swap => ReplaceMode::Swap,
        }
    }
}

/// Ingest Parquet data to Postgres.
#[derive(Debug, Parser)]
#[command(name = "pqingest")]
#[command(about = "Ingest Parquet data to Postgres", long_about = None)]
pub struct Cli {
    /// User name for postgres.
    #[arg(long)]
    pub user: String,

    /// Password for postgres.
    #[arg(long)]
    pub password: String,

    /// Host for postgres.
    #[arg(long)]
    pub host: String,

    /// Port for postgres.
    #[arg(long)]
    pub port: u16,

    /// Database name for postgres.
    #[arg(long)]
    pub db: String,

    /// Table where to write data.
    #[arg(long = "table_name")]
    pub table_name: String,

    /// URL of the parquet file.
    #[arg(long)]
    pub url: String,

    /// Directory for the downloaded artifact (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// How to replace the target table (overrides config.toml).
    #[arg(long, value_enum)]
    pub replace_mode: Option<ReplaceModeArg>,

    /// Exit non-zero if the table row count differs from the file's.
    #[arg(long)]
    pub strict: bool,

    /// Print the final run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(mode) = cli.replace_mode {
            cfg.replace_mode = mode.into();
        }
        tracing::debug!("loaded config: {:?}", cfg);

        let work_dir = match cli.work_dir.clone() {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        run_ingest(IngestArgs::from_cli(cli, work_dir), &cfg).await
    }
}
