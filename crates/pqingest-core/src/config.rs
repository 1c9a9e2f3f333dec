use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default write chunk for the fetcher (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
/// Default row batch size when decoding Parquet.
pub const DEFAULT_READ_BATCH_SIZE: usize = 8192;
/// Default rows per INSERT statement, before the bind-parameter cap is applied.
pub const DEFAULT_INSERT_BATCH_ROWS: usize = 10_000;

/// How the target table is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceMode {
    /// Drop, create and insert inside one transaction on the target name.
    #[default]
    InPlace,
    /// Fill a staging table, then drop the target and rename staging into place.
    Swap,
}

/// Global configuration loaded from `~/.config/pqingest/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Size in bytes of each chunk the fetcher writes to disk.
    pub chunk_size_bytes: usize,
    /// Rows per record batch when reading the Parquet artifact.
    pub read_batch_size: usize,
    /// Upper bound on rows per INSERT statement.
    pub insert_batch_rows: usize,
    /// Replace strategy for the target table.
    #[serde(default)]
    pub replace_mode: ReplaceMode,
    /// Optional HTTP connect timeout in seconds (None = libcurl default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            read_batch_size: DEFAULT_READ_BATCH_SIZE,
            insert_batch_rows: DEFAULT_INSERT_BATCH_ROWS,
            replace_mode: ReplaceMode::InPlace,
            connect_timeout_secs: None,
        }
    }
}

impl IngestConfig {
    /// Reject values that would stall the pipeline (zero-sized chunks or batches).
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size_bytes == 0 {
            anyhow::bail!("chunk_size_bytes must be greater than zero");
        }
        if self.read_batch_size == 0 {
            anyhow::bail!("read_batch_size must be greater than zero");
        }
        if self.insert_batch_rows == 0 {
            anyhow::bail!("insert_batch_rows must be greater than zero");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pqingest")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<IngestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = IngestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: IngestConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}
