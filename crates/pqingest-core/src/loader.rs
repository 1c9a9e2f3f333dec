//! Parquet artifact → in-memory tabular dataset.

use crate::artifact::ArtifactEncoding;
use crate::config::{IngestConfig, DEFAULT_READ_BATCH_SIZE};
use crate::error::{IngestError, Result};
use crate::schema::{self, SchemaDescriptor};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use flate2::read::GzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Rows per decoded record batch.
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_READ_BATCH_SIZE,
        }
    }
}

impl From<&IngestConfig> for LoadOptions {
    fn from(cfg: &IngestConfig) -> Self {
        Self {
            batch_size: cfg.read_batch_size,
        }
    }
}

/// Columns and rows materialized from the artifact.
#[derive(Debug, Clone)]
pub struct TabularDataset {
    pub arrow_schema: SchemaRef,
    pub descriptor: SchemaDescriptor,
    pub batches: Vec<RecordBatch>,
    pub num_rows: u64,
}

impl TabularDataset {
    pub fn num_columns(&self) -> usize {
        self.descriptor.len()
    }
}

/// Reads the Parquet file at `path` into memory.
///
/// `Gzip` artifacts are decompressed first unless they already start with the
/// Parquet magic (some servers decode `.gz` in transit). Any format failure,
/// including a truncated download, is reported as [`IngestError::Parse`].
pub fn load_parquet(
    path: &Path,
    encoding: ArtifactEncoding,
    opts: &LoadOptions,
) -> Result<TabularDataset> {
    tracing::info!(path = %path.display(), ?encoding, "reading parquet artifact");
    match encoding {
        ArtifactEncoding::Plain => {
            let file = File::open(path).map_err(|e| IngestError::storage(path, e))?;
            read_batches(file, opts)
        }
        ArtifactEncoding::Gzip => {
            let raw = std::fs::read(path).map_err(|e| IngestError::storage(path, e))?;
            if raw.starts_with(PARQUET_MAGIC) {
                tracing::debug!("gzip artifact is already plain parquet");
                return read_batches(Bytes::from(raw), opts);
            }
            let mut decoded = Vec::new();
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut decoded)
                .map_err(|e| IngestError::Parse(format!("gzip decode failed: {e}")))?;
            tracing::debug!(
                compressed = raw.len(),
                decompressed = decoded.len(),
                "gzip artifact decoded"
            );
            read_batches(Bytes::from(decoded), opts)
        }
    }
}

fn read_batches<R: ChunkReader + 'static>(reader: R, opts: &LoadOptions) -> Result<TabularDataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let arrow_schema = builder.schema().clone();
    let expected_rows = builder.metadata().file_metadata().num_rows();
    let descriptor = schema::describe(&arrow_schema);
    if descriptor.is_empty() {
        // Rows without columns: only the footer count carries information.
        let num_rows = u64::try_from(expected_rows)
            .map_err(|_| IngestError::Parse(format!("footer declares {expected_rows} rows")))?;
        tracing::info!(rows = num_rows, "parquet artifact has no columns");
        return Ok(TabularDataset {
            arrow_schema,
            descriptor,
            batches: Vec::new(),
            num_rows,
        });
    }

    let reader = builder.with_batch_size(opts.batch_size.max(1)).build()?;
    let mut batches = Vec::new();
    let mut num_rows = 0u64;
    for batch in reader {
        let batch = batch?;
        num_rows += batch.num_rows() as u64;
        batches.push(batch);
    }

    if u64::try_from(expected_rows).ok() != Some(num_rows) {
        return Err(IngestError::Parse(format!(
            "footer declares {expected_rows} rows but {num_rows} were decoded"
        )));
    }

    tracing::info!(
        rows = num_rows,
        columns = descriptor.len(),
        batches = batches.len(),
        "parquet artifact loaded"
    );

    Ok(TabularDataset {
        arrow_schema,
        descriptor,
        batches,
        num_rows,
    })
}
