//! CLI command handlers.

mod ingest;

pub use ingest::{run_ingest, IngestArgs};
#[cfg(test)]
pub use ingest::enforce_row_count;
