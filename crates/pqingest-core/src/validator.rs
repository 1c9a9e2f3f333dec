//! Post-load row count check. Observational: the result is reported, not enforced.

use crate::error::{IngestError, Result};
use crate::schema::quote_ident;
use crate::sink::PgSink;
use serde::Serialize;

/// Expected (dataset) versus actual (table) row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowCountCheck {
    pub expected: u64,
    pub actual: i64,
}

impl RowCountCheck {
    pub fn matches(&self) -> bool {
        u64::try_from(self.actual).ok() == Some(self.expected)
    }

    /// Turns a mismatch into [`IngestError::RowCountMismatch`].
    pub fn into_result(self) -> Result<Self> {
        if self.matches() {
            Ok(self)
        } else {
            Err(IngestError::RowCountMismatch {
                expected: self.expected,
                actual: self.actual,
            })
        }
    }
}

/// `SELECT COUNT(*)` on `table`.
pub async fn count_rows(sink: &mut PgSink, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    let (count,): (i64,) = sqlx::query_as(&sql)
        .fetch_one(sink.connection())
        .await
        .map_err(|source| IngestError::Query {
            table: table.to_string(),
            source,
        })?;
    Ok(count)
}

/// Compares the dataset's row count with the table's and logs a mismatch.
pub fn check(expected: u64, actual: i64) -> RowCountCheck {
    let result = RowCountCheck { expected, actual };
    if result.matches() {
        tracing::info!(rows = actual, "row count verified");
    } else {
        tracing::warn!(expected, actual, "row count mismatch");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_counts() {
        let c = check(42, 42);
        assert!(c.matches());
        assert!(c.into_result().is_ok());
    }

    #[test]
    fn mismatch_is_reported_not_raised() {
        let c = check(42, 41);
        assert!(!c.matches());
        assert!(matches!(
            c.into_result(),
            Err(IngestError::RowCountMismatch {
                expected: 42,
                actual: 41
            })
        ));
    }

    #[test]
    fn negative_count_never_matches() {
        assert!(!check(0, -1).matches());
    }
}
