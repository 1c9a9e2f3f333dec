//! Schema descriptor: Arrow column types mapped to PostgreSQL column types.
//!
//! The descriptor is inferred once when the artifact is loaded and handed to
//! the sink explicitly, so the write side never guesses types on its own.

use arrow::datatypes::{DataType, Schema, TimeUnit};
use serde::Serialize;
use std::fmt;

/// Semantic column type of the target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Text,
    Bytea,
    Date,
    Time,
    Timestamp,
    TimestampTz,
}

impl ColumnType {
    /// Maps an Arrow type to the column type used for the target table.
    ///
    /// Unsigned integers widen to the next signed type; `UInt64` and decimals
    /// become `NUMERIC`. Nested and otherwise unsupported types fall back to text.
    pub fn from_arrow(data_type: &DataType) -> Self {
        match data_type {
            DataType::Boolean => ColumnType::Boolean,
            DataType::Int8 | DataType::Int16 | DataType::UInt8 => ColumnType::SmallInt,
            DataType::Int32 | DataType::UInt16 => ColumnType::Integer,
            DataType::Int64 | DataType::UInt32 => ColumnType::BigInt,
            DataType::UInt64 => ColumnType::Numeric,
            DataType::Float16 | DataType::Float32 => ColumnType::Real,
            DataType::Float64 => ColumnType::Double,
            DataType::Decimal128(..) | DataType::Decimal256(..) => ColumnType::Numeric,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnType::Text,
            DataType::Binary
            | DataType::LargeBinary
            | DataType::BinaryView
            | DataType::FixedSizeBinary(_) => ColumnType::Bytea,
            DataType::Date32 | DataType::Date64 => ColumnType::Date,
            DataType::Time32(_) | DataType::Time64(_) => ColumnType::Time,
            DataType::Timestamp(_, None) => ColumnType::Timestamp,
            DataType::Timestamp(_, Some(_)) => ColumnType::TimestampTz,
            DataType::Dictionary(_, value) => ColumnType::from_arrow(value),
            _ => ColumnType::Text,
        }
    }

    /// PostgreSQL type name used in `CREATE TABLE`.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Real => "REAL",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Text => "TEXT",
            ColumnType::Bytea => "BYTEA",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TIME",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::TimestampTz => "TIMESTAMPTZ",
        }
    }

    /// Arrow type a column is cast to before its values are bound.
    ///
    /// Numeric values travel as their decimal text and are cast server-side.
    pub fn canonical_arrow(self) -> DataType {
        match self {
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::SmallInt => DataType::Int16,
            ColumnType::Integer => DataType::Int32,
            ColumnType::BigInt => DataType::Int64,
            ColumnType::Real => DataType::Float32,
            ColumnType::Double => DataType::Float64,
            ColumnType::Numeric | ColumnType::Text => DataType::Utf8,
            ColumnType::Bytea => DataType::Binary,
            ColumnType::Date => DataType::Date32,
            ColumnType::Time => DataType::Time64(TimeUnit::Microsecond),
            ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
            ColumnType::TimestampTz => {
                DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
            }
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// One column of the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

/// Ordered list of columns for the target table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDescriptor {
    pub columns: Vec<ColumnSpec>,
}

impl SchemaDescriptor {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Infers the descriptor from an Arrow schema, preserving column order.
pub fn describe(schema: &Schema) -> SchemaDescriptor {
    let columns = schema
        .fields()
        .iter()
        .map(|field| ColumnSpec {
            name: field.name().clone(),
            column_type: ColumnType::from_arrow(field.data_type()),
            nullable: field.is_nullable(),
        })
        .collect();
    SchemaDescriptor { columns }
}

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders `CREATE TABLE "<table>" (...)` for the descriptor.
///
/// Columns are always nullable on the database side; Parquet nullability is
/// informational only, matching a plain dataframe-to-table load.
pub fn create_table_ddl(table: &str, descriptor: &SchemaDescriptor) -> String {
    let columns: Vec<String> = descriptor
        .columns
        .iter()
        .map(|c| format!("\t{} {}", quote_ident(&c.name), c.column_type.sql_type()))
        .collect();
    if columns.is_empty() {
        return format!("CREATE TABLE {} ()", quote_ident(table));
    }
    format!(
        "CREATE TABLE {} (\n{}\n)",
        quote_ident(table),
        columns.join(",\n")
    )
}
