//! Builds small Parquet files for loader and pipeline tests.

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use flate2::write::GzEncoder;
use flate2::Compression;
use parquet::arrow::ArrowWriter;
use std::io::Write;
use std::sync::Arc;

/// A taxi-trip shaped batch with `rows` rows and a few nulls.
pub fn trips_batch(rows: usize) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("VendorID", DataType::Int64, true),
        Field::new("fare_amount", DataType::Float64, true),
        Field::new("store_and_fwd_flag", DataType::Utf8, true),
        Field::new("congestion", DataType::Boolean, true),
    ]));
    let vendor: ArrayRef = Arc::new(Int64Array::from_iter(
        (0..rows).map(|i| if i % 7 == 3 { None } else { Some((i % 2 + 1) as i64) }),
    ));
    let fare: ArrayRef = Arc::new(Float64Array::from_iter_values(
        (0..rows).map(|i| 2.5 + i as f64 * 0.25),
    ));
    let flag: ArrayRef = Arc::new(StringArray::from_iter(
        (0..rows).map(|i| if i % 5 == 0 { None } else { Some(if i % 2 == 0 { "N" } else { "Y" }) }),
    ));
    let congestion: ArrayRef = Arc::new(BooleanArray::from_iter(
        (0..rows).map(|i| Some(i % 3 == 0)),
    ));
    RecordBatch::try_new(schema, vec![vendor, fare, flag, congestion]).unwrap()
}

/// Parquet bytes for `trips_batch(rows)`.
pub fn trips_parquet(rows: usize) -> Vec<u8> {
    let batch = trips_batch(rows);
    let mut out = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut out, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    out
}

/// Gzip-compresses `data`.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::fast());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}
