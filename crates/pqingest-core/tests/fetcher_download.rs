//! Integration tests: streaming download against a local HTTP server.

mod common;

use common::http_server::{self, ServerOptions};
use pqingest_core::fetcher::{download_to_path, FetchOptions};
use pqingest_core::IngestError;
use tempfile::tempdir;

fn opts(chunk_size: usize) -> FetchOptions {
    FetchOptions {
        chunk_size,
        ..FetchOptions::default()
    }
}

#[test]
fn download_matches_body_for_any_chunk_size() {
    let body: Vec<u8> = (0u8..251).cycle().take(3 * 1024 * 1024 + 17).collect();
    let url = http_server::start(body.clone());
    let dir = tempdir().unwrap();

    for chunk_size in [1024 * 1024, 64 * 1024, 4093] {
        let dest = dir.path().join(format!("out-{chunk_size}.parquet"));
        let outcome = download_to_path(&url, &dest, &opts(chunk_size)).expect("download");
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.bytes_written, body.len() as u64, "chunk {chunk_size}");
        let expected_chunks = (body.len() as u64).div_ceil(chunk_size as u64);
        assert_eq!(outcome.chunks_written, expected_chunks, "chunk {chunk_size}");
        let content = std::fs::read(&dest).unwrap();
        assert_eq!(content.len(), body.len());
        assert_eq!(content, body);
    }
}

#[test]
fn single_byte_chunks_reassemble_exactly() {
    let body: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
    let url = http_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("output.parquet");

    let outcome = download_to_path(&url, &dest, &opts(1)).unwrap();
    assert_eq!(outcome.bytes_written, 10_000);
    assert_eq!(outcome.chunks_written, 10_000);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[test]
fn download_digest_is_stable_across_chunk_sizes() {
    let body = b"PAR1 not really parquet but bytes are bytes".to_vec();
    let url = http_server::start(body);
    let dir = tempdir().unwrap();
    let a = download_to_path(&url, &dir.path().join("a"), &opts(3)).unwrap();
    let b = download_to_path(&url, &dir.path().join("b"), &opts(1024 * 1024)).unwrap();
    assert_eq!(a.sha256, b.sha256);
    assert_eq!(a.sha256.len(), 64);
}

#[test]
fn not_found_fails_with_download_error_and_leaves_no_file() {
    let url = http_server::start_with_options(
        b"<html>missing</html>".to_vec(),
        ServerOptions {
            status: (404, "Not Found"),
            ..ServerOptions::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("output.parquet");

    let err = download_to_path(&url, &dest, &FetchOptions::default()).unwrap_err();
    match err {
        IngestError::Download { status, .. } => assert_eq!(status, 404),
        other => panic!("expected Download error, got {other:?}"),
    }
    assert!(!dest.exists(), "404 must not create the destination");
}

#[test]
fn error_status_does_not_touch_existing_file() {
    let url = http_server::start_with_options(
        b"server exploded".to_vec(),
        ServerOptions {
            status: (500, "Internal Server Error"),
            ..ServerOptions::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("output.parquet");
    std::fs::write(&dest, b"previous run").unwrap();

    let err = download_to_path(&url, &dest, &FetchOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::Download { status: 500, .. }));
    assert_eq!(std::fs::read(&dest).unwrap(), b"previous run");
}

#[test]
fn redirects_are_followed() {
    let body = b"redirected payload".to_vec();
    let base = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            redirect: true,
            ..ServerOptions::default()
        },
    );
    let url = format!("{base}redirect/data.parquet");
    let dir = tempdir().unwrap();
    let dest = dir.path().join("output.parquet");

    let outcome = download_to_path(&url, &dest, &FetchOptions::default()).unwrap();
    assert_eq!(outcome.status, 200);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[test]
fn dropped_connection_is_a_transfer_error() {
    let body: Vec<u8> = vec![7u8; 256 * 1024];
    let url = http_server::start_with_options(
        body,
        ServerOptions {
            truncate_at: Some(1000),
            ..ServerOptions::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("output.parquet");

    let err = download_to_path(&url, &dest, &opts(4096)).unwrap_err();
    assert!(matches!(err, IngestError::Transfer(_)), "got {err:?}");
}

#[test]
fn empty_body_creates_empty_file() {
    let url = http_server::start(Vec::new());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("output.parquet");

    let outcome = download_to_path(&url, &dest, &FetchOptions::default()).unwrap();
    assert_eq!(outcome.bytes_written, 0);
    assert_eq!(outcome.chunks_written, 0);
    assert!(dest.exists());
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), 0);
}

#[test]
fn unreachable_host_is_a_transfer_error() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let dir = tempdir().unwrap();
    let err = download_to_path(
        &format!("http://127.0.0.1:{port}/x.parquet"),
        &dir.path().join("x"),
        &FetchOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::Transfer(_)), "got {err:?}");
}
