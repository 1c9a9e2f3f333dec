//! Local artifact naming.
//!
//! The downloaded file is always written under a fixed name in the work
//! directory; only the suffix changes, based on the source URL.

use std::path::{Path, PathBuf};

/// Artifact name for a plain Parquet source.
pub const PLAIN_ARTIFACT: &str = "output.parquet";
/// Artifact name for a gzip-compressed Parquet source.
pub const GZIP_ARTIFACT: &str = "output.parquet.gz";

const GZIP_SUFFIX: &str = ".parquet.gz";

/// Content-encoding hint derived from the source URL's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactEncoding {
    Plain,
    Gzip,
}

impl ArtifactEncoding {
    /// `Gzip` if the URL ends with `.parquet.gz`, otherwise `Plain`.
    pub fn from_url(url: &str) -> Self {
        if url.ends_with(GZIP_SUFFIX) {
            ArtifactEncoding::Gzip
        } else {
            ArtifactEncoding::Plain
        }
    }

    /// Local file name used for this encoding.
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactEncoding::Plain => PLAIN_ARTIFACT,
            ArtifactEncoding::Gzip => GZIP_ARTIFACT,
        }
    }
}

/// Derives the local artifact file name from the source URL.
///
/// - `artifact_name_for_url("https://host/trips.parquet.gz")` → `"output.parquet.gz"`
/// - `artifact_name_for_url("https://host/trips.parquet")` → `"output.parquet"`
pub fn artifact_name_for_url(url: &str) -> &'static str {
    ArtifactEncoding::from_url(url).file_name()
}

/// Full path of the artifact for `url` inside `work_dir`.
pub fn artifact_path(work_dir: &Path, url: &str) -> PathBuf {
    work_dir.join(artifact_name_for_url(url))
}
