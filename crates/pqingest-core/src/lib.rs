pub mod config;
pub mod logging;

pub mod artifact;
pub mod error;
pub mod fetcher;
pub mod loader;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod validator;

pub use error::{IngestError, Result};
