// ABOUTME: Application-wide error types for regbridge.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::dispatch::SubmitError;
use crate::request::ArgumentError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    #[error("lookup not submitted: {0}")]
    Submit(#[from] SubmitError),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[source] std::io::Error),

    #[error("{failed} of {total} lookup(s) failed")]
    LookupsFailed { failed: usize, total: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
