//! CLI error types.

use std::path::PathBuf;

use peekmd_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Server(#[from] ServerError),
}
