use std::path::{Path, PathBuf};

use crate::types::DsgError;
use thiserror::Error;

/// Error type for inspection commands over graph files.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Graph file not found at the specified path.
    #[error("graph file not found: {0}")]
    MissingGraph(PathBuf),
    /// Custom error message.
    #[error("{0}")]
    Message(String),
    /// Decoding or graph error.
    #[error(transparent)]
    Core(#[from] DsgError),
    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for inspection commands.
pub type Result<T> = std::result::Result<T, AdminError>;

impl AdminError {
    pub(crate) fn missing_graph(path: impl AsRef<Path>) -> Self {
        AdminError::MissingGraph(path.as_ref().to_path_buf())
    }
}
