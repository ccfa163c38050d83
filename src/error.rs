use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading the configuration file.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

/// Why an image source failed to list its identifiers.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The configured image directory is missing or is not a directory.
    #[error("invalid image directory: {}", .0.display())]
    BadDir(PathBuf),

    /// Reading a listing document from disk failed.
    #[error("failed to read image listing {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking directory walk panicked or was cancelled.
    #[error("image listing worker failed")]
    Worker(#[from] tokio::task::JoinError),
}
