//! CLI error types.

use std::path::PathBuf;

use rzk_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("rzk executable not found: {}", .0.display())]
    Unavailable(PathBuf),

    #[error("{0}")]
    Validation(String),
}
