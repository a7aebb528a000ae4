use std::path::PathBuf;

/// Failures outside the game itself. The session never produces these:
/// bad learner input is always absorbed as a wrong answer or ignored.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

impl AppError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
