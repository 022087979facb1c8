use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No access log found in {}", dir.display())]
    NoLogFound { dir: PathBuf },

    #[error(
        "Too many unparsed lines in {}: {failed} of {total} failed (threshold {threshold})",
        path.display()
    )]
    ParseFailureRatioExceeded {
        path: PathBuf,
        failed: u64,
        total: u64,
        threshold: f64,
    },

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to serialize report rows: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid report template: {0}")]
    InvalidTemplate(String),

    #[error("Pipeline cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
