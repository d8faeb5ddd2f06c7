use polyline_match_lib::MatchError;
use std::path::PathBuf;

/// Errors raised while loading input, matching or writing the report
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse GPX file {path}: {source}")]
    Gpx {
        path: PathBuf,
        #[source]
        source: gpx::errors::GpxError,
    },

    #[error("failed to parse JSON file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("matching failed: {0}")]
    Match(#[from] MatchError),

    #[error("record {position} in {path} has no \"{field}\" field")]
    MissingIdentity {
        path: PathBuf,
        position: usize,
        field: String,
    },

    #[error("record {position} in {path}: \"{field}\" must be a string or a number")]
    InvalidIdentity {
        path: PathBuf,
        position: usize,
        field: String,
    },
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
