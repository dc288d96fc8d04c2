//! Error types for the export pipeline.

use std::path::PathBuf;

use thiserror::Error;
use visdump_client::ClientError;

/// Errors that abort an export, stats or plot run.
///
/// Nothing is retried and nothing is skipped: the first error ends the run.
#[derive(Debug, Error)]
pub enum Error {
    /// No environment id contained the requested substring.
    #[error("no environments matching '{pattern}'")]
    NoMatch { pattern: String },

    /// No window in the environment has the requested title.
    #[error("feature '{feature}' not found in environment '{env}'")]
    FeatureNotFound { feature: String, env: String },

    /// The matched window holds more than one trace.
    #[error(
        "window '{window}' for feature '{feature}' in environment '{env}' has {traces} traces, expected 1"
    )]
    AmbiguousSeries {
        feature: String,
        env: String,
        window: String,
        traces: usize,
    },

    /// The server answered with a document missing the expected keys.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid user input, detected before any request is made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Client(ClientError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid figure json: {0}")]
    Figure(#[from] serde_json::Error),

    #[error("failed to render figure: {0}")]
    Render(Box<dyn std::error::Error + Send + Sync>),
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Parse(msg) => Error::MalformedResponse(msg),
            other => Error::Client(other),
        }
    }
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
