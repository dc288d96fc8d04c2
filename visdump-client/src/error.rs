//! Error types for the Visdom client.

use thiserror::Error;

/// Ways a request to the Visdom server can fail.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected `/env_state` or `/win_data`, typically with a 500
    /// for an unknown environment.
    #[error("visdom request failed: {0}")]
    Http(String),

    /// The body was not an env id list or a window map.
    #[error("unexpected visdom response: {0}")]
    Parse(String),

    #[error("cannot reach visdom server: {0}")]
    Connection(String),

    #[error("visdom server did not answer in time")]
    Timeout,

    /// The server, port and base url do not form a usable endpoint.
    #[error("invalid visdom endpoint: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidUrl(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}
