use thiserror::Error;

/// Errors surfaced by the client glue around the progress core.
///
/// The registry and the body decorators never produce these: missing
/// observers and unknown lengths are silent no-ops, and read failures on a
/// tracked body are handed back to the consumer untouched.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },
}

pub type Result<T> = std::result::Result<T, ProgressError>;
