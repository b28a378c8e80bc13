//! Error kinds surfaced by the tool layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Failures that the tool surface distinguishes.
///
/// Cache-read failures during the read-through path are deliberately not
/// represented here: they are swallowed and treated as cache misses.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The upstream documentation provider returned an error. The message is
    /// passed through to the caller unmodified.
    #[error("{0}")]
    Upstream(String),

    /// A cached file requested by path does not exist or cannot be read.
    #[error("{0}")]
    NotFound(String),

    /// Any other unexpected failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
