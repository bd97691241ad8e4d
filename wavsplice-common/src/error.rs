//! Common error types for wavsplice

use thiserror::Error;

/// Common result type for wavsplice-common operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the wavsplice crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
