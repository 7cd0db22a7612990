//! Error types for the file hashing core library
//!
//! Errors are grouped into I/O, validation and internal categories. Per-file
//! failures inside a batch never reach the caller as an `Err`: the engine
//! logs them and leaves the affected fields out of the file's record.

use thiserror::Error;

pub mod internal;
pub mod io;
pub mod validation;

pub use self::io::{IoError, IoErrorKind};
pub use self::validation::ValidationError;
pub use internal::InternalError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the file hashing core library
///
/// Errors are categorized into three main types:
/// - I/O errors: reading file content or metadata
/// - Validation errors: bad check names, bad configuration values
/// - Internal errors: runtime availability, digest task failures
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error(transparent)]
    Io(#[from] IoError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal library errors
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io(IoError::from_std(source))
    }
}
