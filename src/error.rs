//! Error type shared by the password derivation core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by generators, entries and the password collection.
///
/// Every failure is local and computational: retrying with the same inputs
/// reproduces the same error.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown or malformed generator identifier, or a missing configuration key.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Charset file missing, unreadable or with fewer than two distinct symbols.
    #[error("invalid charset '{}': {reason}", path.display())]
    InvalidCharset { path: PathBuf, reason: String },

    #[error("unsupported hash algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    /// Reserved generator without an implementation.
    #[error("generator '{0}' is not implemented")]
    NotImplemented(&'static str),

    #[error("invalid password length {0}: must be between 1 and {max}", max = crate::generator::MAX_LENGTH)]
    InvalidLength(usize),

    /// Target entropy that is not a finite, non-negative number of bits, or
    /// that needs more than the longest supported password.
    #[error("invalid target entropy {0} bits")]
    InvalidEntropy(f64),

    #[error("invalid keyword pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("entry '{0}' not found")]
    EntryNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
