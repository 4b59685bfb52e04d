//! Error types for currency parsing.

use thiserror::Error;

/// Errors raised when a currency code cannot be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Blank input.
    #[error("Currency code is empty")]
    Empty,

    /// Input contains something other than ASCII letters.
    #[error("Currency code '{0}' must contain only letters")]
    InvalidCharacters(String),

    /// Input is too short or too long.
    #[error("Currency code '{code}' has {len} letters, expected 3 to 5")]
    InvalidLength { code: String, len: usize },
}

/// Result type alias for currency parsing.
pub type Result<T> = std::result::Result<T, CurrencyError>;
