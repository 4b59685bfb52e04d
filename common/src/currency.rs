//! Currency identifiers for rate lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CurrencyError;

/// Shortest accepted currency code.
pub const MIN_CODE_LEN: usize = 3;

/// Longest accepted currency code.
pub const MAX_CODE_LEN: usize = 5;

/// Normalized currency code (uppercase, trimmed, ASCII letters only).
///
/// Two codes that differ only in case are the same currency:
/// `"usd"`, `" USD "` and `"Usd"` all parse to `USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a currency code.
    pub fn parse(raw: &str) -> Result<Self, CurrencyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CurrencyError::Empty);
        }

        if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCharacters(trimmed.to_string()));
        }

        let len = trimmed.len();
        if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&len) {
            return Err(CurrencyError::InvalidLength {
                code: trimmed.to_string(),
                len,
            });
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    pub fn gbp() -> Self {
        Self("GBP".to_string())
    }

    pub fn jpy() -> Self {
        Self("JPY".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = CurrencyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered currency pair used as the cache and fetch key.
///
/// Direction matters: `USD/EUR` and `EUR/USD` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatePairKey {
    /// Currency being converted from.
    pub base: CurrencyCode,
    /// Currency being converted to.
    pub target: CurrencyCode,
}

impl RatePairKey {
    /// Create a new pair key.
    pub fn new(base: CurrencyCode, target: CurrencyCode) -> Self {
        Self { base, target }
    }

    /// Parse both sides of a pair from raw strings.
    pub fn parse(base: &str, target: &str) -> Result<Self, CurrencyError> {
        Ok(Self::new(CurrencyCode::parse(base)?, CurrencyCode::parse(target)?))
    }

    /// Get the pair with base and target swapped.
    pub fn reversed(&self) -> Self {
        Self {
            base: self.target.clone(),
            target: self.base.clone(),
        }
    }
}

impl fmt::Display for RatePairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}
