//! Rate pipeline error types.

use cambio_common::{CurrencyError, RatePairKey};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Structured error kinds reported by the remote pricing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The service does not know one of the currency codes.
    UnsupportedCode,
    /// The request URL was not understood.
    MalformedRequest,
    /// The API key was rejected.
    InvalidKey,
    /// The account behind the key is not active.
    InactiveAccount,
    /// The request quota for the key is used up.
    QuotaReached,
    /// Any other error type the service reports.
    Other(String),
}

impl ApiErrorKind {
    /// Map the service's `error-type` string to a kind.
    pub fn from_error_type(error_type: &str) -> Self {
        match error_type.trim() {
            "unsupported-code" => ApiErrorKind::UnsupportedCode,
            "malformed-request" => ApiErrorKind::MalformedRequest,
            "invalid-key" => ApiErrorKind::InvalidKey,
            "inactive-account" => ApiErrorKind::InactiveAccount,
            "quota-reached" => ApiErrorKind::QuotaReached,
            other => ApiErrorKind::Other(other.to_string()),
        }
    }

    /// The wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            ApiErrorKind::UnsupportedCode => "unsupported-code",
            ApiErrorKind::MalformedRequest => "malformed-request",
            ApiErrorKind::InvalidKey => "invalid-key",
            ApiErrorKind::InactiveAccount => "inactive-account",
            ApiErrorKind::QuotaReached => "quota-reached",
            ApiErrorKind::Other(s) => s,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::UnsupportedCode => write!(f, "unsupported currency code"),
            ApiErrorKind::MalformedRequest => write!(f, "malformed request"),
            ApiErrorKind::InvalidKey => write!(f, "invalid API key"),
            ApiErrorKind::InactiveAccount => write!(f, "inactive account"),
            ApiErrorKind::QuotaReached => write!(f, "request quota reached"),
            ApiErrorKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Errors that can occur while resolving or applying a rate.
#[derive(Debug, Clone, Error)]
pub enum FxError {
    /// No API key was supplied.
    #[error("Rate service is not configured: set EXR_API_KEY or api_key in the config file")]
    NotConfigured,

    /// Network-level failure, including timeouts.
    #[error("Could not reach the rate service: {0}")]
    Transport(String),

    /// Non-2xx HTTP status.
    #[error("Rate service returned HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    /// The service reported a structured error.
    #[error("Rate service error: {0}")]
    Api(ApiErrorKind),

    /// A success response lacked an expected field.
    #[error("Rate service response is missing '{field}'")]
    MissingData { field: String },

    /// Reciprocal of a zero rate was requested.
    #[error("Cannot derive inverse rate for {0}: forward rate is zero")]
    InverseUndefined(RatePairKey),

    /// A rate value that no real exchange rate can take.
    #[error("Invalid rate data: {0}")]
    DataIntegrity(String),

    /// Amounts to convert must not be negative.
    #[error("Invalid amount {0}: must not be negative")]
    InvalidAmount(Decimal),

    /// A currency code failed to parse.
    #[error("Invalid currency: {0}")]
    InvalidCurrency(#[from] CurrencyError),
}

impl FxError {
    /// Whether the failure may go away on its own ("rate temporarily unavailable").
    pub fn is_transient(&self) -> bool {
        match self {
            FxError::Transport(_) => true,
            FxError::Protocol { status, .. } => *status >= 500 || *status == 429,
            FxError::Api(kind) => *kind == ApiErrorKind::QuotaReached,
            _ => false,
        }
    }

    /// Stable code for this error kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::NotConfigured => "NOT_CONFIGURED",
            FxError::Transport(_) => "TRANSPORT_ERROR",
            FxError::Protocol { .. } => "PROTOCOL_ERROR",
            FxError::Api(_) => "API_ERROR",
            FxError::MissingData { .. } => "MISSING_DATA",
            FxError::InverseUndefined(_) => "INVERSE_UNDEFINED",
            FxError::DataIntegrity(_) => "DATA_INTEGRITY",
            FxError::InvalidAmount(_) => "INVALID_AMOUNT",
            FxError::InvalidCurrency(_) => "INVALID_CURRENCY",
        }
    }
}

impl From<reqwest::Error> for FxError {
    fn from(e: reqwest::Error) -> Self {
        // Strip the URL: it embeds the API key.
        let e = e.without_url();
        if e.is_timeout() {
            FxError::Transport(format!("request timed out: {}", e))
        } else {
            FxError::Transport(e.to_string())
        }
    }
}

/// Result type for rate operations.
pub type FxResult<T> = Result<T, FxError>;
