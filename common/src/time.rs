//! Time utilities for rate freshness.

use chrono::{DateTime, Duration, Utc};

/// Timing defaults.
pub mod constants {
    use super::Duration;

    /// How long a fetched rate stays fresh in the cache (1 hour).
    pub fn default_rate_ttl() -> Duration {
        Duration::seconds(3600)
    }

    /// Longest TTL a cache entry may be configured with (365 days).
    pub fn max_rate_ttl() -> Duration {
        Duration::days(365)
    }

    /// Per-request timeout for the remote pricing service (5 seconds).
    pub fn default_request_timeout() -> Duration {
        Duration::seconds(5)
    }
}

/// A timestamp (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whether `expiry` has been reached at `at`.
///
/// An entry is dead from the instant its expiry is reached, not after it.
pub fn is_expired_at(expiry: Timestamp, at: Timestamp) -> bool {
    at >= expiry
}

/// Whether `expiry` has been reached now.
pub fn is_expired(expiry: Timestamp) -> bool {
    is_expired_at(expiry, now())
}

/// Calculate an expiry time relative to `from`.
///
/// Saturates at the representable bounds instead of overflowing.
pub fn expires_after(from: Timestamp, duration: Duration) -> Timestamp {
    from.checked_add_signed(duration).unwrap_or(if duration < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Duration extensions for convenient conversion.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
