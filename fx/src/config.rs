//! Rate pipeline configuration.

use cambio_common::time::constants;
use cambio_common::DurationExt;
use chrono::Duration;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use crate::error::{FxError, FxResult};
use crate::properties;

/// Default endpoint of the pricing service.
pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "EXR_API_KEY";

/// Properties file consulted when the environment has no key.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.properties";

/// Key name inside the properties file.
pub const API_KEY_PROPERTY: &str = "api_key";

/// Configuration for the exchangerate-api client.
#[derive(Debug, Clone)]
pub struct ExchangeRateApiConfig {
    /// API key; `None` or blank means the client is not configured.
    pub api_key: Option<String>,
    /// Service root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout enforced by the HTTP client.
    pub request_timeout: StdDuration,
}

impl Default for ExchangeRateApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: constants::default_request_timeout().as_std(),
        }
    }
}

impl ExchangeRateApiConfig {
    /// Load configuration from environment variables.
    ///
    /// The API key is not read here; see [`CredentialSource`].
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("EXR_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(secs) = std::env::var("EXR_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = StdDuration::from_secs(secs);
            }
        }

        config
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("Base URL must be http(s): {}", self.base_url));
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be 0".to_string());
        }

        Ok(())
    }
}

/// Configuration for the rate resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// How long fetched rates stay in the cache.
    pub ttl: Duration,
    /// Whether to consult and fill the cache at all.
    pub use_cache: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ttl: constants::default_rate_ttl(),
            use_cache: true,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(secs) = std::env::var("EXR_CACHE_TTL_SECS") {
            if let Ok(secs) = secs.parse() {
                if let Err(e) = config.set_ttl_secs(secs) {
                    warn!(error = %e, "Ignoring EXR_CACHE_TTL_SECS");
                }
            }
        }

        config
    }

    /// Set the TTL from a number of seconds.
    pub fn set_ttl_secs(&mut self, secs: i64) -> Result<(), String> {
        self.ttl = Duration::try_seconds(secs)
            .ok_or_else(|| format!("Cache TTL out of range: {}s", secs))?;
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.use_cache && self.ttl <= Duration::zero() {
            return Err("Cache TTL must be positive".to_string());
        }

        if self.ttl > constants::max_rate_ttl() {
            return Err(format!(
                "Cache TTL cannot exceed {} days",
                constants::max_rate_ttl().num_days()
            ));
        }

        Ok(())
    }
}

/// Where the API key comes from: an environment variable first, then a
/// `key=value` properties file.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    pub env_var: String,
    pub config_path: PathBuf,
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self {
            env_var: API_KEY_ENV.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl CredentialSource {
    /// Use a different properties file.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Resolve the key from the process environment and the properties file.
    pub fn load(&self) -> FxResult<String> {
        self.load_with(|name| std::env::var(name).ok())
    }

    /// Resolve the key using `lookup` in place of the process environment.
    pub fn load_with(&self, lookup: impl Fn(&str) -> Option<String>) -> FxResult<String> {
        if let Some(key) = non_blank(lookup(&self.env_var)) {
            debug!(source = %self.env_var, "API key loaded from environment");
            return Ok(key);
        }

        if let Some(key) = non_blank(read_property(&self.config_path, API_KEY_PROPERTY)) {
            debug!(path = %self.config_path.display(), "API key loaded from config file");
            return Ok(key);
        }

        Err(FxError::NotConfigured)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read one property from a properties file; unreadable files yield `None`.
fn read_property(path: &Path, name: &str) -> Option<String> {
    properties::read(path).ok()?.remove(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn properties(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_configs_are_valid() {
        assert!(ExchangeRateApiConfig::default().validate().is_ok());
        assert!(ResolverConfig::default().validate().is_ok());
        assert_eq!(ResolverConfig::default().ttl, Duration::seconds(3600));
        assert_eq!(
            ExchangeRateApiConfig::default().request_timeout,
            StdDuration::from_secs(5)
        );
    }

    #[test]
    fn test_invalid_configs() {
        let mut api = ExchangeRateApiConfig::default();
        api.base_url = "ftp://example.com".to_string();
        assert!(api.validate().is_err());

        let mut api = ExchangeRateApiConfig::default();
        api.request_timeout = StdDuration::ZERO;
        assert!(api.validate().is_err());

        let resolver = ResolverConfig {
            ttl: Duration::zero(),
            use_cache: true,
        };
        assert!(resolver.validate().is_err());
    }

    #[test]
    fn test_ttl_bounds() {
        let mut config = ResolverConfig::default();

        assert!(config.set_ttl_secs(i64::MAX).is_err());
        assert_eq!(config.ttl, Duration::seconds(3600));

        config.set_ttl_secs(9_000_000_000_000).unwrap();
        assert!(config.validate().is_err());

        config.set_ttl_secs(365 * 86_400).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_properties_syntax() {
        let source = |contents: &str| {
            let file = properties(contents);
            CredentialSource::default()
                .with_config_path(file.path())
                .load_with(|_| None)
        };

        assert_eq!(source("api_key:abc123\n").unwrap(), "abc123");
        assert_eq!(source("api_key = abc123\n").unwrap(), "abc123");
        assert_eq!(source("api_key=ab$cd\n").unwrap(), "ab$cd");
    }

    #[test]
    fn test_env_wins_over_file() {
        let file = properties("api_key=from-file\n");
        let source = CredentialSource::default().with_config_path(file.path());

        let key = source
            .load_with(|name| (name == API_KEY_ENV).then(|| " from-env ".to_string()))
            .unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_file_fallback_and_blank_env() {
        let file = properties("# cambio\nother=1\napi_key=from-file\n");
        let source = CredentialSource::default().with_config_path(file.path());

        let key = source.load_with(|_| Some("   ".to_string())).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_missing_everywhere_is_not_configured() {
        let file = properties("api_key=\n");
        let source = CredentialSource::default().with_config_path(file.path());
        assert!(matches!(source.load_with(|_| None), Err(FxError::NotConfigured)));

        let source = CredentialSource::default().with_config_path("/nonexistent/cambio.properties");
        assert!(matches!(source.load_with(|_| None), Err(FxError::NotConfigured)));
    }
}
