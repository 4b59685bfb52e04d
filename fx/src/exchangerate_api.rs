//! exchangerate-api.com (v6) rate source.
//!
//! Two endpoints are used:
//!
//! - `GET {base_url}/{key}/pair/{BASE}/{TARGET}` returning `conversion_rate`
//! - `GET {base_url}/{key}/latest/{BASE}` returning `conversion_rates`
//!
//! Both reply with `"result": "success"` or `"result": "error"` plus an
//! `"error-type"` string. Every response goes through [`interpret_response`],
//! so both endpoints classify failures identically.

use async_trait::async_trait;
use cambio_common::{CurrencyCode, RatePairKey};
use reqwest::header::ACCEPT;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use crate::config::ExchangeRateApiConfig;
use crate::error::{ApiErrorKind, FxError, FxResult};
use crate::source::{RateSource, RateTable};

/// Source ID constant
const SOURCE_ID: &str = "EXCHANGERATE_API";

/// Longest slice of an error body kept in `FxError::Protocol`.
const MAX_ERROR_BODY: usize = 200;

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiPayload {
    /// `"success"` or `"error"`.
    pub result: Option<String>,
    /// Machine-readable error kind when `result` is `"error"`.
    #[serde(rename = "error-type")]
    pub error_type: Option<String>,
    /// Pair endpoint rate.
    pub conversion_rate: Option<Decimal>,
    /// Latest endpoint rate table. Entries are parsed one by one so a single
    /// bad value does not sink the table.
    pub conversion_rates: Option<HashMap<String, serde_json::Value>>,
}

impl ApiPayload {
    fn is_error(&self) -> bool {
        self.result
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("error"))
    }

    fn api_error(&self) -> FxError {
        let kind = self
            .error_type
            .as_deref()
            .map(ApiErrorKind::from_error_type)
            .unwrap_or_else(|| ApiErrorKind::Other("unknown-error".to_string()));
        FxError::Api(kind)
    }
}

/// Classify an HTTP response into a payload or a typed failure.
///
/// A structured error payload wins over the HTTP status, so an `invalid-key`
/// reply sent with 403 is still reported as `FxError::Api`. `expected_field`
/// names the field a success body must carry and is used when the body is
/// not JSON at all.
pub fn interpret_response(status: u16, body: &str, expected_field: &str) -> FxResult<ApiPayload> {
    let parsed = serde_json::from_str::<ApiPayload>(body);

    if let Ok(payload) = &parsed {
        if payload.is_error() {
            return Err(payload.api_error());
        }
    }

    if !(200..300).contains(&status) {
        return Err(FxError::Protocol {
            status,
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        });
    }

    parsed.map_err(|_| FxError::MissingData {
        field: expected_field.to_string(),
    })
}

/// Extract the pair rate from an interpreted payload.
pub fn pair_rate_from(payload: ApiPayload) -> FxResult<Decimal> {
    payload.conversion_rate.ok_or_else(|| FxError::MissingData {
        field: "conversion_rate".to_string(),
    })
}

/// Extract the rate table from an interpreted payload.
///
/// Entries whose code or rate does not parse are dropped; the caller sees
/// them as unavailable.
pub fn rate_table_from(base: &CurrencyCode, payload: ApiPayload) -> FxResult<RateTable> {
    let raw = payload.conversion_rates.ok_or_else(|| FxError::MissingData {
        field: "conversion_rates".to_string(),
    })?;

    let rates = raw.into_iter().filter_map(|(code, value)| {
        let parsed = match CurrencyCode::parse(&code) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(code = %code, error = %e, "Skipping unparseable currency in rate table");
                return None;
            }
        };

        match serde_json::from_value::<Decimal>(value) {
            Ok(rate) => Some((parsed, rate)),
            Err(e) => {
                warn!(code = %code, error = %e, "Skipping unusable rate in rate table");
                None
            }
        }
    });

    Ok(RateTable::new(base.clone(), rates))
}

/// Rate source backed by exchangerate-api.com.
///
/// # Example
///
/// ```ignore
/// use cambio_fx::{ExchangeRateApiClient, ExchangeRateApiConfig};
///
/// let client = ExchangeRateApiClient::new(
///     ExchangeRateApiConfig::default().with_api_key("your_api_key"),
/// );
/// ```
pub struct ExchangeRateApiClient {
    client: Client,
    config: ExchangeRateApiConfig,
}

impl ExchangeRateApiClient {
    /// Create a new client. A missing key is only reported when a fetch is attempted.
    pub fn new(config: ExchangeRateApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("cambio/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "HTTP client setup failed; requests will run without a timeout");
                Client::new()
            });

        Self { client, config }
    }

    /// Whether a non-blank API key was supplied.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    fn api_key(&self) -> FxResult<&str> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(FxError::NotConfigured),
        }
    }

    fn endpoint(&self, key: &str, path: &[&str]) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            key,
            path.join("/")
        )
    }

    /// Perform one GET and classify the response.
    async fn get_payload(&self, path: &[&str], expected_field: &str) -> FxResult<ApiPayload> {
        let key = self.api_key()?;
        let url = self.endpoint(key, path);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "Rate service responded");

        interpret_response(status, &body, expected_field)
    }
}

#[async_trait]
impl RateSource for ExchangeRateApiClient {
    fn name(&self) -> &str {
        SOURCE_ID
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn fetch_pair_rate(&self, pair: &RatePairKey) -> FxResult<Decimal> {
        let payload = self
            .get_payload(
                &["pair", pair.base.as_str(), pair.target.as_str()],
                "conversion_rate",
            )
            .await?;
        let rate = pair_rate_from(payload)?;

        info!(rate = %rate, "Fetched pair rate");
        Ok(rate)
    }

    #[instrument(skip(self), fields(base = %base))]
    async fn fetch_rate_table(&self, base: &CurrencyCode) -> FxResult<RateTable> {
        let payload = self
            .get_payload(&["latest", base.as_str()], "conversion_rates")
            .await?;
        let table = rate_table_from(base, payload)?;

        info!(currencies = table.len(), "Fetched rate table");
        Ok(table)
    }
}
