//! Rate source trait and rate tables.

use async_trait::async_trait;
use cambio_common::{CurrencyCode, RatePairKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::FxResult;

/// A remote service that quotes exchange rates.
///
/// Implementations make exactly one attempt per call; retry policy, if any,
/// belongs to the caller.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name (for logging).
    fn name(&self) -> &str;

    /// Get the direct conversion rate `pair.base -> pair.target`.
    async fn fetch_pair_rate(&self, pair: &RatePairKey) -> FxResult<Decimal>;

    /// Get every rate the service quotes relative to `base`.
    async fn fetch_rate_table(&self, base: &CurrencyCode) -> FxResult<RateTable>;
}

/// All rates quoted relative to one base currency.
///
/// Tables are transient: they are handed to the caller and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// The currency every rate is relative to.
    pub base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Create a table from already-normalized entries.
    pub fn new(base: CurrencyCode, rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>) -> Self {
        Self {
            base,
            rates: rates.into_iter().collect(),
        }
    }

    /// Rate for `code`, or `None` if the service did not quote it.
    pub fn get(&self, code: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Look up `codes` in the given order, marking absent ones as `None`.
    pub fn select<'a>(
        &self,
        codes: impl IntoIterator<Item = &'a CurrencyCode>,
    ) -> Vec<(CurrencyCode, Option<Decimal>)> {
        codes
            .into_iter()
            .map(|code| (code.clone(), self.get(code)))
            .collect()
    }
}

/// Scripted rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use crate::error::{ApiErrorKind, FxError};
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    enum MockReply {
        Rate(Decimal),
        Error(FxError),
    }

    /// Rate source that replies from scripted per-pair answers and counts calls.
    ///
    /// Unscripted pairs and bases fail with `ApiErrorKind::UnsupportedCode`.
    pub struct MockRateSource {
        name: String,
        pairs: DashMap<RatePairKey, MockReply>,
        tables: DashMap<CurrencyCode, RateTable>,
        pair_calls: DashMap<RatePairKey, usize>,
        total_calls: AtomicUsize,
    }

    impl MockRateSource {
        /// Create a new mock source.
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                pairs: DashMap::new(),
                tables: DashMap::new(),
                pair_calls: DashMap::new(),
                total_calls: AtomicUsize::new(0),
            }
        }

        /// Answer `pair` with `rate`.
        pub fn set_rate(&self, pair: RatePairKey, rate: Decimal) {
            self.pairs.insert(pair, MockReply::Rate(rate));
        }

        /// Answer `pair` with `error`.
        pub fn set_error(&self, pair: RatePairKey, error: FxError) {
            self.pairs.insert(pair, MockReply::Error(error));
        }

        /// Answer table requests for `table.base` with `table`.
        pub fn set_table(&self, table: RateTable) {
            self.tables.insert(table.base.clone(), table);
        }

        /// Number of fetches made for `pair`.
        pub fn calls_for(&self, pair: &RatePairKey) -> usize {
            self.pair_calls.get(pair).map(|c| *c).unwrap_or(0)
        }

        /// Number of fetches of any kind.
        pub fn total_calls(&self) -> usize {
            self.total_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for MockRateSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_pair_rate(&self, pair: &RatePairKey) -> FxResult<Decimal> {
            self.total_calls.fetch_add(1, Ordering::SeqCst);
            *self.pair_calls.entry(pair.clone()).or_insert(0) += 1;

            match self.pairs.get(pair).map(|r| r.clone()) {
                Some(MockReply::Rate(rate)) => Ok(rate),
                Some(MockReply::Error(e)) => Err(e),
                None => Err(FxError::Api(ApiErrorKind::UnsupportedCode)),
            }
        }

        async fn fetch_rate_table(&self, base: &CurrencyCode) -> FxResult<RateTable> {
            self.total_calls.fetch_add(1, Ordering::SeqCst);

            self.tables
                .get(base)
                .map(|t| t.clone())
                .ok_or(FxError::Api(ApiErrorKind::UnsupportedCode))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockRateSource;
    use super::*;
    use crate::error::{ApiErrorKind, FxError};
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_table_lookup_and_select() {
        let table = RateTable::new(
            CurrencyCode::usd(),
            vec![(code("EUR"), dec!(0.92)), (code("GBP"), dec!(0.79))],
        );

        assert_eq!(table.get(&code("eur")), Some(dec!(0.92)));
        assert_eq!(table.get(&code("JPY")), None);

        let wanted = [code("GBP"), code("JPY"), code("EUR")];
        let selected = table.select(&wanted);
        assert_eq!(
            selected,
            vec![
                (code("GBP"), Some(dec!(0.79))),
                (code("JPY"), None),
                (code("EUR"), Some(dec!(0.92))),
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_source() {
        let source = MockRateSource::new("test");
        let pair = RatePairKey::parse("USD", "EUR").unwrap();
        source.set_rate(pair.clone(), dec!(0.92));

        assert_eq!(source.fetch_pair_rate(&pair).await.unwrap(), dec!(0.92));
        assert_eq!(source.calls_for(&pair), 1);

        let missing = source.fetch_pair_rate(&pair.reversed()).await;
        assert!(matches!(
            missing,
            Err(FxError::Api(ApiErrorKind::UnsupportedCode))
        ));
        assert_eq!(source.total_calls(), 2);
    }
}
