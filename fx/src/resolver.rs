//! Rate resolution: cache first, then the rate source, with inverse fallback.

use std::sync::Arc;

use cambio_common::{CurrencyCode, RatePairKey};
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheStats, RateCache, RateCacheConfig, SharedRateCache};
use crate::config::ResolverConfig;
use crate::conversion::{
    ConversionEngine, ConversionRequest, ConversionResult, Direction, ResolutionPath, ResolvedRate,
};
use crate::error::FxResult;
use crate::source::{RateSource, RateTable};

/// Resolves rates for currency pairs.
///
/// Forward lookups never fall back. Inverse lookups prefer a directly quoted
/// reverse rate and only derive `1 / forward` when that quote is unavailable,
/// since services quote the two directions asymmetrically.
pub struct RateResolver {
    source: Arc<dyn RateSource>,
    cache: SharedRateCache,
    config: ResolverConfig,
}

impl RateResolver {
    /// Create a resolver with its own cache.
    pub fn new(source: Arc<dyn RateSource>, config: ResolverConfig) -> Self {
        let cache = RateCache::with_config(RateCacheConfig {
            default_ttl: config.ttl,
            ..Default::default()
        });
        Self::with_cache(source, Arc::new(cache), config)
    }

    /// Create a resolver over an existing (possibly shared) cache.
    pub fn with_cache(source: Arc<dyn RateSource>, cache: SharedRateCache, config: ResolverConfig) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    /// Resolve the rate for `pair` in the given direction.
    ///
    /// For `Direction::Inverse` the returned rate converts `pair.target ->
    /// pair.base`.
    #[instrument(skip(self), fields(pair = %pair, source = self.source.name()))]
    pub async fn resolve(&self, pair: &RatePairKey, direction: Direction) -> FxResult<ResolvedRate> {
        match direction {
            Direction::Forward => self.resolve_forward(pair).await,
            Direction::Inverse => self.resolve_inverse(pair).await,
        }
    }

    /// Resolve a rate and apply it to the request amount.
    #[instrument(skip(self, request), fields(
        pair = %request.pair,
        direction = ?request.direction,
        amount = %request.amount
    ))]
    pub async fn convert(&self, request: ConversionRequest) -> FxResult<ConversionResult> {
        let resolved = self.resolve(&request.pair, request.direction).await?;
        let result = ConversionResult::from_resolved(&request, resolved)?;

        info!(
            conversion_id = %result.id,
            rate = %result.effective_rate,
            path = %result.resolution_path,
            "Conversion completed"
        );

        Ok(result)
    }

    /// Fetch every rate quoted for `base`. Tables bypass the cache.
    pub async fn fetch_table(&self, base: &CurrencyCode) -> FxResult<RateTable> {
        self.source.fetch_rate_table(base).await
    }

    /// Cache lookup, then a direct fetch that fills the cache.
    async fn resolve_forward(&self, pair: &RatePairKey) -> FxResult<ResolvedRate> {
        if self.config.use_cache {
            if let Some(rate) = self.cache.get(pair) {
                debug!(pair = %pair, "Using cached rate");
                return Ok(ResolvedRate::new(rate, ResolutionPath::Cached));
            }
        }

        let rate = self.source.fetch_pair_rate(pair).await?;

        if self.config.use_cache {
            self.cache.put(pair.clone(), rate, self.config.ttl);
        }

        Ok(ResolvedRate::new(rate, ResolutionPath::FetchedDirect))
    }

    async fn resolve_inverse(&self, pair: &RatePairKey) -> FxResult<ResolvedRate> {
        let reversed = pair.reversed();

        let direct_error = match self.resolve_forward(&reversed).await {
            Ok(resolved) => return Ok(resolved),
            Err(e) => e,
        };

        warn!(
            pair = %reversed,
            error = %direct_error,
            "Direct reverse quote unavailable, deriving inverse"
        );

        let forward = self.resolve_forward(pair).await?;
        let rate = ConversionEngine::invert(pair, forward.rate)?;

        Ok(ResolvedRate::new(rate, ResolutionPath::FetchedInverseDerived))
    }

    /// The cache backing this resolver.
    pub fn cache(&self) -> &SharedRateCache {
        &self.cache
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
