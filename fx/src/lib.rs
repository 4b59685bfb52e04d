//! Cambio FX Engine
//!
//! Exchange rate resolution and currency conversion for the cambio CLI.
//!
//! # Features
//!
//! - Rate cache keyed by ordered currency pair, with per-entry TTL
//! - exchangerate-api.com client with a typed failure taxonomy
//! - Forward and inverse resolution (direct reverse quote preferred over a
//!   derived reciprocal)
//! - Credential loading from the environment or a `.properties` file
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cambio_common::RatePairKey;
//! use cambio_fx::{
//!     ConversionRequest, ExchangeRateApiClient, ExchangeRateApiConfig, RateResolver,
//!     ResolverConfig,
//! };
//!
//! let client = ExchangeRateApiClient::new(ExchangeRateApiConfig::default().with_api_key(key));
//! let resolver = RateResolver::new(Arc::new(client), ResolverConfig::default());
//!
//! let pair = RatePairKey::parse("USD", "EUR")?;
//! let result = resolver.convert(ConversionRequest::new(pair, dec!(100))).await?;
//! ```

pub mod cache;
pub mod config;
pub mod conversion;
pub mod error;
pub mod exchangerate_api;
pub mod properties;
pub mod resolver;
pub mod source;

pub use cache::{RateCache, RateCacheConfig, SharedRateCache};
pub use config::{CredentialSource, ExchangeRateApiConfig, ResolverConfig};
pub use conversion::{
    ConversionEngine, ConversionRequest, ConversionResult, Direction, ResolutionPath, ResolvedRate,
};
pub use error::{ApiErrorKind, FxError, FxResult};
pub use exchangerate_api::ExchangeRateApiClient;
pub use resolver::RateResolver;
pub use source::{RateSource, RateTable};
