//! Currency conversion types and arithmetic.

use cambio_common::{CurrencyCode, RatePairKey, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{FxError, FxResult};

/// Which way a conversion runs relative to the requested pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Convert `base -> target`.
    Forward,
    /// Convert `target -> base`.
    Inverse,
}

/// How a rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionPath {
    /// Served from the rate cache.
    Cached,
    /// Quoted directly by the rate source.
    FetchedDirect,
    /// Reciprocal of the quoted opposite pair.
    FetchedInverseDerived,
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPath::Cached => write!(f, "cached"),
            ResolutionPath::FetchedDirect => write!(f, "fetched"),
            ResolutionPath::FetchedInverseDerived => write!(f, "derived inverse"),
        }
    }
}

/// A rate together with how it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    pub rate: Decimal,
    pub path: ResolutionPath,
}

impl ResolvedRate {
    pub fn new(rate: Decimal, path: ResolutionPath) -> Self {
        Self { rate, path }
    }
}

/// Request to perform a conversion.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// The requested pair as the user named it.
    pub pair: RatePairKey,
    /// Amount to convert, in the "from" currency of `direction`.
    pub amount: Decimal,
    /// Whether to convert along the pair or against it.
    pub direction: Direction,
}

impl ConversionRequest {
    /// Create a forward conversion request.
    pub fn new(pair: RatePairKey, amount: Decimal) -> Self {
        Self {
            pair,
            amount,
            direction: Direction::Forward,
        }
    }

    /// Convert `target -> base` instead.
    pub fn inverse(mut self) -> Self {
        self.direction = Direction::Inverse;
        self
    }

    /// The pair actually being converted, from -> to.
    pub fn effective_pair(&self) -> RatePairKey {
        match self.direction {
            Direction::Forward => self.pair.clone(),
            Direction::Inverse => self.pair.reversed(),
        }
    }
}

/// Represents a completed currency conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Unique conversion ID.
    pub id: Uuid,
    /// Currency converted from.
    pub from: CurrencyCode,
    /// Currency converted to.
    pub to: CurrencyCode,
    /// Input amount.
    pub input_amount: Decimal,
    /// Output amount, unrounded.
    pub output_amount: Decimal,
    /// Rate applied (`from -> to`).
    pub effective_rate: Decimal,
    /// How the rate was obtained.
    pub resolution_path: ResolutionPath,
    /// When the conversion was executed.
    pub executed_at: Timestamp,
}

impl ConversionResult {
    /// Build a result for `request` from a resolved rate.
    pub fn from_resolved(request: &ConversionRequest, resolved: ResolvedRate) -> FxResult<Self> {
        let pair = request.effective_pair();
        let output_amount = ConversionEngine::apply(request.amount, resolved.rate)?;

        Ok(Self {
            id: Uuid::now_v7(),
            from: pair.base,
            to: pair.target,
            input_amount: request.amount,
            output_amount,
            effective_rate: resolved.rate,
            resolution_path: resolved.path,
            executed_at: cambio_common::time::now(),
        })
    }
}

/// Pure conversion arithmetic.
pub struct ConversionEngine;

impl ConversionEngine {
    /// Multiply `amount` by `rate`, unrounded.
    ///
    /// Real exchange rates are strictly positive; a non-positive rate is only
    /// accepted for a zero amount.
    pub fn apply(amount: Decimal, rate: Decimal) -> FxResult<Decimal> {
        if amount < Decimal::ZERO {
            return Err(FxError::InvalidAmount(amount));
        }

        if amount.is_zero() {
            return Ok(Decimal::ZERO);
        }

        if rate <= Decimal::ZERO {
            return Err(FxError::DataIntegrity(format!(
                "rate {} is not positive",
                rate
            )));
        }

        amount.checked_mul(rate).ok_or_else(|| {
            FxError::DataIntegrity(format!("{} x {} overflows", amount, rate))
        })
    }

    /// Reciprocal of the rate quoted for `pair`.
    pub fn invert(pair: &RatePairKey, rate: Decimal) -> FxResult<Decimal> {
        if rate.is_zero() {
            return Err(FxError::InverseUndefined(pair.clone()));
        }

        Decimal::ONE.checked_div(rate).ok_or_else(|| {
            FxError::DataIntegrity(format!("1 / {} is out of range", rate))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn pair() -> RatePairKey {
        RatePairKey::parse("USD", "EUR").unwrap()
    }

    #[test]
    fn test_apply() {
        let out = ConversionEngine::apply(dec!(100.0), dec!(0.92)).unwrap();
        assert!((out - dec!(92.0)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_apply_zero_amount_accepts_any_rate() {
        assert_eq!(ConversionEngine::apply(dec!(0), dec!(0)).unwrap(), dec!(0));
        assert_eq!(ConversionEngine::apply(dec!(0), dec!(-1)).unwrap(), dec!(0));
    }

    #[test]
    fn test_apply_rejects_non_positive_rate() {
        assert!(matches!(
            ConversionEngine::apply(dec!(10), dec!(0)),
            Err(FxError::DataIntegrity(_))
        ));
        assert!(matches!(
            ConversionEngine::apply(dec!(10), dec!(-0.5)),
            Err(FxError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_apply_rejects_negative_amount() {
        assert!(matches!(
            ConversionEngine::apply(dec!(-5), dec!(1.1)),
            Err(FxError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_invert() {
        assert_eq!(ConversionEngine::invert(&pair(), dec!(2.0)).unwrap(), dec!(0.5));
        assert!(matches!(
            ConversionEngine::invert(&pair(), dec!(0)),
            Err(FxError::InverseUndefined(p)) if p == pair()
        ));
    }

    #[test]
    fn test_result_uses_effective_pair() {
        let request = ConversionRequest::new(pair(), dec!(50)).inverse();
        let resolved = ResolvedRate::new(dec!(1.1), ResolutionPath::FetchedDirect);

        let result = ConversionResult::from_resolved(&request, resolved).unwrap();

        assert_eq!(result.from, CurrencyCode::eur());
        assert_eq!(result.to, CurrencyCode::usd());
        assert_eq!(result.output_amount, dec!(55.0));
        assert_eq!(result.effective_rate, dec!(1.1));
        assert_eq!(result.resolution_path, ResolutionPath::FetchedDirect);
    }

    proptest! {
        #[test]
        fn prop_apply_matches_product(cents in 0u64..10_000_000, micros in 1u64..100_000_000) {
            let amount = Decimal::new(cents as i64, 2);
            let rate = Decimal::new(micros as i64, 6);

            let out = ConversionEngine::apply(amount, rate).unwrap();
            prop_assert_eq!(out, amount * rate);
        }
    }
}
