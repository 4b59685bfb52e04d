//! Built-in currency lists.

use cambio_common::{CurrencyCode, RatePairKey};

/// Pairs offered by `cambio quick`, numbered from 1.
pub const QUICK_PAIRS: &[(&str, &str)] = &[
    ("USD", "EUR"),
    ("USD", "GBP"),
    ("USD", "JPY"),
    ("USD", "MXN"),
    ("USD", "COP"),
    ("USD", "CRC"),
    ("EUR", "GBP"),
    ("EUR", "JPY"),
];

/// Currencies shown by `cambio rates` and `cambio currencies`.
pub const RECOMMENDED: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "MXN", "CRC", "COP", "BRL", "ARS", "CLP",
];

/// Look up a quick pair by its 1-based menu number.
pub fn quick_pair(index: usize) -> Option<RatePairKey> {
    let (base, target) = QUICK_PAIRS.get(index.checked_sub(1)?)?;
    RatePairKey::parse(base, target).ok()
}

pub fn recommended() -> Vec<CurrencyCode> {
    RECOMMENDED
        .iter()
        .filter_map(|code| CurrencyCode::parse(code).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_pair_numbering() {
        assert_eq!(quick_pair(1), Some(RatePairKey::parse("USD", "EUR").unwrap()));
        assert_eq!(quick_pair(8), Some(RatePairKey::parse("EUR", "JPY").unwrap()));
        assert_eq!(quick_pair(0), None);
        assert_eq!(quick_pair(9), None);
    }

    #[test]
    fn test_recommended_all_parse() {
        assert_eq!(recommended().len(), RECOMMENDED.len());
    }
}
