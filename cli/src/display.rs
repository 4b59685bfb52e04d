//! Terminal formatting for conversion results.

use cambio_common::CurrencyCode;
use cambio_fx::ConversionResult;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a monetary amount with two decimals and thousands separators
/// (`1234.5` -> `1,234.50`).
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Format a rate with six decimals.
pub fn format_rate(rate: Decimal) -> String {
    format!("{:.6}", rate)
}

/// One-line summary of a conversion, e.g.
/// `100.00 USD = 91.23 EUR (rate=0.912300, fetched)`.
pub fn conversion_line(result: &ConversionResult) -> String {
    format!(
        "{} {} = {} {} (rate={}, {})",
        format_amount(result.input_amount),
        result.from,
        format_amount(result.output_amount),
        result.to,
        format_rate(result.effective_rate),
        result.resolution_path
    )
}

/// One line of a filtered rate table.
pub fn table_line(code: &CurrencyCode, rate: Option<Decimal>) -> String {
    match rate {
        Some(rate) => format!("{}: {}", code, format_rate(rate)),
        None => format!("{}: (unavailable)", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cambio_common::RatePairKey;
    use cambio_fx::{ConversionRequest, ResolutionPath, ResolvedRate};
    use rust_decimal_macros::dec;

    fn result(request: ConversionRequest, rate: Decimal, path: ResolutionPath) -> ConversionResult {
        ConversionResult::from_resolved(&request, ResolvedRate::new(rate, path)).unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(91.23)), "91.23");
        assert_eq!(format_amount(dec!(1234.5)), "1,234.50");
        assert_eq!(format_amount(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_amount(dec!(100.005)), "100.01");
        assert_eq!(format_amount(dec!(-1500)), "-1,500.00");
    }

    #[test]
    fn test_table_line() {
        assert_eq!(table_line(&CurrencyCode::eur(), Some(dec!(0.92))), "EUR: 0.920000");
        assert_eq!(table_line(&CurrencyCode::jpy(), None), "JPY: (unavailable)");
    }

    #[test]
    fn test_conversion_line() {
        let usd_eur = RatePairKey::parse("USD", "EUR").unwrap();

        let forward = result(
            ConversionRequest::new(usd_eur.clone(), dec!(100)),
            dec!(0.9123),
            ResolutionPath::FetchedDirect,
        );
        assert_eq!(
            conversion_line(&forward),
            "100.00 USD = 91.23 EUR (rate=0.912300, fetched)"
        );

        let inverse = result(
            ConversionRequest::new(usd_eur, dec!(1000)).inverse(),
            dec!(1.25),
            ResolutionPath::FetchedInverseDerived,
        );
        assert_eq!(
            conversion_line(&inverse),
            "1,000.00 EUR = 1,250.00 USD (rate=1.250000, derived inverse)"
        );
    }
}
