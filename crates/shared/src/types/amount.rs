//! Fixed-point decimal wire format for balances and amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All decimal fields cross the API boundary as strings with exactly 18
//! fractional digits (e.g. `"100.000000000000000000"`), so clients can
//! parse them as exact decimals. This is a binding external contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};

/// Number of fractional digits in the wire format.
pub const WIRE_SCALE: u32 = 18;

/// Formats a decimal as a fixed-point string with 18 fractional digits.
#[must_use]
pub fn format_fixed(value: Decimal) -> String {
    let rescaled = value.round_dp(WIRE_SCALE);
    format!("{rescaled:.18}")
}

/// Serde adapter for `Decimal` fields using the fixed-point wire format.
///
/// Use with `#[serde(with = "walletd_shared::types::amount::fixed")]`.
pub mod fixed {
    use super::{Decimal, Deserialize, Deserializer, Serializer, format_fixed};

    /// Serializes a decimal as an 18-fractional-digit string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_fixed(*value))
    }

    /// Deserializes a decimal from its string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid decimal.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Decimal>().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), "0.000000000000000000")]
    #[case(dec!(100), "100.000000000000000000")]
    #[case(dec!(-0.5), "-0.500000000000000000")]
    #[case(dec!(1.000000000000000001), "1.000000000000000001")]
    #[case(dec!(42.10), "42.100000000000000000")]
    fn test_format_fixed(#[case] value: Decimal, #[case] expected: &str) {
        assert_eq!(format_fixed(value), expected);
    }

    #[test]
    fn test_format_fixed_always_has_18_fractional_digits() {
        for value in [dec!(0), dec!(1), dec!(-3.14), dec!(999999999999.123)] {
            let formatted = format_fixed(value);
            let (_, frac) = formatted.split_once('.').expect("missing decimal point");
            assert_eq!(frac.len(), 18, "bad wire format: {formatted}");
        }
    }

    #[test]
    fn test_wire_roundtrip_is_lossless() {
        let value = dec!(123456789.987654321012345678);
        let parsed: Decimal = format_fixed(value).parse().unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_serde_adapter() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Money {
            #[serde(with = "super::fixed")]
            value: Decimal,
        }

        let json = serde_json::to_string(&Money { value: dec!(7.5) }).unwrap();
        assert_eq!(json, r#"{"value":"7.500000000000000000"}"#);

        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.value, dec!(7.5));

        assert!(serde_json::from_str::<Money>(r#"{"value":"nope"}"#).is_err());
    }
}
