//! Conversion between major currency units (as typed by people and sent by
//! donation platforms) and the integer minor units the goal is stored in.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::MINOR_UNITS_PER_MAJOR;
use crate::errors::{Result, ValidationError};

/// Parses a major-unit amount such as `"4.50"`.
///
/// Accepts plain decimals and scientific notation. Rejects empty input,
/// non-numeric text (including `NaN`/`inf`) and negative values.
pub fn parse_major_units(raw: &str, field_name: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field_name.to_string()).into());
    }

    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| {
            ValidationError::InvalidInput(format!("'{}' is not a decimal number", field_name))
        })?;

    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(field_name.to_string()).into());
    }
    Ok(amount)
}

/// Converts a major-unit amount to minor units, rounding half-up.
///
/// `4.999` becomes `500`, `0.005` becomes `1`, `0.004` becomes `0`.
pub fn to_minor_units(amount: Decimal, field_name: &str) -> Result<i64> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(field_name.to_string()).into());
    }

    amount
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or_else(|| ValidationError::AmountOutOfRange(field_name.to_string()).into())
}

/// Parses a major-unit string and converts it to minor units in one step.
pub fn major_str_to_minor_units(raw: &str, field_name: &str) -> Result<i64> {
    let amount = parse_major_units(raw, field_name)?;
    to_minor_units(amount, field_name)
}

/// Renders minor units back as a major-unit decimal with two places.
pub fn minor_units_to_major(minor_units: i64) -> Decimal {
    Decimal::new(minor_units, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_to_nearest_cent() {
        assert_eq!(to_minor_units(dec!(4.999), "amount").unwrap(), 500);
        assert_eq!(to_minor_units(dec!(4.50), "amount").unwrap(), 450);
        assert_eq!(to_minor_units(dec!(0.005), "amount").unwrap(), 1);
        assert_eq!(to_minor_units(dec!(0.004), "amount").unwrap(), 0);
        assert_eq!(to_minor_units(dec!(2.345), "amount").unwrap(), 235);
        assert_eq!(to_minor_units(dec!(0), "amount").unwrap(), 0);
    }

    #[test]
    fn parses_plain_and_scientific_strings() {
        assert_eq!(major_str_to_minor_units("4.999", "amount").unwrap(), 500);
        assert_eq!(major_str_to_minor_units(" 12 ", "amount").unwrap(), 1200);
        assert_eq!(major_str_to_minor_units("1.5e1", "amount").unwrap(), 1500);
    }

    #[test]
    fn rejects_negative_amounts() {
        let err = major_str_to_minor_units("-1.00", "amount").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::NegativeAmount(ref field)) if field == "amount"
        ));
    }

    #[test]
    fn rejects_non_numeric_and_empty_input() {
        for raw in ["abc", "NaN", "inf", "4,50"] {
            let err = major_str_to_minor_units(raw, "amount").unwrap_err();
            assert!(
                matches!(err, Error::Validation(ValidationError::InvalidInput(_))),
                "expected invalid input for {raw:?}"
            );
        }

        let err = major_str_to_minor_units("   ", "secondHalfAmount").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(ref field)) if field == "secondHalfAmount"
        ));
    }

    #[test]
    fn rejects_amounts_beyond_i64() {
        let err = to_minor_units(Decimal::MAX, "amount").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::AmountOutOfRange(_))
        ));
    }

    #[test]
    fn renders_minor_units_as_major() {
        assert_eq!(minor_units_to_major(450), dec!(4.50));
        assert_eq!(minor_units_to_major(0), dec!(0.00));
    }
}
