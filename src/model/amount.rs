//! Amount type for monetary values held as integer cents.
//!
//! This module provides the `Amount` type which wraps an `i64` minor-unit
//! (cents) value, the canonical representation used for storage and
//! arithmetic. Raw user input is converted with `Amount::parse`, and display
//! formatting uses a space as the thousands separator and a comma as the
//! decimal separator.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Ceiling for a single transaction, in cents. Protects against fat-finger
/// entries; amounts with a larger magnitude never validate.
pub const MAX_ALLOWED_CENTS: i64 = 10_000_000;

/// Represents a monetary amount in integer cents.
///
/// Positive amounts increase a customer's debt (a purchase), negative amounts
/// decrease it (a payment). Zero is representable but never valid to persist.
///
/// # Examples
///
/// ```
/// # use cashd::model::Amount;
/// let amount = Amount::from_cents(123456);
/// assert_eq!(amount.to_string(), "1 234,56");
///
/// let parsed = Amount::parse("1234,56");
/// assert_eq!(parsed.amount(), amount);
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount {
    cents: i64,
}

/// The validation state of a typed amount, used by a presentation layer to
/// enable or disable its submit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountStatus {
    /// Nothing typed yet (or only ignored characters).
    Empty,
    /// Non-numeric input, a zero amount, or a magnitude over the ceiling.
    Invalid,
    /// Ready to persist.
    Valid,
}

serde_plain::derive_display_from_serialize!(AmountStatus);
serde_plain::derive_fromstr_from_deserialize!(AmountStatus);

/// The result of parsing raw user input: the amount that could be extracted
/// (zero when nothing could) paired with its validation status. Parsing never
/// fails; callers must check the status before persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAmount {
    amount: Amount,
    status: AmountStatus,
}

impl ParsedAmount {
    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn status(&self) -> AmountStatus {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == AmountStatus::Valid
    }
}

impl Amount {
    pub const ZERO: Amount = Amount { cents: 0 };

    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// The underlying value in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// True when the amount can be persisted: non-zero and within the
    /// `MAX_ALLOWED_CENTS` ceiling in magnitude.
    pub fn is_valid(&self) -> bool {
        self.cents != 0 && self.cents.abs() <= MAX_ALLOWED_CENTS
    }

    /// Converts raw keystroke input into cents.
    ///
    /// All characters outside `[0-9,\-]` are stripped (so `"R$ 1.234,56"`
    /// parses the same as `"1234,56"`), the first comma becomes the decimal
    /// point, and the result is multiplied by 100 and rounded half-up (ties
    /// away from zero). Input that still fails to parse yields a zero amount
    /// with `AmountStatus::Invalid` rather than an error.
    pub fn parse(input: &str) -> ParsedAmount {
        if input.trim().is_empty() {
            return ParsedAmount {
                amount: Amount::ZERO,
                status: AmountStatus::Empty,
            };
        }

        let invalid = ParsedAmount {
            amount: Amount::ZERO,
            status: AmountStatus::Invalid,
        };

        let stripped: String = input
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '-')
            .collect();
        if stripped.is_empty() {
            return invalid;
        }

        // Only the first comma is the decimal separator. A second comma (or a
        // misplaced minus sign) makes the decimal parse fail below.
        let normalized = stripped.replacen(',', ".", 1);
        let value = match Decimal::from_str(&normalized) {
            Ok(value) => value,
            Err(_) => return invalid,
        };

        let cents = (value * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let amount = match cents.to_i64() {
            Some(cents) => Amount::from_cents(cents),
            None => return invalid,
        };

        ParsedAmount {
            status: if amount.is_valid() {
                AmountStatus::Valid
            } else {
                AmountStatus::Invalid
            },
            amount,
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let abs = self.cents.unsigned_abs();
        let whole = (abs / 100).to_string();
        let frac = abs % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (ix, digit) in whole.chars().enumerate() {
            if ix > 0 && (whole.len() - ix) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(digit);
        }

        let sign = if self.cents < 0 { "-" } else { "" };
        write!(f, "{sign}{grouped},{frac:02}")
    }
}

impl From<i64> for Amount {
    fn from(cents: i64) -> Self {
        Amount::from_cents(cents)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.cents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_comma() {
        let parsed = Amount::parse("1234,56");
        assert_eq!(parsed.amount().cents(), 123456);
        assert_eq!(parsed.status(), AmountStatus::Valid);
    }

    #[test]
    fn test_parse_negative_short_fraction() {
        let parsed = Amount::parse("-50,5");
        assert_eq!(parsed.amount().cents(), -5050);
        assert_eq!(parsed.status(), AmountStatus::Valid);
    }

    #[test]
    fn test_parse_integer_is_whole_currency_units() {
        let parsed = Amount::parse("100");
        assert_eq!(parsed.amount().cents(), 10000);
        assert_eq!(parsed.status(), AmountStatus::Valid);
    }

    #[test]
    fn test_parse_strips_decorations() {
        let parsed = Amount::parse("R$ 1.234,56");
        assert_eq!(parsed.amount().cents(), 123456);
        assert_eq!(parsed.status(), AmountStatus::Valid);
    }

    #[test]
    fn test_parse_garbage_is_invalid_zero() {
        let parsed = Amount::parse("abc");
        assert_eq!(parsed.amount().cents(), 0);
        assert_eq!(parsed.status(), AmountStatus::Invalid);

        // Digits mixed with a misplaced minus sign survive stripping but
        // fail the decimal parse.
        let parsed = Amount::parse("5-0");
        assert_eq!(parsed.amount().cents(), 0);
        assert_eq!(parsed.status(), AmountStatus::Invalid);
    }

    #[test]
    fn test_parse_empty_input() {
        let parsed = Amount::parse("");
        assert_eq!(parsed.amount(), Amount::ZERO);
        assert_eq!(parsed.status(), AmountStatus::Empty);

        let parsed = Amount::parse("   ");
        assert_eq!(parsed.status(), AmountStatus::Empty);
    }

    #[test]
    fn test_parse_second_comma_is_invalid() {
        let parsed = Amount::parse("1,2,3");
        assert_eq!(parsed.amount().cents(), 0);
        assert_eq!(parsed.status(), AmountStatus::Invalid);
    }

    #[test]
    fn test_parse_zero_is_invalid() {
        let parsed = Amount::parse("0");
        assert_eq!(parsed.amount().cents(), 0);
        assert_eq!(parsed.status(), AmountStatus::Invalid);

        let parsed = Amount::parse("0,00");
        assert_eq!(parsed.status(), AmountStatus::Invalid);
    }

    #[test]
    fn test_parse_over_ceiling_is_invalid() {
        // 200 000,00 in currency units is 20 000 000 cents.
        let parsed = Amount::parse("200000,00");
        assert_eq!(parsed.amount().cents(), 20_000_000);
        assert_eq!(parsed.status(), AmountStatus::Invalid);
    }

    #[test]
    fn test_parse_rounds_half_up() {
        assert_eq!(Amount::parse("0,005").amount().cents(), 1);
        assert_eq!(Amount::parse("0,004").amount().cents(), 0);
        assert_eq!(Amount::parse("-0,005").amount().cents(), -1);
        assert_eq!(Amount::parse("12,345").amount().cents(), 1235);
    }

    #[test]
    fn test_is_valid_bounds() {
        assert!(Amount::from_cents(1).is_valid());
        assert!(Amount::from_cents(-1).is_valid());
        assert!(Amount::from_cents(MAX_ALLOWED_CENTS).is_valid());
        assert!(Amount::from_cents(-MAX_ALLOWED_CENTS).is_valid());
        assert!(!Amount::from_cents(0).is_valid());
        assert!(!Amount::from_cents(MAX_ALLOWED_CENTS + 1).is_valid());
        assert!(!Amount::from_cents(-(MAX_ALLOWED_CENTS + 1)).is_valid());
    }

    #[test]
    fn test_display_thousands_grouping() {
        assert_eq!(Amount::from_cents(123456).to_string(), "1 234,56");
        assert_eq!(Amount::from_cents(100000000).to_string(), "1 000 000,00");
        assert_eq!(Amount::from_cents(99).to_string(), "0,99");
        assert_eq!(Amount::from_cents(0).to_string(), "0,00");
    }

    #[test]
    fn test_display_negative_leading_minus() {
        assert_eq!(Amount::from_cents(-550).to_string(), "-5,50");
        assert_eq!(Amount::from_cents(-123456).to_string(), "-1 234,56");
    }

    #[test]
    fn test_round_trip() {
        for cents in [1, -1, 99, 100, -550, 123456, -123456, MAX_ALLOWED_CENTS] {
            let amount = Amount::from_cents(cents);
            let parsed = Amount::parse(&amount.to_string());
            assert_eq!(parsed.amount(), amount, "round trip failed for {cents}");
            assert_eq!(parsed.status(), AmountStatus::Valid);
        }
    }

    #[test]
    fn test_serialize_as_cents() {
        let json = serde_json::to_string(&Amount::from_cents(-550)).unwrap();
        assert_eq!(json, "-550");
        let amount: Amount = serde_json::from_str("123456").unwrap();
        assert_eq!(amount, Amount::from_cents(123456));
    }

    #[test]
    fn test_zero_is_not_positive_or_negative() {
        let zero = Amount::ZERO;
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(zero.is_zero());
    }
}
