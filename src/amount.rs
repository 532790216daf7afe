//! Amount field formatting.
//!
//! Converts between what the user types into an amount field and the
//! grouped display string shown back to them. Input is never rejected here:
//! anything that does not read as a number degrades to an empty string and
//! is caught later by form validation.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::decimal::Money;

/// most fraction digits ever rendered (one minor unit)
pub const MAX_FRACTION_DIGITS: usize = 2;

const GROUP_SEPARATOR: char = ',';
const DECIMAL_POINT: char = '.';

/// digits pulled out of free-form input
struct NumericInput {
    integer: String,
    fraction: String,
    has_point: bool,
}

impl NumericInput {
    /// keep digits and the first decimal point; later points are dropped
    fn scan(raw: &str) -> Option<Self> {
        let mut integer = String::new();
        let mut fraction = String::new();
        let mut has_point = false;

        for c in raw.chars() {
            match c {
                '0'..='9' if has_point => fraction.push(c),
                '0'..='9' => integer.push(c),
                DECIMAL_POINT => has_point = true,
                _ => {}
            }
        }

        if integer.is_empty() && fraction.is_empty() {
            return None;
        }

        Some(Self {
            integer,
            fraction,
            has_point,
        })
    }

    /// value rounded to minor units; a typed fraction always shows two digits
    fn value(&self) -> Option<Decimal> {
        let digits = if self.fraction.is_empty() {
            0
        } else {
            MAX_FRACTION_DIGITS as u32
        };
        let integer = if self.integer.is_empty() { "0" } else { &self.integer };
        let text = if self.fraction.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, self.fraction)
        };

        let mut value = Decimal::from_str(&text)
            .ok()?
            .round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(digits);
        Some(value)
    }

    /// typed a point with nothing after it yet
    fn ends_with_point(&self) -> bool {
        self.has_point && self.fraction.is_empty()
    }
}

/// render a raw amount with thousands separators
///
/// `"1234567.891"` becomes `"1,234,567.89"`, `"12."` stays `"12."` so the
/// field does not jump while typing, and `""` or `"abc"` become `""`.
pub fn format(raw: &str) -> String {
    let Some(input) = NumericInput::scan(raw) else {
        return String::new();
    };
    let Some(value) = input.value() else {
        return String::new();
    };

    let mut formatted = group(&value.to_string());
    if input.ends_with_point() {
        formatted.push(DECIMAL_POINT);
    }
    formatted
}

/// strip separators and return the raw numeric string
///
/// Inverse of [`format`]: `parse(format(x)) == parse(x)` for any numeric `x`.
pub fn parse(display: &str) -> String {
    normalize(display)
}

/// canonical raw form: no leading zeros, no fraction or exactly two rounded
/// fraction digits, no trailing point, no grouping
pub fn normalize(raw: &str) -> String {
    NumericInput::scan(raw)
        .and_then(|input| input.value())
        .map(|value| value.to_string())
        .unwrap_or_default()
}

/// parse a display amount straight into money
pub fn parse_money(display: &str) -> Option<Money> {
    let raw = parse(display);
    if raw.is_empty() {
        return None;
    }
    Money::from_str_exact(&raw).ok()
}

/// insert group separators into the integer part of a plain decimal string
fn group(plain: &str) -> String {
    let (integer, fraction) = match plain.split_once(DECIMAL_POINT) {
        Some((i, f)) => (i, Some(f)),
        None => (plain, None),
    };

    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3 + 4);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(c);
    }

    if let Some(fraction) = fraction {
        out.push(DECIMAL_POINT);
        out.push_str(fraction);
    }
    out
}
