use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::{CurrencyCode, CurrencyRegistry};

/// Decimal and grouping marks used when rendering a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// `1,234.50`
    DotDecimal,
    /// `1.234,50`
    CommaDecimal,
}

impl NumberStyle {
    pub fn decimal_separator(self) -> char {
        match self {
            NumberStyle::DotDecimal => '.',
            NumberStyle::CommaDecimal => ',',
        }
    }

    pub fn grouping_separator(self) -> char {
        match self {
            NumberStyle::DotDecimal => ',',
            NumberStyle::CommaDecimal => '.',
        }
    }
}

/// Renders a non-negative value with exactly `precision` fraction digits and
/// thousands grouping. Halves round away from zero.
pub fn format_number(style: NumberStyle, value: f64, precision: u8) -> String {
    let body = fixed_digits(value, precision);
    let (int_part, fraction) = match body.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (body.as_str(), None),
    };
    let mut out = group_digits(int_part, style.grouping_separator());
    if let Some(fraction) = fraction {
        out.push(style.decimal_separator());
        out.push_str(fraction);
    }
    out
}

/// Rounds the shortest decimal that reads back as `value`, so `1.005` rounds as
/// written instead of as its binary approximation `1.00499...`.
fn fixed_digits(value: f64, precision: u8) -> String {
    match Decimal::from_str(&value.to_string()) {
        Ok(decimal) => {
            let rounded = decimal
                .round_dp_with_strategy(u32::from(precision), RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", precision as usize, rounded)
        }
        // Out of `Decimal` range (or not finite).
        Err(_) => format!("{:.*}", precision as usize, value),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats amounts against the registry's display rules.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyFormatter<'a> {
    registry: &'a CurrencyRegistry,
    default_currency: &'a CurrencyCode,
}

impl<'a> CurrencyFormatter<'a> {
    pub fn new(registry: &'a CurrencyRegistry, default_currency: &'a CurrencyCode) -> Self {
        Self {
            registry,
            default_currency,
        }
    }

    pub fn format(&self, amount: f64, currency: &str) -> String {
        let rule = self.registry.lookup(currency);
        let number = format_number(rule.number_style(), amount.abs(), rule.decimal_digits);
        let body = if rule.symbol_is_suffix {
            format!("{} {}", number, rule.symbol)
        } else {
            format!("{}{}", rule.symbol, number)
        };
        if amount < 0.0 && number.chars().any(|ch| matches!(ch, '1'..='9')) {
            format!("-{}", body)
        } else {
            body
        }
    }

    /// Formats with the configured display currency.
    pub fn format_default(&self, amount: f64) -> String {
        self.format(amount, self.default_currency.as_str())
    }

    /// Converts then formats. `None` means the rate is zero and no converted value can be shown.
    pub fn format_converted(&self, amount: f64, rate: f64, currency: &str) -> Option<String> {
        if rate == 0.0 {
            return None;
        }
        Some(self.format(amount * rate, currency))
    }
}
