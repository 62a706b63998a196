//! Amount parsing for vendor invoices.
//!
//! Equinix prints dot-decimal amounts with comma thousands separators
//! ("7,662.08"); Orange prints space-grouped amounts with either a comma or
//! a dot decimal separator ("1 300,00"). Both parsers reject anything that
//! is not a positive number so callers can move on to their next strategy.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::EQ_PRICE;
use super::{ExtractionMatch, FieldExtractor};

/// Price field extractor for dot-decimal amounts.
pub struct PriceExtractor;

impl PriceExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PriceExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        EQ_PRICE
            .find_iter(text)
            .filter_map(|m| {
                parse_dot_decimal(m.as_str()).map(|amount| {
                    ExtractionMatch::new(amount, m.as_str()).with_position(m.start(), m.end())
                })
            })
            .collect()
    }
}

/// Parse a dot-decimal amount, stripping comma thousands separators.
pub fn parse_dot_decimal(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    positive(&cleaned)
}

/// Parse a space-grouped amount whose decimal separator may be a comma.
pub fn parse_comma_decimal(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    positive(&cleaned)
}

fn positive(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .ok()
        .filter(|d| d.is_sign_positive() && !d.is_zero())
        .map(|d| d.round_dp(2))
}

/// Format amount with comma thousands separators (7,662.08).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.round_dp(2));
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return s.to_string();
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}{}.{}", sign, formatted, decimal_part)
}
