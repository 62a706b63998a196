//! Orange-style IPL circuit invoice parser.
//!
//! Orange bills each invoice as a single circuit service, so the parser only
//! has to locate the invoice number, the amount and a description of the
//! circuit.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::invoice::{Invoice, LineItem, Vendor, DETAILS_NOT_FOUND};

use super::id::IdGenerator;
use super::rules::patterns::*;
use super::rules::{first_match, parse_comma_decimal, Strategy};

const INVOICE_NUMBER_STRATEGIES: [Strategy<String>; 2] = [
    Strategy::new("reference", reference),
    Strategy::new("invoice_number", invoice_number),
];

const TOTAL_STRATEGIES: [Strategy<Decimal>; 4] = [
    Strategy::new("ipl_line_item", ipl_line_item),
    Strategy::new("total_keyword", total_keyword),
    Strategy::new("amount_then_usd", amount_then_usd),
    Strategy::new("usd_then_amount", usd_then_amount),
];

fn reference(text: &str) -> Option<String> {
    OR_REFERENCE.captures(text).map(|c| c[1].to_string())
}

fn invoice_number(text: &str) -> Option<String> {
    OR_INVOICE_NUMBER.captures(text).map(|c| c[1].to_string())
}

fn capture_amount(re: &regex::Regex, text: &str) -> Option<Decimal> {
    re.captures(text).and_then(|c| parse_comma_decimal(&c[1]))
}

fn ipl_line_item(text: &str) -> Option<Decimal> {
    capture_amount(&OR_IPL_LINE, text)
}

fn total_keyword(text: &str) -> Option<Decimal> {
    OR_TOTAL_KEYWORDS.iter().find_map(|re| capture_amount(re, text))
}

fn amount_then_usd(text: &str) -> Option<Decimal> {
    capture_amount(&OR_AMOUNT_THEN_USD, text)
}

fn usd_then_amount(text: &str) -> Option<Decimal> {
    capture_amount(&OR_USD_THEN_AMOUNT, text)
}

/// Circuit description used for the single line item.
pub fn describe_service(text: &str) -> String {
    if text.to_lowercase().contains("closed") {
        return "IPL Essential - Contract Closed".to_string();
    }
    match OR_CAPACITY.captures(text) {
        // Orange abbreviates the unit in several ways ("Gbits/s", "Gbi"), always Gbps.
        Some(caps) => format!("IPL Essential - {} Gbps", &caps[1]),
        None => "IPL Essential Service".to_string(),
    }
}

/// "LD:" circuit reference, if present.
pub fn extract_ld_reference(text: &str) -> Option<String> {
    OR_LD_REFERENCE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parser for Orange-style invoices.
#[derive(Debug, Clone, Default)]
pub struct OrangeParser;

impl OrangeParser {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_invoice_number(&self, text: &str) -> Option<String> {
        first_match(text, &INVOICE_NUMBER_STRATEGIES).map(|(strategy, id)| {
            debug!("Orange invoice number {} via {}", id, strategy);
            id
        })
    }

    /// Invoice total together with the strategy that found it.
    pub fn extract_total_with_strategy(&self, text: &str) -> Option<(&'static str, Decimal)> {
        first_match(text, &TOTAL_STRATEGIES)
    }

    pub fn extract_total(&self, text: &str) -> Option<Decimal> {
        self.extract_total_with_strategy(text).map(|(strategy, total)| {
            debug!("Orange total {} via {}", total, strategy);
            total
        })
    }

    /// Parse Orange invoice text.
    pub fn parse(&self, text: &str, ids: &dyn IdGenerator) -> Invoice {
        let id = self
            .extract_invoice_number(text)
            .unwrap_or_else(|| ids.fallback_id(Vendor::Orange));
        let total = self.extract_total(text).unwrap_or(Decimal::ZERO);

        let details = format!(
            "LD: {}",
            extract_ld_reference(text).unwrap_or_else(|| DETAILS_NOT_FOUND.to_string())
        );

        let mut invoice = Invoice::new(id, Vendor::Orange);
        invoice.items.push(LineItem::single(
            format!("OR-{}-1", invoice.id),
            describe_service(text),
            details,
            total,
        ));
        invoice.total_amount = total;
        invoice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::id::FixedIdGenerator;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parse(text: &str) -> Invoice {
        OrangeParser::new().parse(text, &FixedIdGenerator("OR-TEST".to_string()))
    }

    #[test]
    fn test_invoice_number() {
        let parser = OrangeParser::new();
        assert_eq!(
            parser.extract_invoice_number("Invoice reference : 5210535475"),
            Some("5210535475".to_string())
        );
        assert_eq!(
            parser.extract_invoice_number("Invoice n°: 5210535759"),
            Some("5210535759".to_string())
        );
        assert_eq!(parse("nothing").id, "OR-TEST");
    }

    #[test]
    fn test_ipl_line_strategy_wins_over_keywords() {
        let text = "TOTAL 999.00 IPL Essential Link 20 Gbits/s USD 1 300.00";
        let parser = OrangeParser::new();

        assert_eq!(
            parser.extract_total_with_strategy(text),
            Some(("ipl_line_item", dec("1300.00")))
        );
    }

    #[test]
    fn test_ipl_line_skips_currency_code() {
        let text = "IPL Essential SINGAPORE USD LD020851 1 282,89";
        assert_eq!(OrangeParser::new().extract_total(text), Some(dec("1282.89")));
    }

    #[test]
    fn test_ipl_line_skips_numeric_code() {
        let text = "IPL Essential Link 20 Gbits/s USD 181 1 300,00 TOTAL 50,00";
        assert_eq!(
            OrangeParser::new().extract_total_with_strategy(text),
            Some(("ipl_line_item", dec("1300.00")))
        );
    }

    #[test]
    fn test_keyword_order() {
        let text = "TOTAL 10.00 total invoiced amount USD 1 282,89";
        assert_eq!(
            OrangeParser::new().extract_total_with_strategy(text),
            Some(("total_keyword", dec("1282.89")))
        );
    }

    #[test]
    fn test_keyword_skips_reference_prefix() {
        let text = "amount due before 17/12 181 1 300,00";
        assert_eq!(OrangeParser::new().extract_total(text), Some(dec("1300.00")));
    }

    #[test]
    fn test_usd_suffix_and_prefix_strategies() {
        let parser = OrangeParser::new();
        assert_eq!(
            parser.extract_total_with_strategy("charge 1 300,00 USD"),
            Some(("amount_then_usd", dec("1300.00")))
        );
        assert_eq!(
            parser.extract_total_with_strategy("charge USD 450.10"),
            Some(("usd_then_amount", dec("450.10")))
        );
    }

    #[test]
    fn test_zero_amount_falls_through() {
        let text = "IPL Essential USD 0,00 then 1 282,89 USD";
        assert_eq!(
            OrangeParser::new().extract_total_with_strategy(text),
            Some(("amount_then_usd", dec("1282.89")))
        );
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(describe_service("Contract 2023-0461 CLOSED"), "IPL Essential - Contract Closed");
        assert_eq!(
            describe_service("Link 20 Gbits/s SINGAPORE contract closed"),
            "IPL Essential - Contract Closed"
        );
        assert_eq!(describe_service("Link 20 Gbits/s"), "IPL Essential - 20 Gbps");
        assert_eq!(describe_service("capacity 10Gb"), "IPL Essential - 10 Gbps");
        assert_eq!(describe_service("IPL"), "IPL Essential Service");
    }

    #[test]
    fn test_ld_reference() {
        assert_eq!(
            extract_ld_reference("LD: LD020851 LD020852 city SINGAPORE"),
            Some("LD020851".to_string())
        );
        assert_eq!(
            extract_ld_reference("circuit LD : LD020856 855 MONTHLY FEE"),
            Some("LD020856 855".to_string())
        );
        assert_eq!(extract_ld_reference("LD: LD020851"), Some("LD020851".to_string()));
        assert_eq!(extract_ld_reference("no reference"), None);
    }

    #[test]
    fn test_single_item_mirrors_total() {
        let text = "Invoice reference: 5210535475 IPL Essential Link 20 Gbits/s \
                    LD: LD020851 city SINGAPORE USD 1 300.00";
        let invoice = parse(text);

        assert_eq!(invoice.id, "5210535475");
        assert_eq!(invoice.vendor, Vendor::Orange);
        assert_eq!(invoice.total_amount, dec("1300.00"));
        assert_eq!(invoice.items.len(), 1);

        let item = &invoice.items[0];
        assert_eq!(item.id, "OR-5210535475-1");
        assert_eq!(item.description, "IPL Essential - 20 Gbps");
        assert_eq!(item.details, "LD: LD020851");
        assert_eq!(item.total_price, dec("1300.00"));
    }

    #[test]
    fn test_placeholder_details() {
        let invoice = parse("IPL Essential USD 1 300.00");
        assert_eq!(invoice.items[0].details, "LD: Details not found in PDF");
        assert_eq!(invoice.items[0].description, "IPL Essential Service");
    }
}
