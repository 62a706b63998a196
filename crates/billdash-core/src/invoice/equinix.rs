//! Equinix-style colocation invoice parser.
//!
//! Equinix invoices list cross-connects as "Location: ... CID: ..." blocks
//! followed by their monthly charge, plus optional cabinet, power and
//! Internet Exchange port lines keyed by billing codes.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::invoice::{Invoice, LineItem, Vendor};

use super::id::IdGenerator;
use super::rules::patterns::*;
use super::rules::{first_match, parse_dot_decimal, ExtractionMatch, FieldExtractor, PriceExtractor, Strategy};

/// Marker after which Equinix appends an internal order reference to CIDs.
const CID_INTERNAL_MARKER: &str = "CC00001";

const INVOICE_NUMBER_STRATEGIES: [Strategy<String>; 2] = [
    Strategy::new("invoice_label", invoice_label),
    Strategy::new("account_number", account_number),
];

const TOTAL_STRATEGIES: [Strategy<Decimal>; 3] = [
    Strategy::new("grand_total", grand_total),
    Strategy::new("invoice_total_due", invoice_total_due),
    Strategy::new("total_charges", total_charges),
];

fn invoice_label(text: &str) -> Option<String> {
    EQ_INVOICE_LABEL.captures(text).map(|c| c[1].to_string())
}

fn account_number(text: &str) -> Option<String> {
    EQ_INVOICE_STANDALONE.find(text).map(|m| m.as_str().to_string())
}

fn grand_total(text: &str) -> Option<Decimal> {
    EQ_GRAND_TOTAL.captures(text).and_then(|c| parse_dot_decimal(&c[1]))
}

fn invoice_total_due(text: &str) -> Option<Decimal> {
    EQ_TOTAL_DUE.captures(text).and_then(|c| parse_dot_decimal(&c[1]))
}

fn total_charges(text: &str) -> Option<Decimal> {
    EQ_TOTAL_CHARGES.captures(text).and_then(|c| parse_dot_decimal(&c[1]))
}

/// A cross-connect block found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossConnect {
    /// Facility location code.
    pub location: String,
    /// Circuit identifier with internal suffixes removed.
    pub circuit_id: String,
}

/// Scans for every "Location: ... CID: ..." block, left to right.
///
/// Match positions end at the CID, not at the field that terminated it, so
/// the price that follows is still ahead of the match.
pub struct CrossConnectExtractor;

impl FieldExtractor for CrossConnectExtractor {
    type Output = ExtractionMatch<CrossConnect>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let Some(caps) = EQ_CROSS_CONNECT.captures_at(text, pos) else {
                break;
            };
            let (Some(whole), Some(location), Some(cid)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                break;
            };

            let mut circuit_id = cid.as_str();
            if let Some((head, _)) = circuit_id.split_once(CID_INTERNAL_MARKER) {
                circuit_id = head;
            }

            let connect = CrossConnect {
                location: location.as_str().trim().to_string(),
                circuit_id: circuit_id.trim().to_string(),
            };
            let source = &text[whole.start()..cid.end()];
            results.push(ExtractionMatch::new(connect, source).with_position(whole.start(), cid.end()));

            pos = cid.end().max(whole.start() + 1);
        }

        results
    }
}

/// Up to `chars` characters of `text` starting at byte offset `start`.
fn window(text: &str, start: usize, chars: usize) -> &str {
    let rest = text.get(start..).unwrap_or("");
    let end = rest
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    &rest[..end]
}

fn capture_trimmed(re: &regex::Regex, text: &str) -> Option<String> {
    re.captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

fn capture_price(re: &regex::Regex, text: &str) -> Decimal {
    re.captures(text)
        .and_then(|c| parse_dot_decimal(&c[1]))
        .unwrap_or(Decimal::ZERO)
}

/// Parser for Equinix-style invoices.
#[derive(Debug, Clone)]
pub struct EquinixParser {
    /// Characters searched after a CID for its price.
    lookahead: usize,
}

impl EquinixParser {
    pub fn new() -> Self {
        Self { lookahead: 100 }
    }

    /// Set how far past a CID the price may appear.
    pub fn with_lookahead(mut self, chars: usize) -> Self {
        self.lookahead = chars;
        self
    }

    pub fn extract_invoice_number(&self, text: &str) -> Option<String> {
        first_match(text, &INVOICE_NUMBER_STRATEGIES).map(|(strategy, id)| {
            debug!("Equinix invoice number {} via {}", id, strategy);
            id
        })
    }

    pub fn extract_total(&self, text: &str) -> Option<Decimal> {
        first_match(text, &TOTAL_STRATEGIES).map(|(strategy, total)| {
            debug!("Equinix total {} via {}", total, strategy);
            total
        })
    }

    fn cross_connects(&self, text: &str, invoice_id: &str) -> Vec<LineItem> {
        let prices = PriceExtractor::new();

        CrossConnectExtractor
            .extract_all(text)
            .into_iter()
            .enumerate()
            .map(|(i, found)| {
                let end = found.position.map(|(_, end)| end).unwrap_or(0);
                let unit_price = prices
                    .extract(window(text, end, self.lookahead))
                    .map(|m| m.value)
                    .unwrap_or(Decimal::ZERO);

                LineItem::single(
                    format!("XC-{}-{}", invoice_id, i + 1),
                    "Cross Connect - SM Fiber",
                    format!("{} ({})", found.value.circuit_id, found.value.location),
                    unit_price,
                )
            })
            .collect()
    }

    fn secure_cabinet(&self, text: &str, invoice_id: &str) -> Option<LineItem> {
        if !EQ_SECURE_CABINET.is_match(text) {
            return None;
        }
        let capacity = capture_trimmed(&EQ_CABINET_CAPACITY, text).unwrap_or_else(|| "Standard".to_string());
        Some(LineItem::single(
            format!("CAB-{}", invoice_id),
            "Space - Secure Cabinet",
            format!("Power: {}", capacity),
            capture_price(&EQ_CABINET_PRICE, text),
        ))
    }

    fn ac_power(&self, text: &str, invoice_id: &str) -> Option<LineItem> {
        if !EQ_AC_POWER.is_match(text) {
            return None;
        }
        Some(LineItem::single(
            format!("PWR-{}", invoice_id),
            "Power - AC Power",
            capture_trimmed(&EQ_POWER_CAPACITY, text).unwrap_or_default(),
            capture_price(&EQ_POWER_PRICE, text),
        ))
    }

    fn exchange_port(&self, text: &str, invoice_id: &str) -> Option<LineItem> {
        if !EQ_INTERNET_EXCHANGE.is_match(text) {
            return None;
        }
        let capacity = capture_trimmed(&EQ_IX_PORT, text).unwrap_or_else(|| "100G".to_string());

        let (quantity, unit_price) = match EQ_IX_CHARGE.captures(text) {
            Some(caps) => (
                caps[1].parse::<u32>().ok().filter(|q| *q > 0).unwrap_or(1),
                parse_dot_decimal(&caps[2]).unwrap_or(Decimal::ZERO),
            ),
            None => (1, Decimal::ZERO),
        };

        // Ports are billed per unit, so the line total is multiplied out.
        Some(LineItem::multiple(
            format!("IX-{}", invoice_id),
            format!("Equinix Internet Exchange - Port ({})", capacity),
            "Equinix IX",
            quantity,
            unit_price,
        ))
    }

    /// Extract every line item type; all of them may appear on one invoice.
    pub fn extract_line_items(&self, text: &str, invoice_id: &str, total: Decimal) -> Vec<LineItem> {
        let mut items = self.cross_connects(text, invoice_id);
        items.extend(self.secure_cabinet(text, invoice_id));
        items.extend(self.ac_power(text, invoice_id));
        items.extend(self.exchange_port(text, invoice_id));

        if items.is_empty() && total > Decimal::ZERO {
            debug!("No Equinix line items found, using consolidated item");
            items.push(LineItem::single(
                "GENERIC",
                "Equinix Monthly Services",
                "Consolidated Charges",
                total,
            ));
        }

        items
    }

    /// Parse Equinix invoice text.
    pub fn parse(&self, text: &str, ids: &dyn IdGenerator) -> Invoice {
        let id = self
            .extract_invoice_number(text)
            .unwrap_or_else(|| ids.fallback_id(Vendor::Equinix));
        let total = self.extract_total(text).unwrap_or(Decimal::ZERO);

        let mut invoice = Invoice::new(id, Vendor::Equinix);
        invoice.items = self.extract_line_items(text, &invoice.id, total);
        invoice.total_amount = total;
        invoice
    }
}

impl Default for EquinixParser {
    fn default() -> Self {
        Self::new()
    }
}
