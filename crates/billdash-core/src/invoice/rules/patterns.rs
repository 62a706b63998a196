//! Common regex patterns for vendor invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Dot-decimal amount with optional comma thousands separators ("7,662.08").
pub const DOT_AMOUNT: &str = r"[\d,]+\.\d{2}";

/// Strict space-grouped amount ("1 300,00", "1300.00").
///
/// Either a run grouped by single spaces or an ungrouped run, so a
/// reference number sitting in front of the amount is not swallowed.
pub const STRICT_AMOUNT: &str = r"(?:\d{1,3}(?:\s\d{3})+|\d+)[.,]\d{2}";

lazy_static! {
    // Equinix invoice numbers
    pub static ref EQ_INVOICE_LABEL: Regex = Regex::new(
        r"(?i)Invoice\s*#\s*(\d+)"
    ).unwrap();

    pub static ref EQ_INVOICE_STANDALONE: Regex = Regex::new(
        r"140\d{9}"
    ).unwrap();

    // Equinix totals
    pub static ref EQ_GRAND_TOTAL: Regex = Regex::new(
        &format!(r"(?i)Grand Total\s*-\s*({})", DOT_AMOUNT)
    ).unwrap();

    pub static ref EQ_TOTAL_DUE: Regex = Regex::new(
        &format!(r"(?i)Invoice Total Due\s*({})", DOT_AMOUNT)
    ).unwrap();

    pub static ref EQ_TOTAL_CHARGES: Regex = Regex::new(
        &format!(r"(?i)Total Charges\s*[\d,.]+\s*({})", DOT_AMOUNT)
    ).unwrap();

    // Equinix line items
    pub static ref EQ_CROSS_CONNECT: Regex = Regex::new(
        r"(?i)Location:\s*([0-9]+.*?)\s*CID:\s*(.*?)(?:\s+\d+\.\d+|\s+CC|\s+SQ|\s+Product|\s*–)"
    ).unwrap();

    pub static ref EQ_PRICE: Regex = Regex::new(
        r"(\d{1,3}(?:,\d{3})*\.\d{2})"
    ).unwrap();

    pub static ref EQ_SECURE_CABINET: Regex = Regex::new(
        r"(?i)Secure Cabinet"
    ).unwrap();

    pub static ref EQ_CABINET_CAPACITY: Regex = Regex::new(
        r"(?i)Secure Cabinet.*?Cabinet\s*\(\s*([\dkVA\s]+)\)"
    ).unwrap();

    pub static ref EQ_CABINET_PRICE: Regex = Regex::new(
        &format!(r"CAB\w+\s+\d+\s+({})", DOT_AMOUNT)
    ).unwrap();

    pub static ref EQ_AC_POWER: Regex = Regex::new(
        r"(?i)AC Power"
    ).unwrap();

    pub static ref EQ_POWER_CAPACITY: Regex = Regex::new(
        r"(?i)AC Power\s*\(\s*([\dkVA\s]+)\)"
    ).unwrap();

    pub static ref EQ_POWER_PRICE: Regex = Regex::new(
        &format!(r"POW\w+\s+\d+\s+({})", DOT_AMOUNT)
    ).unwrap();

    pub static ref EQ_INTERNET_EXCHANGE: Regex = Regex::new(
        r"(?i)Equinix Internet Exchange"
    ).unwrap();

    pub static ref EQ_IX_PORT: Regex = Regex::new(
        r"(?i)Equinix Internet Exchange\s*-\s*Port\s*\(\s*([^)]+)\)"
    ).unwrap();

    pub static ref EQ_IX_CHARGE: Regex = Regex::new(
        &format!(r"IX\w+\s+(\d+)\s+({})", DOT_AMOUNT)
    ).unwrap();

    // Orange invoice numbers
    pub static ref OR_REFERENCE: Regex = Regex::new(
        r"(?i)reference\s*:\s*(\d+)"
    ).unwrap();

    pub static ref OR_INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)invoice n\S*\s*:\s*(\d+)"
    ).unwrap();

    // Orange totals, tried in this order
    pub static ref OR_IPL_LINE: Regex = Regex::new(
        &format!(r"(?i)IPL Essential.*?USD\s+(?:[A-Z0-9]+\s+)??({})", STRICT_AMOUNT)
    ).unwrap();

    pub static ref OR_TOTAL_KEYWORDS: Vec<Regex> = ["amount due before", "total invoiced amount", "TOTAL"]
        .iter()
        .map(|kw| Regex::new(&format!(r"(?i){}.*?(?:USD)?\s*({})", kw, STRICT_AMOUNT)).unwrap())
        .collect();

    pub static ref OR_AMOUNT_THEN_USD: Regex = Regex::new(
        &format!(r"(?i)({})\s+USD", STRICT_AMOUNT)
    ).unwrap();

    pub static ref OR_USD_THEN_AMOUNT: Regex = Regex::new(
        &format!(r"(?i)USD\s+({})", STRICT_AMOUNT)
    ).unwrap();

    // Orange circuit details
    pub static ref OR_LD_REFERENCE: Regex = Regex::new(
        r"(?i)LD\s*:\s*([A-Z0-9\s]+?)(?:\s+city|\s+capacity|\s+MONTHLY|\s+LD|\s*$)"
    ).unwrap();

    pub static ref OR_CAPACITY: Regex = Regex::new(
        r"(?i)(?:capacity|Link)\s+(\d+)\s*(Gb[a-z]*)"
    ).unwrap();
}
