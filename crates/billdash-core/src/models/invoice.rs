//! Invoice data models shared with the dashboard's document store.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::period::BillingPeriod;

/// Details placeholder used when no circuit reference could be found.
pub const DETAILS_NOT_FOUND: &str = "Details not found in PDF";

/// Vendors whose invoices the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vendor {
    /// Orange-style IPL circuit invoices.
    Orange,
    /// Equinix-style colocation invoices.
    Equinix,
}

impl Vendor {
    /// Display name, also used as the serialized tag.
    pub fn name(&self) -> &'static str {
        match self {
            Vendor::Orange => "Orange",
            Vendor::Equinix => "Equinix",
        }
    }

    /// Prefix for synthesized invoice identifiers.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Vendor::Orange => "OR",
            Vendor::Equinix => "EQ",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "orange" => Ok(Vendor::Orange),
            "equinix" => Ok(Vendor::Equinix),
            other => Err(format!("unknown vendor: {}", other)),
        }
    }
}

/// Vendor chosen by the user for a batch: a fixed vendor or auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum VendorSelection {
    /// Detect the vendor from the document text and filename.
    #[default]
    Auto,
    /// Use this vendor verbatim.
    Fixed(Vendor),
}

impl fmt::Display for VendorSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorSelection::Auto => f.write_str("auto"),
            VendorSelection::Fixed(vendor) => write!(f, "{}", vendor.name().to_lowercase()),
        }
    }
}

impl FromStr for VendorSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(VendorSelection::Auto);
        }
        s.parse().map(VendorSelection::Fixed)
    }
}

impl From<VendorSelection> for String {
    fn from(selection: VendorSelection) -> Self {
        selection.to_string()
    }
}

impl TryFrom<String> for VendorSelection {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Vendor> for VendorSelection {
    fn from(vendor: Vendor) -> Self {
        VendorSelection::Fixed(vendor)
    }
}

/// A single billed item on a vendor invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Identifier, unique within the invoice.
    pub id: String,

    /// Service description.
    pub description: String,

    /// Circuit, cabinet or location reference.
    pub details: String,

    /// Billed quantity.
    pub quantity: u32,

    /// Price per unit.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Line total. Equals the unit price except for multi-unit items.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,

    /// Billing period label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

impl LineItem {
    /// Create a single-unit item whose total equals its unit price.
    pub fn single(
        id: impl Into<String>,
        description: impl Into<String>,
        details: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            details: details.into(),
            quantity: 1,
            unit_price,
            total_price: unit_price,
            period: None,
        }
    }

    /// Create an item billed as `quantity` units of `unit_price`.
    ///
    /// If the product does not fit a `Decimal`, the item is kept as a
    /// single unit so extraction still yields a record.
    pub fn multiple(
        id: impl Into<String>,
        description: impl Into<String>,
        details: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        let id = id.into();
        let (quantity, total_price) = match unit_price.checked_mul(Decimal::from(quantity)) {
            Some(total) => (quantity, total.round_dp(2)),
            None => {
                warn!("Item {}: {} x {} overflows, billing as one unit", id, quantity, unit_price);
                (1, unit_price)
            }
        };

        Self {
            id,
            description: description.into(),
            details: details.into(),
            quantity,
            unit_price,
            total_price,
            period: None,
        }
    }
}

/// An invoice extracted from one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Invoice number (vendor-specific format).
    pub id: String,

    /// Issuing vendor.
    pub vendor: Vendor,

    /// Invoice date as free text.
    pub date: String,

    /// Payment due date as free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    /// Currency code (default: USD).
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Invoice total.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Line items in the order they were found.
    pub items: Vec<LineItem>,

    /// Set by the caller for records not yet pushed to the remote store.
    #[serde(rename = "_pendingSync", default)]
    pub pending_sync: bool,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

impl Invoice {
    /// Create an empty invoice for a vendor.
    pub fn new(id: impl Into<String>, vendor: Vendor) -> Self {
        Self {
            id: id.into(),
            vendor,
            date: String::new(),
            due_date: None,
            currency: default_currency(),
            total_amount: Decimal::ZERO,
            items: Vec::new(),
            pending_sync: false,
        }
    }

    /// Sum of all line item totals, or `None` if the sum overflows.
    pub fn items_total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.total_price))
    }

    /// Overwrite every item's period with the billing period label.
    pub fn stamp_period(&mut self, period: &BillingPeriod) {
        let label = period.label();
        for item in &mut self.items {
            item.period = Some(label.clone());
        }
    }

    /// Validate the invoice data and return any issues found.
    ///
    /// An empty list means the extraction looks complete; anything else
    /// should be flagged for manual review.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.id.is_empty() {
            issues.push("Missing invoice number".to_string());
        }

        if self.total_amount.is_zero() {
            issues.push("Total amount is zero".to_string());
        }

        if self.items.is_empty() {
            issues.push("No line items".to_string());
        }

        for item in &self.items {
            if item.details.contains(DETAILS_NOT_FOUND) {
                issues.push(format!("Item {} has placeholder details", item.id));
            }
            if item.unit_price.is_zero() {
                issues.push(format!("Item {} has no unit price", item.id));
            }
        }

        if !self.items.is_empty() {
            match self.items_total() {
                Some(calculated) => {
                    let off = calculated
                        .checked_sub(self.total_amount)
                        .is_none_or(|diff| diff.abs() > Decimal::new(1, 2));
                    if off {
                        issues.push(format!(
                            "Line item total ({}) differs from invoice total ({})",
                            calculated, self.total_amount
                        ));
                    }
                }
                None => issues.push("Line item total overflows".to_string()),
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vendor_parsing() {
        assert_eq!("Equinix".parse::<Vendor>(), Ok(Vendor::Equinix));
        assert_eq!(" orange ".parse::<Vendor>(), Ok(Vendor::Orange));
        assert!("verizon".parse::<Vendor>().is_err());
    }

    #[test]
    fn test_vendor_selection_round_trip() {
        for selection in [
            VendorSelection::Auto,
            VendorSelection::Fixed(Vendor::Orange),
            VendorSelection::Fixed(Vendor::Equinix),
        ] {
            assert_eq!(selection.to_string().parse::<VendorSelection>(), Ok(selection));
        }
        assert_eq!("AUTO".parse::<VendorSelection>(), Ok(VendorSelection::Auto));
    }

    #[test]
    fn test_multiple_multiplies_unit_price() {
        let item = LineItem::multiple("IX-1", "Port", "Equinix IX", 2, Decimal::new(315000, 2));
        assert_eq!(item.total_price, Decimal::new(630000, 2));
    }

    #[test]
    fn test_multiple_overflow_keeps_one_unit() {
        let item = LineItem::multiple("IX-1", "Port", "Equinix IX", 3, Decimal::MAX);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit_price, Decimal::MAX);
        assert_eq!(item.total_price, Decimal::MAX);
    }

    #[test]
    fn test_validate_flags_overflowing_item_sum() {
        let mut invoice = Invoice::new("140210338475", Vendor::Equinix);
        invoice.total_amount = Decimal::new(1000, 2);
        invoice.items.push(LineItem::single("A", "a", "x", Decimal::MAX));
        invoice.items.push(LineItem::single("B", "b", "x", Decimal::MAX));

        assert_eq!(invoice.items_total(), None);
        assert_eq!(invoice.validate(), vec!["Line item total overflows".to_string()]);
    }

    #[test]
    fn test_validate_flags_mismatch() {
        let mut invoice = Invoice::new("140210338475", Vendor::Equinix);
        invoice.total_amount = Decimal::new(1000, 2);
        invoice.items.push(LineItem::single("A", "a", "x", Decimal::new(400, 2)));

        let issues = invoice.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("differs"));
    }

    #[test]
    fn test_validate_clean_invoice() {
        let mut invoice = Invoice::new("5210535475", Vendor::Orange);
        invoice.total_amount = Decimal::new(130000, 2);
        invoice
            .items
            .push(LineItem::single("OR-1", "IPL", "LD: LD020851", Decimal::new(130000, 2)));

        assert!(invoice.validate().is_empty());
    }

    #[test]
    fn test_serializes_store_field_names() {
        let mut invoice = Invoice::new("1", Vendor::Orange);
        invoice.total_amount = Decimal::new(130000, 2);
        invoice.pending_sync = true;

        let json = serde_json::to_value(&invoice).unwrap();
        assert_eq!(json["totalAmount"], serde_json::json!(1300.0));
        assert_eq!(json["vendor"], serde_json::json!("Orange"));
        assert_eq!(json["_pendingSync"], serde_json::json!(true));
        assert!(json.get("dueDate").is_none());
    }
}
