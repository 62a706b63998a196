//! Invoice assembly: vendor detection, vendor parsing and period stamping.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::*;
use crate::models::period::BillingPeriod;

use super::equinix::EquinixParser;
use super::id::{IdGenerator, RandomIdGenerator};
use super::orange::OrangeParser;
use super::rules::{detect_vendor, Detection};
use super::InvoiceExtractor;

/// One uploaded document, already converted to text.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Raw text with page markers.
    pub text: String,
    /// Original filename, used for vendor detection.
    pub filename: String,
    /// Vendor chosen by the user for the batch.
    pub vendor: VendorSelection,
    /// Billing month chosen by the user.
    pub period: BillingPeriod,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>, filename: impl Into<String>, period: BillingPeriod) -> Self {
        Self {
            text: text.into(),
            filename: filename.into(),
            vendor: VendorSelection::Auto,
            period,
        }
    }

    pub fn with_vendor(mut self, vendor: VendorSelection) -> Self {
        self.vendor = vendor;
        self
    }
}

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub invoice: Invoice,
    /// How the vendor was chosen.
    pub detection: Detection,
    /// Issues a reviewer should look at.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Whether the invoice should be checked by hand.
    pub fn needs_review(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Vendor-specific parser selected by the detected vendor.
#[derive(Debug, Clone)]
pub enum VendorParser {
    Equinix(EquinixParser),
    Orange(OrangeParser),
}

impl VendorParser {
    /// Parser for `vendor` using extraction settings from `config`.
    pub fn for_vendor(vendor: Vendor, config: &ExtractionConfig) -> Self {
        match vendor {
            Vendor::Equinix => VendorParser::Equinix(
                EquinixParser::new().with_lookahead(config.cross_connect_lookahead),
            ),
            Vendor::Orange => VendorParser::Orange(OrangeParser::new()),
        }
    }

    pub fn parse(&self, text: &str, ids: &dyn IdGenerator) -> Invoice {
        match self {
            VendorParser::Equinix(parser) => parser.parse(text, ids),
            VendorParser::Orange(parser) => parser.parse(text, ids),
        }
    }
}

/// Invoice parser combining vendor detection with the vendor parsers.
#[derive(Clone)]
pub struct InvoiceParser {
    config: ExtractionConfig,
    ids: Arc<dyn IdGenerator>,
}

impl InvoiceParser {
    /// Create a parser with default settings and random fallback ids.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            ids: Arc::new(RandomIdGenerator),
        }
    }

    /// Use extraction settings from configuration.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the fallback identifier source.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Parse one document. Never fails; misses degrade to zero amounts and
    /// placeholder fields, reported in `warnings`.
    pub fn parse(&self, doc: &SourceDocument) -> ExtractionResult {
        let start = start_timer();

        debug!(
            "Parsing {} ({} characters of text)",
            doc.filename,
            doc.text.len()
        );

        let detection = detect_vendor(&doc.text, &doc.filename, doc.vendor);
        debug!("Vendor {} ({:?})", detection.vendor, detection.reason);

        let parser = VendorParser::for_vendor(detection.vendor, &self.config);
        let mut invoice = parser.parse(&doc.text, self.ids.as_ref());

        invoice.currency = self.config.default_currency.clone();
        invoice.date = doc.period.invoice_date();
        invoice.stamp_period(&doc.period);

        let warnings = invoice.validate();
        for warning in &warnings {
            warn!("{}: {}", doc.filename, warning);
        }

        info!(
            "Extracted {} invoice {} with {} items, total {} {}",
            invoice.vendor,
            invoice.id,
            invoice.items.len(),
            invoice.total_amount,
            invoice.currency
        );

        ExtractionResult {
            invoice,
            detection,
            warnings,
            processing_time_ms: start.map_or(0, |s| s.elapsed().as_millis() as u64),
        }
    }
}

// Instant::now panics on wasm32-unknown-unknown, so timings read 0 there.
#[cfg(not(target_arch = "wasm32"))]
fn start_timer() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn start_timer() -> Option<Instant> {
    None
}

impl Default for InvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InvoiceParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceParser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InvoiceExtractor for InvoiceParser {
    fn extract(&self, doc: &SourceDocument) -> Invoice {
        self.parse(doc).invoice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::id::SequentialIdGenerator;
    use crate::invoice::rules::DetectionReason;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn november() -> BillingPeriod {
        BillingPeriod::parse("November", 2025).unwrap()
    }

    fn parser() -> InvoiceParser {
        InvoiceParser::new().with_id_generator(SequentialIdGenerator::new())
    }

    const EQUINIX_TEXT: &str = " ---PAGE 1--- Equinix Singapore Pte Ltd Invoice # 140210338475 \
        Product Cross Connect Location: 040010 CID: CAB-SG1-0101 331.80 \
        Location: 040010 CID: CAB-SG1-0102 267.75 \
        Power - AC Power (4 kVA) POWSG1 1 1,480.32 \
        ---PAGE 2--- Grand Total - 7,662.08";

    #[test]
    fn test_equinix_end_to_end() {
        let doc = SourceDocument::new(EQUINIX_TEXT, "invoice.pdf", november());
        let result = parser().parse(&doc);
        let invoice = &result.invoice;

        assert_eq!(result.detection.vendor, Vendor::Equinix);
        assert_eq!(invoice.id, "140210338475");
        assert_eq!(invoice.total_amount, dec("7662.08"));
        assert_eq!(invoice.items.len(), 3);

        let ids: Vec<&str> = invoice.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["XC-140210338475-1", "XC-140210338475-2", "PWR-140210338475"]);
        assert_eq!(invoice.items[2].details, "4 kVA");
        assert_eq!(invoice.items[2].unit_price, dec("1480.32"));
    }

    #[test]
    fn test_orange_end_to_end() {
        let text = " ---PAGE 1--- Orange Business Invoice reference: 5210535475 \
                    IPL Essential SINGAPORE - SINGAPORE Link 20 Gbits/s USD 1 300.00";
        let doc = SourceDocument::new(text, "scan.pdf", november());
        let result = parser().parse(&doc);
        let invoice = &result.invoice;

        assert_eq!(invoice.vendor, Vendor::Orange);
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].total_price, dec("1300.00"));
        assert_eq!(invoice.items[0].description, "IPL Essential - 20 Gbps");
    }

    #[test]
    fn test_orange_without_capacity_uses_generic_description() {
        let text = "Orange IPL Essential USD 1 300.00";
        let result = parser().parse(&SourceDocument::new(text, "a.pdf", november()));

        assert_eq!(result.invoice.items[0].total_price, dec("1300.00"));
        assert_eq!(result.invoice.items[0].description, "IPL Essential Service");
    }

    #[test]
    fn test_period_and_date_stamped_once() {
        let doc = SourceDocument::new(EQUINIX_TEXT, "invoice.pdf", november());
        let invoice = parser().parse(&doc).invoice;

        assert_eq!(invoice.date, "01 November 2025");
        assert_eq!(invoice.currency, "USD");
        assert!(invoice
            .items
            .iter()
            .all(|i| i.period.as_deref() == Some("01 November 2025 - 30 November 2025")));
    }

    #[test]
    fn test_override_selects_parser() {
        let doc = SourceDocument::new(EQUINIX_TEXT, "invoice.pdf", november())
            .with_vendor(VendorSelection::Fixed(Vendor::Orange));
        let result = parser().parse(&doc);

        assert_eq!(result.detection.reason, DetectionReason::Override);
        assert_eq!(result.invoice.vendor, Vendor::Orange);
        assert_eq!(result.invoice.items.len(), 1);
    }

    #[test]
    fn test_unrecognised_text_degrades() {
        let doc = SourceDocument::new("lorem ipsum", "notes.pdf", november());
        let result = parser().parse(&doc);

        assert_eq!(result.invoice.vendor, Vendor::Equinix);
        assert_eq!(result.invoice.id, "EQ-0001");
        assert_eq!(result.invoice.total_amount, Decimal::ZERO);
        assert!(result.invoice.items.is_empty());
        assert!(result.needs_review());
    }

    #[test]
    fn test_reparse_is_identical_with_known_id() {
        let doc = SourceDocument::new(EQUINIX_TEXT, "invoice.pdf", november());
        let parser = InvoiceParser::new();

        assert_eq!(parser.extract(&doc), parser.extract(&doc));
    }

    #[test]
    fn test_configured_currency() {
        let config = ExtractionConfig {
            default_currency: "SGD".to_string(),
            ..ExtractionConfig::default()
        };
        let doc = SourceDocument::new("Invoice Total Due 10.00", "equinix.pdf", november());
        let invoice = InvoiceParser::new().with_config(config).extract(&doc);

        assert_eq!(invoice.currency, "SGD");
    }

    #[test]
    fn test_extract_from_text_with_fixed_vendor() {
        let invoice = parser().extract_from_text(
            "Invoice reference: 5210535475 IPL Essential USD 1 300.00",
            "upload.pdf",
            VendorSelection::Fixed(Vendor::Orange),
            november(),
        );

        assert_eq!(invoice.id, "5210535475");
        assert_eq!(invoice.total_amount, dec("1300.00"));
        assert_eq!(invoice.items[0].id, "OR-5210535475-1");
    }
}
