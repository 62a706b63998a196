//! WASM bindings for the billing dashboard invoice extractor.
//!
//! The browser extracts page text with pdf.js; these bindings turn that text
//! into invoice records for the dashboard.

use wasm_bindgen::prelude::*;

use billdash_core::invoice::rules::parse_dot_decimal;
use billdash_core::invoice::{ExtractionResult, InvoiceParser, SourceDocument};
use billdash_core::models::config::ExtractionConfig;
use billdash_core::models::invoice::VendorSelection;
use billdash_core::models::period::BillingPeriod;
use billdash_core::Decimal;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_vendor(vendor: &str) -> Result<VendorSelection, JsValue> {
    vendor.parse().map_err(to_js_error)
}

fn parse_period(month: &str, year: i32) -> Result<BillingPeriod, JsValue> {
    BillingPeriod::parse(month, year).map_err(to_js_error)
}

/// Extract an invoice from page text.
///
/// `vendor` is "auto", "orange" or "equinix"; `month` is a month name.
#[wasm_bindgen]
pub fn extract_invoice(
    text: &str,
    filename: &str,
    vendor: &str,
    month: &str,
    year: i32,
) -> Result<JsValue, JsValue> {
    let doc = SourceDocument::new(text, filename, parse_period(month, year)?)
        .with_vendor(parse_vendor(vendor)?);
    let result = InvoiceParser::new().parse(&doc);

    serde_wasm_bindgen::to_value(&result.invoice).map_err(to_js_error)
}

/// Detect which vendor parser a document would use.
#[wasm_bindgen]
pub fn detect_vendor(text: &str, filename: &str) -> Result<JsValue, JsValue> {
    let detection =
        billdash_core::invoice::rules::detect_vendor(text, filename, VendorSelection::Auto);
    serde_wasm_bindgen::to_value(&detection).map_err(to_js_error)
}

/// Join pdf.js page strings with the page markers the extractor expects.
#[wasm_bindgen]
pub fn join_pages(pages: js_sys::Array) -> String {
    let pages: Vec<String> = pages
        .iter()
        .filter_map(|page| page.as_string())
        .map(|page| billdash_core::pdf::flatten_whitespace(&page))
        .collect();
    billdash_core::pdf::join_pages(&pages)
}

/// Parse an invoice amount such as "7,662.08".
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    parse_dot_decimal(amount).and_then(|d| d.to_string().parse().ok())
}

/// Format an amount with thousands separators ("7,662.08").
#[wasm_bindgen]
pub fn format_amount(amount: f64) -> String {
    Decimal::try_from(amount)
        .map(billdash_core::invoice::rules::format_amount)
        .unwrap_or_else(|_| format!("{:.2}", amount))
}

/// Invoice extractor class for browser use.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    config: ExtractionConfig,
    vendor: VendorSelection,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create a new invoice extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            vendor: VendorSelection::Auto,
        }
    }

    /// Choose the vendor for subsequent uploads.
    #[wasm_bindgen]
    pub fn set_vendor(&mut self, vendor: &str) -> Result<(), JsValue> {
        self.vendor = parse_vendor(vendor)?;
        Ok(())
    }

    /// Currency stamped on extracted invoices.
    #[wasm_bindgen]
    pub fn set_currency(&mut self, currency: &str) {
        self.config.default_currency = currency.to_string();
    }

    /// Extract invoice from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str, filename: &str, month: &str, year: i32) -> Result<JsValue, JsValue> {
        let result = self.run(text, filename, month, year)?;
        serde_wasm_bindgen::to_value(&result.invoice).map_err(to_js_error)
    }

    /// Get extraction result with detection and review metadata.
    #[wasm_bindgen]
    pub fn extract_with_metadata(
        &self,
        text: &str,
        filename: &str,
        month: &str,
        year: i32,
    ) -> Result<JsValue, JsValue> {
        let result = self.run(text, filename, month, year)?;

        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ExtractResult {
            invoice: billdash_core::Invoice,
            detection: billdash_core::invoice::rules::Detection,
            warnings: Vec<String>,
            needs_review: bool,
            processing_time_ms: u64,
        }

        let output = ExtractResult {
            needs_review: result.needs_review(),
            invoice: result.invoice,
            detection: result.detection,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        };

        serde_wasm_bindgen::to_value(&output).map_err(to_js_error)
    }

    /// Serialize an extraction as a JSON string for storage.
    #[wasm_bindgen]
    pub fn extract_json(&self, text: &str, filename: &str, month: &str, year: i32) -> Result<String, JsValue> {
        let result = self.run(text, filename, month, year)?;
        serde_json::to_string(&result.invoice).map_err(to_js_error)
    }
}

impl InvoiceExtractor {
    fn run(&self, text: &str, filename: &str, month: &str, year: i32) -> Result<ExtractionResult, JsValue> {
        let doc = SourceDocument::new(text, filename, parse_period(month, year)?)
            .with_vendor(self.vendor);
        let result = InvoiceParser::new().with_config(self.config.clone()).parse(&doc);

        for warning in &result.warnings {
            web_sys::console::warn_1(&JsValue::from_str(&format!("{}: {}", filename, warning)));
        }

        Ok(result)
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}
