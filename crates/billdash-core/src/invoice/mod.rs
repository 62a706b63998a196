//! Invoice field extraction module.

pub mod equinix;
pub mod id;
pub mod orange;
mod parser;
pub mod rules;

pub use equinix::EquinixParser;
pub use id::{FixedIdGenerator, IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use orange::OrangeParser;
pub use parser::{ExtractionResult, InvoiceParser, SourceDocument, VendorParser};

use crate::models::invoice::{Invoice, VendorSelection};
use crate::models::period::BillingPeriod;

/// Trait for invoice extractors.
pub trait InvoiceExtractor {
    /// Extract an invoice from an uploaded document.
    fn extract(&self, doc: &SourceDocument) -> Invoice;

    /// Extract an invoice from plain text.
    fn extract_from_text(
        &self,
        text: &str,
        filename: &str,
        vendor: VendorSelection,
        period: BillingPeriod,
    ) -> Invoice {
        self.extract(&SourceDocument::new(text, filename, period).with_vendor(vendor))
    }
}
