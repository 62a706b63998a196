//! Core library for the billing dashboard.
//!
//! This crate provides:
//! - Invoice data models shared with the dashboard's document store
//! - Vendor detection and Equinix/Orange invoice text extraction
//! - Billing period stamping
//! - PDF text extraction (lopdf backend behind feature `pdf`)

pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use error::{BilldashError, PdfError, PeriodError, Result};
pub use invoice::{ExtractionResult, InvoiceExtractor, InvoiceParser, SourceDocument};
pub use models::config::BilldashConfig;
pub use models::invoice::{Invoice, LineItem, Vendor, VendorSelection};
pub use models::period::BillingPeriod;
pub use pdf::PdfTextSource;
pub use rust_decimal::Decimal;
#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;
