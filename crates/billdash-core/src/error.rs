//! Error types for the billdash-core library.
//!
//! Text extraction itself never fails; these cover the parts around it
//! (reading PDFs, interpreting user-selected billing periods, configuration).

use thiserror::Error;

/// Main error type for the billdash library.
#[derive(Error, Debug)]
pub enum BilldashError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Billing period could not be interpreted.
    #[error("billing period error: {0}")]
    Period(#[from] PeriodError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to the user-selected billing period.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// Month name not recognised.
    #[error("unknown month: {0}")]
    UnknownMonth(String),

    /// Year outside the supported calendar range.
    #[error("year out of range: {0}")]
    YearOutOfRange(i32),
}

/// Result type for the billdash library.
pub type Result<T> = std::result::Result<T, BilldashError>;
