//! PDF text module.
//!
//! Converting PDFs to text is a black box to the extractor; this module only
//! has to hand back page text in the layout the vendor patterns expect.
//! The page layout helpers are always available so front ends that extract
//! text themselves (pdf.js) can build the same layout.

#[cfg(feature = "pdf")]
mod extractor;

#[cfg(feature = "pdf")]
pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Marker inserted in front of each page's text.
pub fn page_marker(page: usize) -> String {
    format!(" ---PAGE {}--- ", page)
}

/// Join page texts, each preceded by its page marker.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}{}", page_marker(i + 1), text.as_ref()))
        .collect()
}

/// Collapse every whitespace run (newlines included) into one space.
///
/// Vendor patterns are written against text items joined by spaces, so
/// line breaks from the PDF layout must not split a label from its value.
pub fn flatten_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trait for PDF text sources.
pub trait PdfTextSource {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> usize;

    /// Extract each page's text, whitespace-flattened.
    fn extract_pages(&self) -> Result<Vec<String>>;

    /// Extract the whole document as one string with page markers.
    fn extract_text(&self) -> Result<String> {
        Ok(join_pages(&self.extract_pages()?))
    }
}
