//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace};

use super::{flatten_whitespace, join_pages, PdfTextSource, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// PDF text extractor using lopdf, with pdf-extract as a fallback.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    page_markers: bool,
    max_pages: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            page_markers: true,
            max_pages: 0,
        }
    }

    /// Apply PDF settings from configuration.
    pub fn with_config(mut self, config: &PdfConfig) -> Self {
        self.page_markers = config.page_markers;
        self.max_pages = config.max_pages;
        self
    }

    fn pages_to_read(&self, page_count: usize) -> usize {
        if self.max_pages == 0 {
            page_count
        } else {
            page_count.min(self.max_pages)
        }
    }

    /// Whole-document text from pdf-extract, used when lopdf finds none.
    fn fallback_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map(|text| flatten_whitespace(&text))
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextSource for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len())
            .unwrap_or(0)
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        let page_numbers: Vec<u32> = doc
            .get_pages()
            .keys()
            .copied()
            .take(self.pages_to_read(doc.get_pages().len()))
            .collect();

        let pages: Vec<String> = page_numbers
            .iter()
            .map(|&n| match doc.extract_text(&[n]) {
                Ok(text) => flatten_whitespace(&text),
                Err(e) => {
                    trace!("lopdf could not read page {}: {}", n, e);
                    String::new()
                }
            })
            .collect();

        if pages.iter().all(|p| p.is_empty()) {
            debug!("No page text from lopdf, falling back to pdf-extract");
            return Ok(vec![self.fallback_text()?]);
        }

        debug!(
            "Extracted {} characters from {} pages",
            pages.iter().map(String::len).sum::<usize>(),
            pages.len()
        );
        Ok(pages)
    }

    fn extract_text(&self) -> Result<String> {
        let pages = self.extract_pages()?;
        if self.page_markers {
            Ok(join_pages(&pages))
        } else {
            Ok(pages.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_extract_without_document_fails() {
        let extractor = PdfExtractor::new();
        assert!(matches!(extractor.extract_pages(), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(extractor.load(b"not a pdf"), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_max_pages() {
        let config = PdfConfig {
            page_markers: true,
            max_pages: 2,
        };
        let extractor = PdfExtractor::new().with_config(&config);
        assert_eq!(extractor.pages_to_read(5), 2);
        assert_eq!(extractor.pages_to_read(1), 1);
        assert_eq!(PdfExtractor::new().pages_to_read(5), 5);
    }
}
