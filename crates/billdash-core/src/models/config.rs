//! Configuration structures for the extraction pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::invoice::VendorSelection;
use crate::error::{BilldashError, Result};

/// Main configuration for billdash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BilldashConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF text extraction configuration.
    pub pdf: PdfConfig,

    /// Output configuration for the batch driver.
    pub output: OutputConfig,
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Vendor used when the command line does not choose one.
    pub default_vendor: VendorSelection,

    /// Currency stamped on extracted invoices.
    pub default_currency: String,

    /// How many characters after a cross-connect CID are searched for its price.
    pub cross_connect_lookahead: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_vendor: VendorSelection::Auto,
            default_currency: "USD".to_string(),
            cross_connect_lookahead: 100,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Insert ` ---PAGE n--- ` markers between pages.
    pub page_markers: bool,

    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_markers: true,
            max_pages: 0,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,

    /// Mark batch output as not yet synced to the remote store.
    pub mark_pending_sync: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty_json: true,
            mark_pending_sync: true,
        }
    }
}

impl BilldashConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| BilldashError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BilldashError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::Vendor;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BilldashConfig =
            serde_json::from_str(r#"{"extraction": {"default_vendor": "orange"}}"#).unwrap();

        assert_eq!(
            config.extraction.default_vendor,
            VendorSelection::Fixed(Vendor::Orange)
        );
        assert_eq!(config.extraction.default_currency, "USD");
        assert_eq!(config.extraction.cross_connect_lookahead, 100);
        assert!(config.pdf.page_markers);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = BilldashConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: BilldashConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extraction.default_vendor, VendorSelection::Auto);
        assert!(back.output.mark_pending_sync);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BilldashConfig::default();
        config.extraction.default_currency = "SGD".to_string();
        config.save(&path).unwrap();

        let loaded = BilldashConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.default_currency, "SGD");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            BilldashConfig::from_file(&path),
            Err(BilldashError::Config(_))
        ));
        assert!(matches!(
            BilldashConfig::from_file(&dir.path().join("missing.json")),
            Err(BilldashError::Io(_))
        ));
    }
}
