//! Subcommands and the input handling they share.

pub mod batch;
pub mod config;
pub mod detect;
pub mod process;

use std::fs;
use std::path::Path;

use chrono::{Datelike, Local, Month};
use clap::Args;
use tracing::debug;

use billdash_core::models::config::BilldashConfig;
use billdash_core::models::invoice::VendorSelection;
use billdash_core::models::period::BillingPeriod;
use billdash_core::pdf::{PdfExtractor, PdfTextSource};

/// Vendor and billing month chosen for the upload.
#[derive(Args, Clone, Debug)]
pub struct UploadArgs {
    /// Vendor: auto, orange or equinix (default from config)
    #[arg(long)]
    vendor: Option<VendorSelection>,

    /// Billing month, by name ("November") or number (default: current month)
    #[arg(short, long)]
    month: Option<String>,

    /// Billing year (default: current year)
    #[arg(short, long)]
    year: Option<i32>,
}

impl UploadArgs {
    /// Vendor selection, falling back to the configured default.
    pub fn vendor(&self, config: &BilldashConfig) -> VendorSelection {
        self.vendor.unwrap_or(config.extraction.default_vendor)
    }

    /// Billing period from the flags, defaulting to today's month and year.
    pub fn period(&self) -> anyhow::Result<BillingPeriod> {
        let today = Local::now().date_naive();
        let year = self.year.unwrap_or(today.year());

        let period = match &self.month {
            Some(month) => match month.trim().parse::<u8>() {
                Ok(number) => {
                    let month = Month::try_from(number)
                        .map_err(|_| anyhow::anyhow!("Invalid month number: {}", number))?;
                    BillingPeriod::new(month, year)?
                }
                Err(_) => BillingPeriod::parse(month, year)?,
            },
            None => BillingPeriod::new(BillingPeriod::containing(today).month(), year)?,
        };

        Ok(period)
    }
}

/// Load configuration from `--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BilldashConfig> {
    if let Some(path) = config_path {
        return Ok(BilldashConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(BilldashConfig::from_file(&default_path)?)
    } else {
        Ok(BilldashConfig::default())
    }
}

/// Whether `path` is a file the extractor accepts.
pub fn is_supported(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
}

/// Filename used for vendor detection.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Read the text of a PDF, or of a `.txt` file holding already extracted text.
pub fn read_document_text(path: &Path, config: &BilldashConfig) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "txt" => Ok(fs::read_to_string(path)?),
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::new().with_config(&config.pdf);
            extractor.load(&data)?;
            debug!("PDF has {} pages", extractor.page_count());
            Ok(extractor.extract_text()?)
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}
