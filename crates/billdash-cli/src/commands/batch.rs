//! Batch processing command for one month's invoice uploads.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use billdash_core::invoice::{ExtractionResult, InvoiceParser, SourceDocument};
use billdash_core::models::config::BilldashConfig;
use billdash_core::models::invoice::Invoice;

use super::detect::reason_label;
use super::process::{format_invoice, OutputFormat};
use super::{file_name, is_supported, load_config, read_document_text, UploadArgs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    #[command(flatten)]
    upload: UploadArgs,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Also write every invoice into one JSON array
    #[arg(long)]
    combined: bool,

    /// Abort when a file cannot be read instead of extracting empty text
    #[arg(long)]
    strict: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: ExtractionResult,
    read_error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let period = args.upload.period()?;
    let vendor = args.upload.vendor(&config);

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files for {} ({})",
        style("ℹ").blue(),
        files.len(),
        period,
        vendor
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = InvoiceParser::new().with_config(config.extraction.clone());
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let (text, read_error) = match read_document_text(&path, &config) {
            Ok(text) => (text, None),
            Err(e) if args.strict => {
                error!("Failed to read {}: {}", path.display(), e);
                anyhow::bail!("Processing failed: {}", e);
            }
            Err(e) => {
                warn!("Failed to read {}, extracting empty text: {}", path.display(), e);
                (String::new(), Some(e.to_string()))
            }
        };

        let doc = SourceDocument::new(text, file_name(&path), period).with_vendor(vendor);
        let mut extraction = parser.parse(&doc);
        mark_for_sync(&mut extraction.invoice, &config);

        results.push(ProcessResult {
            path,
            extraction,
            read_error,
        });

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    // Write outputs
    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");
            let file_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            let content = format_invoice(&result.extraction.invoice, args.format, config.output.pretty_json)?;
            fs::write(&file_path, content)?;
            debug!("Wrote output to {}", file_path.display());
        }
    }

    if args.combined {
        let combined_path = output_path(&args.output_dir, "invoices.json");
        let invoices: Vec<&Invoice> = results.iter().map(|r| &r.extraction.invoice).collect();
        let content = if config.output.pretty_json {
            serde_json::to_string_pretty(&invoices)?
        } else {
            serde_json::to_string(&invoices)?
        };
        fs::write(&combined_path, content)?;
        println!(
            "{} Combined invoices written to {}",
            style("✓").green(),
            combined_path.display()
        );
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = output_path(&args.output_dir, "summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let review: Vec<_> = results.iter().filter(|r| r.extraction.needs_review()).collect();

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} ready, {} need review",
        style(results.len() - review.len()).green(),
        style(review.len()).yellow()
    );

    if !review.is_empty() {
        println!();
        println!("{}", style("Needs review:").yellow());
        for result in &review {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.extraction.warnings.join("; ")
            );
        }
    }

    Ok(())
}

/// Flag an invoice as written locally but not yet synced to the remote store.
fn mark_for_sync(invoice: &mut Invoice, config: &BilldashConfig) {
    if config.output.mark_pending_sync {
        invoice.pending_sync = true;
    }
}

fn output_path(output_dir: &Option<PathBuf>, name: &str) -> PathBuf {
    output_dir
        .as_ref()
        .map(|d| d.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "vendor",
        "detection",
        "invoice_id",
        "date",
        "total_amount",
        "currency",
        "items",
        "needs_review",
        "warnings",
        "processing_time_ms",
        "read_error",
    ])?;

    for result in results {
        let filename = file_name(&result.path);
        let extraction = &result.extraction;
        let invoice = &extraction.invoice;
        let total_amount = invoice.total_amount.to_string();
        let items = invoice.items.len().to_string();
        let warnings = extraction.warnings.join("; ");
        let processing_time = extraction.processing_time_ms.to_string();

        wtr.write_record([
            filename.as_str(),
            invoice.vendor.name(),
            reason_label(extraction.detection.reason),
            invoice.id.as_str(),
            invoice.date.as_str(),
            total_amount.as_str(),
            invoice.currency.as_str(),
            items.as_str(),
            if extraction.needs_review() { "yes" } else { "no" },
            warnings.as_str(),
            processing_time.as_str(),
            result.read_error.as_deref().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billdash_core::models::invoice::Vendor;

    #[test]
    fn test_mark_for_sync_follows_config() {
        let mut config = BilldashConfig::default();
        let mut invoice = Invoice::new("EQ-0001", Vendor::Equinix);
        mark_for_sync(&mut invoice, &config);
        assert!(invoice.pending_sync);

        config.output.mark_pending_sync = false;
        let mut invoice = Invoice::new("EQ-0002", Vendor::Equinix);
        mark_for_sync(&mut invoice, &config);
        assert!(!invoice.pending_sync);
    }

    #[test]
    fn test_output_path_defaults_to_cwd() {
        assert_eq!(output_path(&None, "summary.csv"), PathBuf::from("summary.csv"));
        assert_eq!(
            output_path(&Some(PathBuf::from("out")), "summary.csv"),
            PathBuf::from("out").join("summary.csv")
        );
    }
}
