//! Detect command - show which vendor parser a file would use.

use std::path::PathBuf;

use clap::Args;
use console::style;

use billdash_core::invoice::rules::{detect_vendor, DetectionReason};
use billdash_core::models::invoice::VendorSelection;

use super::{file_name, load_config, read_document_text};

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Input file (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Print the detection as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = read_document_text(&args.input, &config)?;
    let detection = detect_vendor(&text, &file_name(&args.input), VendorSelection::Auto);

    if args.json {
        println!("{}", serde_json::to_string(&detection)?);
    } else {
        println!(
            "{} {} ({})",
            style("✓").green(),
            detection.vendor,
            reason_label(detection.reason)
        );
    }

    Ok(())
}

/// Stable name for a detection reason, matching its JSON form.
pub fn reason_label(reason: DetectionReason) -> &'static str {
    match reason {
        DetectionReason::Override => "override",
        DetectionReason::BrandName => "brand_name",
        DetectionReason::TechnicalMarker => "technical_marker",
        DetectionReason::Default => "default",
    }
}
