//! Process command - extract one invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use billdash_core::invoice::rules::format_amount;
use billdash_core::invoice::{InvoiceParser, SourceDocument};
use billdash_core::models::invoice::Invoice;

use super::{file_name, load_config, read_document_text, UploadArgs};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    upload: UploadArgs,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report fields that need manual review
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let period = args.upload.period()?;
    let text = read_document_text(&args.input, &config)?;

    let parser = InvoiceParser::new().with_config(config.extraction.clone());
    let doc = SourceDocument::new(text, file_name(&args.input), period)
        .with_vendor(args.upload.vendor(&config));
    let result = parser.parse(&doc);

    // Validate if requested
    if args.validate && result.needs_review() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &result.warnings {
            eprintln!("  - {}", issue);
        }
    }

    let output = format_invoice(&result.invoice, args.format, config.output.pretty_json)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_invoice(invoice: &Invoice, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(invoice)?),
        OutputFormat::Json => Ok(serde_json::to_string(invoice)?),
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
    }
}

fn format_csv(invoice: &Invoice) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Write header
    wtr.write_record([
        "invoice_id",
        "vendor",
        "date",
        "currency",
        "total_amount",
        "item_id",
        "description",
        "details",
        "quantity",
        "unit_price",
        "total_price",
        "period",
    ])?;

    let total_amount = invoice.total_amount.to_string();
    for item in &invoice.items {
        let quantity = item.quantity.to_string();
        let unit_price = item.unit_price.to_string();
        let total_price = item.total_price.to_string();

        wtr.write_record([
            invoice.id.as_str(),
            invoice.vendor.name(),
            invoice.date.as_str(),
            invoice.currency.as_str(),
            total_amount.as_str(),
            item.id.as_str(),
            item.description.as_str(),
            item.details.as_str(),
            quantity.as_str(),
            unit_price.as_str(),
            total_price.as_str(),
            item.period.as_deref().unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoice: &Invoice) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", invoice.id));
    output.push_str(&format!("Vendor: {}\n", invoice.vendor));
    output.push_str(&format!("Date: {}\n", invoice.date));
    output.push('\n');

    output.push_str("Items:\n");
    for item in &invoice.items {
        output.push_str(&format!("  {} - {}\n", item.id, item.description));
        output.push_str(&format!("    {}\n", item.details));
        output.push_str(&format!(
            "    {} x {} = {} {}\n",
            item.quantity,
            format_amount(item.unit_price),
            format_amount(item.total_price),
            invoice.currency
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "Total: {} {}\n",
        format_amount(invoice.total_amount),
        invoice.currency
    ));

    if let Some(due_date) = &invoice.due_date {
        output.push_str(&format!("\nPayment due: {}\n", due_date));
    }

    output
}
