//! Process command - extract rates from a single invoice file.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use fxr_core::models::config::MissingRatePolicy;
use fxr_core::{
    BatchOutcome, DocumentDecoder, DocumentRef, InvoiceExtractor, PdfDecoder, RateExtractor,
    RawDocument,
};

use super::config::load_config;
use crate::output::{render, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Report a missing rate line instead of failing
    #[arg(long)]
    lenient: bool,

    /// Print the decoded text instead of extracting fields
    #[arg(long)]
    dump_text: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.lenient {
        config.extraction.missing_rate = MissingRatePolicy::Lenient;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extractor = RateExtractor::from_config(&config.extraction)?;
    let decoder = PdfDecoder::from_config(&config.pdf);
    let document = DocumentRef::from_path(&args.input);
    let name = document.name.clone();

    info!("Processing file: {}", args.input.display());

    let text = tokio::task::spawn_blocking(move || decoder.decode(&document)).await??;

    if args.dump_text {
        print!("{}", text);
        return Ok(());
    }

    let result = extractor.extract(&RawDocument::from_text(name, &text))?;
    print!("{}", render(&[BatchOutcome::Success(result)], args.format)?);

    Ok(())
}
