//! Batch processing command for a directory of invoices.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use fxr_core::models::config::{FxrConfig, MissingRatePolicy};
use fxr_core::{BatchProcessor, DirectorySource, PdfDecoder, RateExtractor};

use super::config::load_config;
use crate::output::{render, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing invoices (default: from config, "invoices")
    #[arg(env = "FXR_INVOICE_DIR")]
    dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Per-document time limit in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Report invoices without a rate line instead of failing them
    #[arg(long)]
    lenient: bool,
}

impl BatchArgs {
    fn apply(&self, config: &mut FxrConfig) {
        if let Some(dir) = &self.dir {
            config.source.dir = dir.clone();
        }
        if let Some(jobs) = self.jobs {
            config.batch.concurrency = jobs;
        }
        if self.timeout.is_some() {
            config.batch.timeout_secs = self.timeout;
        }
        if self.lenient {
            config.extraction.missing_rate = MissingRatePolicy::Lenient;
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.apply(&mut config);
    debug!("Batch config: {:?}", config);

    // Invalid patterns fail here, before any document is touched
    let extractor = RateExtractor::from_config(&config.extraction)?;
    let decoder = PdfDecoder::from_config(&config.pdf);
    let source = DirectorySource::from_config(&config.source);
    let processor = BatchProcessor::new(decoder, extractor).with_config(&config);

    let outcomes = processor.run(&source).await?;

    let report = render(&outcomes, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &report)?;
        eprintln!(
            "{} Report written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", report);
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    eprintln!(
        "{} Processed {} files in {:?}: {} successful, {} failed",
        style("✓").green(),
        outcomes.len(),
        start.elapsed(),
        style(outcomes.len() - failed).green(),
        style(failed).red()
    );

    Ok(())
}
