//! Report rendering for batch outcomes.

use fxr_core::models::rates::{BatchOutcome, UNAVAILABLE};

const HEADERS: [&str; 7] = [
    "filename",
    "status",
    "usd_to_eur",
    "eur_to_usd",
    "total_in_usd",
    "total_in_eur",
    "reason",
];

/// Columns right-aligned in table output.
const NUMERIC: [bool; 7] = [false, false, true, true, true, true, false];

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// JSON array
    Json,
    /// CSV with a header row
    Csv,
}

/// Render outcomes in the requested format.
pub fn render(outcomes: &[BatchOutcome], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(outcomes)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcomes)?),
        OutputFormat::Csv => format_csv(outcomes),
    }
}

fn cells(outcome: &BatchOutcome) -> [String; 7] {
    match outcome {
        BatchOutcome::Success(r) => [
            r.filename.clone(),
            "ok".to_string(),
            r.usd_to_eur.to_string(),
            r.eur_to_usd.to_string(),
            r.total_in_usd.to_string(),
            r.total_in_eur.to_string(),
            String::new(),
        ],
        BatchOutcome::Failure { filename, reason } => [
            filename.clone(),
            "failed".to_string(),
            UNAVAILABLE.to_string(),
            UNAVAILABLE.to_string(),
            UNAVAILABLE.to_string(),
            UNAVAILABLE.to_string(),
            reason.clone(),
        ],
    }
}

fn format_table(outcomes: &[BatchOutcome]) -> String {
    let header = HEADERS.map(str::to_uppercase);
    let rows: Vec<[String; 7]> = outcomes.iter().map(cells).collect();

    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .zip(NUMERIC)
            .map(|((cell, width), numeric)| {
                if numeric {
                    format!("{:>width$}", cell, width = width)
                } else {
                    format!("{:<width$}", cell, width = width)
                }
            })
            .collect();
        output.push_str(line.join("  ").trim_end());
        output.push('\n');
    }

    output
}

fn format_csv(outcomes: &[BatchOutcome]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(HEADERS)?;
    for outcome in outcomes {
        wtr.write_record(cells(outcome))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
