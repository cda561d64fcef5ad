//! Writing extraction results as JSON or CSV.

use anyhow::{Context, Result};
use billtract_core::{Currency, ExtractedExpenses};
use clap::ValueEnum;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Stdout when `path` is `None`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(File::create(p).with_context(|| format!("create {}", p.display()))?),
        None => Box::new(io::stdout().lock()),
    })
}

pub fn write_expenses(
    out: impl Write,
    expenses: &ExtractedExpenses,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, expenses),
        OutputFormat::Csv => write_csv(out, expenses),
    }
}

fn write_json(mut out: impl Write, expenses: &ExtractedExpenses) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, expenses).context("serialize expenses")?;
    writeln!(out)?;
    Ok(())
}

/// One row per record with a leading `currency` column. Columns are the
/// union of field names, in first-seen order.
fn write_csv(out: impl Write, expenses: &ExtractedExpenses) -> Result<()> {
    let buckets = [Currency::Foreign, Currency::Domestic];

    let mut columns: Vec<&str> = Vec::new();
    for c in buckets {
        for rec in expenses.bucket(c) {
            for (name, _) in rec.fields() {
                if !columns.contains(&name) {
                    columns.push(name);
                }
            }
        }
    }

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(std::iter::once("currency").chain(columns.iter().copied()))?;
    for c in buckets {
        for rec in expenses.bucket(c) {
            let mut row = vec![c.label().to_string()];
            row.extend(
                columns
                    .iter()
                    .map(|col| rec.get(col).map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&row)?;
        }
    }
    wtr.flush()?;
    Ok(())
}
