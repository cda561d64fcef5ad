//! Raw statement-line parser (fallback when no table analysis is available)
//!
//! Works on plain PDF-to-text output, one transaction per line:
//!   4290 21 04 25 HOMECENTER VTAS A DIST BOGOTA 25.61 $704,700.00 $704,700.00 $0.00 01 01 00
//!
//! The first `DD MM YY` group is the transaction date, the first `$` amount
//! after it is the charge, and the text between them is the description.

use anyhow::Result;
use billtract_core::Table;
use regex::Regex;

/// Header of the table produced by [`parse_statement_lines`].
pub const LINE_TABLE_HEADER: [&str; 3] = ["Fecha", "Descripción", "Valor"];

/// Lines shorter than this are never transactions.
const MIN_LINE_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    /// `DD/MM/YY`
    pub date: String,
    pub description: String,
    /// Raw amount text including the `$` sign
    pub amount: String,
}

/// Parse raw statement text into transaction lines, skipping anything that
/// does not look like one.
pub fn parse_lines(text: &str) -> Result<Vec<StatementLine>> {
    let date_re = Regex::new(r"\b(\d{2}\s+\d{2}\s+\d{2})\b")?;
    let amount_re = Regex::new(r"\$[\d,]+\.?\d*")?;
    let leading_ref_re = Regex::new(r"^\d+\s*")?;
    let trailing_rate_re = Regex::new(r"\s+\d+\.\d+\s*$")?;

    let mut out = Vec::new();

    for line in text.lines() {
        if line.trim().len() < MIN_LINE_LEN {
            continue;
        }
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");

        let Some(date_m) = date_re.find(&line) else {
            continue;
        };
        let rest = &line[date_m.end()..];
        let Some(amount_m) = amount_re.find(rest) else {
            continue;
        };

        let desc = rest[..amount_m.start()].trim();
        let desc = leading_ref_re.replace(desc, "");
        let desc = trailing_rate_re.replace(&desc, "");
        let desc = desc.split_whitespace().collect::<Vec<_>>().join(" ");
        if desc.is_empty() {
            continue;
        }

        out.push(StatementLine {
            date: date_m.as_str().split_whitespace().collect::<Vec<_>>().join("/"),
            description: desc,
            amount: amount_m.as_str().to_string(),
        });
    }

    Ok(out)
}

/// Parse raw statement text into a single table headed by
/// [`LINE_TABLE_HEADER`], ready for template mapping.
pub fn parse_statement_lines(text: &str) -> Result<Table> {
    let mut rows = vec![LINE_TABLE_HEADER.iter().map(|h| h.to_string()).collect()];
    rows.extend(
        parse_lines(text)?
            .into_iter()
            .map(|l| vec![l.date, l.description, l.amount]),
    );
    Ok(Table::from_rows(rows))
}
