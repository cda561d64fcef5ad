//! Index-aligned comparison of extracted expenses against ground truth.
//!
//! A true positive is a row present in both lists where every ground-truth
//! field matches. Extra extracted rows count as false positives, missing
//! ones as false negatives.

use billtract_core::{Currency, ExpenseRecord, ExtractedExpenses, FieldValue};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMismatch {
    pub field: String,
    pub extracted: Option<FieldValue>,
    pub expected: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowMismatch {
    pub index: usize,
    pub fields: Vec<FieldMismatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketReport {
    pub extracted: usize,
    pub expected: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub mismatches: Vec<RowMismatch>,
}

impl BucketReport {
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn is_exact(&self) -> bool {
        self.mismatches.is_empty() && self.false_positives == 0 && self.false_negatives == 0
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 { 0.0 } else { n as f64 / d as f64 }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub foreign: BucketReport,
    pub domestic: BucketReport,
}

impl ValidationReport {
    pub fn bucket(&self, currency: Currency) -> &BucketReport {
        match currency {
            Currency::Foreign => &self.foreign,
            Currency::Domestic => &self.domestic,
        }
    }
}

pub fn compare_records(
    extracted: &[ExpenseRecord],
    ground_truth: &[ExpenseRecord],
) -> BucketReport {
    let mut report = BucketReport {
        extracted: extracted.len(),
        expected: ground_truth.len(),
        ..Default::default()
    };

    for (index, (e, g)) in extracted.iter().zip(ground_truth).enumerate() {
        let fields: Vec<FieldMismatch> = g
            .fields()
            .filter_map(|(field, expected)| {
                let got = e.get(field);
                let ok = match got {
                    Some(v) => v.matches(expected),
                    None => expected.to_string().trim().is_empty(),
                };
                (!ok).then(|| FieldMismatch {
                    field: field.to_string(),
                    extracted: got.cloned(),
                    expected: expected.clone(),
                })
            })
            .collect();

        if fields.is_empty() {
            report.true_positives += 1;
        } else {
            report.mismatches.push(RowMismatch { index, fields });
        }
    }

    report.false_positives = extracted.len().saturating_sub(ground_truth.len());
    report.false_negatives = ground_truth.len().saturating_sub(extracted.len());
    report
}

pub fn validate(
    extracted: &ExtractedExpenses,
    ground_truth: &ExtractedExpenses,
) -> ValidationReport {
    ValidationReport {
        foreign: compare_records(&extracted.foreign_expenses, &ground_truth.foreign_expenses),
        domestic: compare_records(&extracted.domestic_expenses, &ground_truth.domestic_expenses),
    }
}
