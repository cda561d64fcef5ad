//! Template-driven mapping of reconstructed tables onto expense records.

use billtract_core::{Currency, ExpenseRecord, ExtractedExpenses, Table};
use tracing::{debug, info};

use crate::classify::{classify_currency, header_index, header_matches};
use crate::error::Result;
use crate::normalize::normalize;
use crate::template::{Template, TemplateSource};

/// Maps tables to expenses using templates from an injected source.
#[derive(Debug, Clone)]
pub struct ExpenseMapper<S> {
    source: S,
}

impl<S: TemplateSource> ExpenseMapper<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve `template_name` and extract every matching table.
    ///
    /// An unknown template fails before any table is read.
    pub fn extract(&self, tables: &[Table], template_name: &str) -> Result<ExtractedExpenses> {
        let template = self.source.template(template_name)?;
        Ok(extract_expenses(tables, template))
    }
}

/// Extract expense records from `tables` with an already-resolved template.
pub fn extract_expenses(tables: &[Table], template: &Template) -> ExtractedExpenses {
    let mut out = ExtractedExpenses::default();

    for (t_idx, table) in tables.iter().enumerate() {
        if table.n_rows() < 2 {
            continue;
        }
        let Some(header) = table.header() else {
            continue;
        };
        if !header_matches(&template.headers, header) {
            debug!(table = t_idx, "header does not match template; skipping");
            continue;
        }

        let index = header_index(header);
        let currency = classify_currency(table, &template.currency_split);
        let desc_idx = index.get(&template.description_field.trim().to_lowercase()).copied();
        debug!(table = t_idx, currency = currency.label(), "table matched template");

        for row in table.data_rows() {
            if row.iter().all(String::is_empty) {
                continue;
            }

            let description = desc_idx
                .and_then(|i| row.get(i))
                .map(|s| s.trim())
                .unwrap_or("");
            if template.is_excluded(description) {
                debug!(table = t_idx, description, "excluded description");
                continue;
            }

            let mut record = ExpenseRecord::new();
            for field in &template.fields_to_extract {
                let raw = index
                    .get(&field.trim().to_lowercase())
                    .and_then(|&i| row.get(i))
                    .map(String::as_str)
                    .unwrap_or("");
                record.insert(field.clone(), normalize(template.normalizer(field), raw));
            }
            out.push(currency, record);
        }
    }

    info!(
        template = %template.name,
        foreign = out.bucket(Currency::Foreign).len(),
        domestic = out.bucket(Currency::Domestic).len(),
        "extracted expenses"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::template::TemplateRegistry;
    use billtract_core::FieldValue;

    const TEMPLATES: &str = r#"{"bill_templates": {"test_v1": {
        "headers": ["Fecha", "Descripción", "Valor", "Saldo"],
        "fields_to_extract": ["Fecha", "Descripción", "Valor", "Referencia"],
        "normalizers": {"Fecha": "date", "Valor": "amount"},
        "currency_split": {"foreign": {"Saldo": "!=0"}, "domestic": {"Saldo": "0"}},
        "exclude_descriptions": ["Pago PSE"]
    }}}"#;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn mapper() -> ExpenseMapper<TemplateRegistry> {
        ExpenseMapper::new(TemplateRegistry::from_json(TEMPLATES).unwrap())
    }

    fn table(rows: &[&[&str]]) -> Table {
        Table::from_rows(rows.iter().map(|r| row(r)).collect())
    }

    #[test]
    fn test_unknown_template_fails_fast() {
        let err = mapper().extract(&[], "missing_v1").unwrap_err();
        assert!(matches!(err, ExtractError::UnknownTemplate(_)));
    }

    #[test]
    fn test_projects_and_normalizes_fields() {
        let t = table(&[
            &["Fecha", "Descripción", "Valor", "Saldo"],
            &["25/02/2025", " UBER RIDES ", "$29,492.00", "0.00"],
        ]);
        let out = mapper().extract(&[t], "test_v1").unwrap();
        assert!(out.foreign_expenses.is_empty());
        let rec = &out.domestic_expenses[0];
        assert_eq!(rec.get("Fecha"), Some(&FieldValue::from("2025-02-25")));
        assert_eq!(rec.get("Descripción"), Some(&FieldValue::from("UBER RIDES")));
        assert_eq!(rec.get("Valor"), Some(&FieldValue::Amount(29492.0)));
        // Field with no column in the table
        assert_eq!(rec.get("Referencia"), Some(&FieldValue::from("")));
        let names: Vec<_> = rec.fields().map(|(k, _)| k).collect();
        assert_eq!(names, ["Fecha", "Descripción", "Valor", "Referencia"]);
    }

    #[test]
    fn test_skips_short_and_unrelated_tables() {
        let header_only = table(&[&["Fecha", "Descripción", "Valor", "Saldo"]]);
        let summary = table(&[&["Concepto", "Valor"], &["Pago mínimo", "100"]]);
        let out = mapper().extract(&[header_only, summary], "test_v1").unwrap();
        assert_eq!(out.total_records(), 0);
    }

    #[test]
    fn test_blank_and_excluded_rows_dropped() {
        let t = table(&[
            &["Fecha", "Descripción", "Valor", "Saldo"],
            &["", "", "", ""],
            &["01/02/2025", "PAGO PSE", "-500,000.00", "0"],
            &["01/02/2025", "CALATHEA", "34,500.00", "0"],
        ]);
        let out = mapper().extract(&[t], "test_v1").unwrap();
        assert_eq!(out.domestic_expenses.len(), 1);
        assert_eq!(
            out.domestic_expenses[0].get("Descripción"),
            Some(&FieldValue::from("CALATHEA"))
        );
    }

    #[test]
    fn test_whitespace_only_row_is_kept() {
        let t = table(&[
            &["Fecha", "Descripción", "Valor", "Saldo"],
            &[" ", "", "", ""],
        ]);
        let out = mapper().extract(&[t], "test_v1").unwrap();
        assert_eq!(out.total_records(), 1);
        let rec = &out.domestic_expenses[0];
        assert_eq!(rec.get("Fecha"), Some(&FieldValue::from("")));
        assert_eq!(rec.get("Valor"), Some(&FieldValue::Amount(0.0)));
    }

    #[test]
    fn test_whole_table_goes_to_one_bucket() {
        let t = table(&[
            &["Fecha", "Descripción", "Valor", "Saldo"],
            &["14/02/2025", "OPENAI", "20.00", "19.44"],
            &["14/02/2025", "NADEL", "1.00", "0"],
        ]);
        let out = mapper().extract(&[t], "test_v1").unwrap();
        assert_eq!(out.foreign_expenses.len(), 2);
        assert!(out.domestic_expenses.is_empty());
    }

    #[test]
    fn test_row_order_preserved_across_tables() {
        let a = table(&[
            &["Fecha", "Descripción", "Valor", "Saldo"],
            &["01/02/2025", "A1", "1", "0"],
            &["02/02/2025", "A2", "2", "0"],
        ]);
        let b = table(&[
            &["Saldo", "Valor", "Descripción", "Fecha"],
            &["0", "3", "B1", "03/02/2025"],
        ]);
        let out = mapper().extract(&[a, b], "test_v1").unwrap();
        let descs: Vec<_> = out
            .domestic_expenses
            .iter()
            .filter_map(|r| r.get("Descripción").and_then(FieldValue::as_text))
            .collect();
        assert_eq!(descs, ["A1", "A2", "B1"]);
    }

    #[test]
    fn test_mapper_borrows_registry() {
        let reg = TemplateRegistry::from_json(TEMPLATES).unwrap();
        let m = ExpenseMapper::new(&reg);
        assert!(m.extract(&[], "test_v1").unwrap().total_records() == 0);
        assert!(m.source().template("test_v1").is_ok());
    }
}
