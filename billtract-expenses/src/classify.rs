//! Header matching and table-level currency classification.

use billtract_core::{Currency, Table};
use std::collections::HashMap;

use crate::normalize::parse_amount;
use crate::template::{CurrencySplit, RuleSet};

/// Lowercased, trimmed header cell -> column index. Later duplicates win.
pub fn header_index(header: &[String]) -> HashMap<String, usize> {
    header
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

/// True when every expected header is present in `header`, ignoring case,
/// surrounding whitespace, order and extra columns.
pub fn header_matches(expected: &[String], header: &[String]) -> bool {
    let index = header_index(header);
    expected
        .iter()
        .all(|h| index.contains_key(&h.trim().to_lowercase()))
}

/// Whether `row` satisfies every condition of `rules`. A rule naming a
/// column the table lacks fails the whole set; an empty set always holds.
pub fn rule_set_matches(rules: &RuleSet, row: &[String], index: &HashMap<String, usize>) -> bool {
    rules.iter().all(|(column, condition)| {
        index
            .get(&column.trim().to_lowercase())
            .map(|&i| condition.holds(parse_amount(row.get(i).map(String::as_str).unwrap_or(""))))
            .unwrap_or(false)
    })
}

/// Classify a whole table from its first data row that matches either rule
/// set, checking `foreign` before `domestic` on each row. Tables where no
/// row matches are domestic.
pub fn classify_currency(table: &Table, split: &CurrencySplit) -> Currency {
    let Some(header) = table.header() else {
        return Currency::Domestic;
    };
    let index = header_index(header);

    for row in table.data_rows() {
        if rule_set_matches(&split.foreign, row, &index) {
            return Currency::Foreign;
        }
        if rule_set_matches(&split.domestic, row, &index) {
            return Currency::Domestic;
        }
    }

    Currency::Domestic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Condition;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn split(foreign: &[(&str, Condition)], domestic: &[(&str, Condition)]) -> CurrencySplit {
        CurrencySplit {
            foreign: foreign.iter().map(|(c, k)| (c.to_string(), *k)).collect(),
            domestic: domestic.iter().map(|(c, k)| (c.to_string(), *k)).collect(),
        }
    }

    #[test]
    fn test_header_matches_any_order_with_extras() {
        let expected = row(&["Descripción", "Fecha de Transacción"]);
        let header = row(&["Extra", " fecha de transacción ", "Tasa", "DESCRIPCIÓN"]);
        assert!(header_matches(&expected, &header));
    }

    #[test]
    fn test_header_missing_column_fails() {
        let expected = row(&["Descripción", "Cuotas"]);
        let header = row(&["Descripción", "Valor"]);
        assert!(!header_matches(&expected, &header));
    }

    #[test]
    fn test_first_matching_row_wins() {
        let table = Table::from_rows(vec![
            row(&["Desc", "Cargos"]),
            row(&["A", "0.19"]),
            row(&["B", "0"]),
        ]);
        let s = split(
            &[("Cargos", Condition::NotEqualsZero)],
            &[("Cargos", Condition::EqualsZero)],
        );
        assert_eq!(classify_currency(&table, &s), Currency::Foreign);

        let flipped = Table::from_rows(vec![
            row(&["Desc", "Cargos"]),
            row(&["B", "0"]),
            row(&["A", "0.19"]),
        ]);
        assert_eq!(classify_currency(&flipped, &s), Currency::Domestic);
    }

    #[test]
    fn test_foreign_checked_before_domestic_on_same_row() {
        let table = Table::from_rows(vec![row(&["Saldo", "Tasa"]), row(&["5", "0"])]);
        let s = split(
            &[("Saldo", Condition::NotEqualsZero)],
            &[("Tasa", Condition::EqualsZero)],
        );
        assert_eq!(classify_currency(&table, &s), Currency::Foreign);
    }

    #[test]
    fn test_missing_rule_column_fails_rule_set() {
        let table = Table::from_rows(vec![row(&["Desc"]), row(&["A"])]);
        let s = split(
            &[("Tasa", Condition::EqualsZero)],
            &[("Tasa", Condition::EqualsZero)],
        );
        assert_eq!(classify_currency(&table, &s), Currency::Domestic);

        let rules: RuleSet = [
            ("Desc".to_string(), Condition::EqualsZero),
            ("Tasa".to_string(), Condition::EqualsZero),
        ]
        .into_iter()
        .collect();
        let index = header_index(&row(&["Desc"]));
        assert!(!rule_set_matches(&rules, &row(&["A"]), &index));
    }

    #[test]
    fn test_empty_foreign_rule_set_holds_for_every_row() {
        let table = Table::from_rows(vec![row(&["Saldo"]), row(&["0"])]);
        let s = split(&[], &[("Saldo", Condition::EqualsZero)]);
        assert_eq!(classify_currency(&table, &s), Currency::Foreign);
    }

    #[test]
    fn test_empty_domestic_rule_set_catches_non_foreign_rows() {
        let table = Table::from_rows(vec![row(&["Saldo"]), row(&["0"]), row(&["6.63"])]);
        let s = split(&[("Saldo", Condition::NotEqualsZero)], &[]);
        assert_eq!(classify_currency(&table, &s), Currency::Domestic);
    }

    #[test]
    fn test_multi_condition_rule_requires_all() {
        let index = header_index(&row(&["Tasa", "Saldo"]));
        let rules: RuleSet = [
            ("Tasa".to_string(), Condition::NotEqualsZero),
            ("Saldo".to_string(), Condition::NotEqualsZero),
        ]
        .into_iter()
        .collect();
        assert!(rule_set_matches(&rules, &row(&["1,9598", "6.63"]), &index));
        assert!(!rule_set_matches(&rules, &row(&["", "6.63"]), &index));
    }

    #[test]
    fn test_no_match_defaults_to_domestic() {
        let table = Table::from_rows(vec![row(&["Cargos"]), row(&["abc"])]);
        let s = split(
            &[("Cargos", Condition::NotEqualsZero)],
            &[("Tasa", Condition::EqualsZero)],
        );
        assert_eq!(classify_currency(&table, &s), Currency::Domestic);
        let header_only = Table::from_rows(vec![row(&["Cargos"])]);
        assert_eq!(classify_currency(&header_only, &CurrencySplit::default()), Currency::Domestic);
    }
}
