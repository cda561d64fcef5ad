//! Rectangular text tables reconstructed from a recognized document.

use serde::{Deserialize, Serialize};

/// A rectangular matrix of cell strings. Row 0 is the header row when the
/// table came from a statement section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Allocate an `n_rows x n_cols` table of empty cells.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            rows: vec![vec![String::new(); n_cols]; n_rows],
        }
    }

    /// Build a table from ragged rows, padding short rows with empty cells.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { rows }
    }

    /// Allocate an `n_rows x n_cols` table and fill it from 0-based
    /// `(row, col, text)` triples. Positions outside the table are dropped.
    pub fn from_cells<I>(n_rows: usize, n_cols: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, String)>,
    {
        let mut table = Self::new(n_rows, n_cols);
        for (row, col, text) in cells {
            table.set(row, col, text);
        }
        table
    }

    /// Overwrite a single cell. Out-of-range positions are ignored and
    /// reported as `false`.
    pub(crate) fn set(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = text.into();
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row, if any.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

impl From<Vec<Vec<String>>> for Table {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Table::from_rows(rows)
    }
}

impl From<Table> for Vec<Vec<String>> {
    fn from(table: Table) -> Self {
        table.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_new_is_rectangular_and_blank() {
        let t = Table::new(3, 4);
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.n_cols(), 4);
        assert!(t.rows().iter().all(|r| r.len() == 4 && r.iter().all(String::is_empty)));
    }

    #[test]
    fn test_from_rows_pads_ragged_rows() {
        let t = Table::from_rows(vec![row(&["a", "b", "c"]), row(&["d"])]);
        assert_eq!(t.rows()[1], row(&["d", "", ""]));
        assert_eq!(t.n_cols(), 3);
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut t = Table::new(1, 1);
        assert!(t.set(0, 0, "x"));
        assert!(!t.set(1, 0, "y"));
        assert_eq!(t.cell(0, 0), Some("x"));
    }

    #[test]
    fn test_from_cells_fills_positions_and_drops_out_of_range() {
        let t = Table::from_cells(
            2,
            2,
            vec![(1, 1, "x".to_string()), (0, 5, "lost".to_string())],
        );
        assert_eq!(t.rows(), &[row(&["", ""]), row(&["", "x"])][..]);
    }

    #[test]
    fn test_header_and_data_rows() {
        let t = Table::from_rows(vec![row(&["h"]), row(&["1"]), row(&["2"])]);
        assert_eq!(t.header(), Some(&row(&["h"])[..]));
        assert_eq!(t.data_rows().len(), 2);
        assert!(Table::default().data_rows().is_empty());
    }

    #[test]
    fn test_serializes_as_plain_matrix() {
        let t = Table::from_rows(vec![row(&["a", "b"]), row(&["c"])]);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"[["a","b"],["c",""]]"#);
        let back: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
