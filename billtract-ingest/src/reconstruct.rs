//! Table reconstruction from a flat block graph.
//!
//! A document-analysis result is a flat list of blocks linked by CHILD
//! relationships: TABLE -> CELL -> WORD. Each TABLE becomes one rectangular
//! [`Table`], sized from the largest row/column index among its cells.
//!
//! Broken graphs are tolerated: a table without cells is dropped, a cell
//! with a missing or out-of-range index is dropped, and a dangling child id
//! contributes no text. None of these abort the document.

use std::collections::HashMap;

use billtract_core::Table;
use tracing::{debug, warn};

use crate::types::{Block, BlockType};

/// Largest row or column index accepted from a CELL. Tables are per page,
/// so anything beyond this is a corrupt index.
pub const MAX_TABLE_DIMENSION: usize = 1_000;

/// Rebuild every TABLE block into a text matrix, in input order.
pub fn reconstruct(blocks: &[Block]) -> Vec<Table> {
    let index: HashMap<&str, &Block> = blocks.iter().map(|b| (b.id.as_str(), b)).collect();

    blocks
        .iter()
        .filter(|b| b.block_type == BlockType::Table)
        .filter_map(|table| build_table(table, &index))
        .collect()
}

fn build_table(table: &Block, index: &HashMap<&str, &Block>) -> Option<Table> {
    let mut cells: Vec<(usize, usize, &Block)> = Vec::new();

    for id in table.child_ids() {
        let Some(&child) = index.get(id) else {
            warn!(table = %table.id, child = %id, "table references a missing block");
            continue;
        };
        if child.block_type != BlockType::Cell {
            continue;
        }
        match (child.row_index, child.column_index) {
            (Some(r), Some(c)) if r > 0 && c > 0 => {
                let (r, c) = (r as usize, c as usize);
                if r > MAX_TABLE_DIMENSION || c > MAX_TABLE_DIMENSION {
                    warn!(cell = %child.id, row = r, col = c, "cell index out of range");
                    continue;
                }
                cells.push((r, c, child));
            }
            _ => warn!(cell = %child.id, "cell without a valid row/column index"),
        }
    }

    let max_row = cells.iter().map(|(r, _, _)| *r).max();
    let max_col = cells.iter().map(|(_, c, _)| *c).max();
    let (Some(max_row), Some(max_col)) = (max_row, max_col) else {
        warn!(table = %table.id, "table has no cells; skipping");
        return None;
    };

    let matrix = Table::from_cells(
        max_row,
        max_col,
        cells
            .into_iter()
            .map(|(r, c, cell)| (r - 1, c - 1, cell_text(cell, index))),
    );

    debug!(table = %table.id, rows = max_row, cols = max_col, "reconstructed table");
    Some(matrix)
}

/// WORD children of a cell joined by single spaces.
fn cell_text(cell: &Block, index: &HashMap<&str, &Block>) -> String {
    let mut words = Vec::new();
    for id in cell.child_ids() {
        match index.get(id) {
            Some(b) if b.block_type == BlockType::Word => {
                if let Some(text) = b.text.as_deref() {
                    words.push(text);
                }
            }
            Some(_) => {}
            None => warn!(cell = %cell.id, child = %id, "cell references a missing block"),
        }
    }
    words.join(" ")
}
