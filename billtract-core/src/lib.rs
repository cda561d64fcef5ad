//! billtract-core: shared data model for bill table reconstruction and expense mapping

pub mod expense;
pub mod table;

pub use expense::{Currency, ExpenseRecord, ExtractedExpenses, FieldValue};
pub use table::Table;
