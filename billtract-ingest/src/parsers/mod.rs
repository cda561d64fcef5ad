//! Text-based statement parsers.

pub mod statement_lines;

pub use statement_lines::{StatementLine, parse_lines, parse_statement_lines};
