//! billtract-ingest: document-analysis block model, table reconstruction, and raw-text parsers.

pub mod document;
pub mod parsers;
pub mod reconstruct;
pub mod types;

pub use document::{load_document, parse_document, parse_document_file};
pub use reconstruct::reconstruct;
pub use types::{AnalysisDocument, Block, BlockType, Relationship, RelationshipType};
