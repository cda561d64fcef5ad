//! Loading saved document-analysis responses from disk.

use anyhow::{Context, Result};
use billtract_core::Table;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::reconstruct::reconstruct;
use crate::types::AnalysisDocument;

/// Parse an analysis response (`{"Blocks": [...]}`) from a JSON string.
pub fn parse_document(json: &str) -> Result<AnalysisDocument> {
    serde_json::from_str(json).context("parse analysis document JSON")
}

pub fn load_document(path: impl AsRef<Path>) -> Result<AnalysisDocument> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_document(&s).with_context(|| format!("parsing {}", path.display()))
}

/// Load a saved analysis response and rebuild its tables.
pub fn parse_document_file(path: impl AsRef<Path>) -> Result<Vec<Table>> {
    let path = path.as_ref();
    let doc = load_document(path)?;
    let tables = reconstruct(&doc.blocks);
    info!(
        path = %path.display(),
        blocks = doc.blocks.len(),
        tables = tables.len(),
        "parsed analysis document"
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockType;

    const DOC: &str = r#"{
        "DocumentMetadata": {"Pages": 1},
        "Blocks": [
            {"Id": "p1", "BlockType": "PAGE", "Relationships": [{"Type": "CHILD", "Ids": ["t1"]}]},
            {"Id": "t1", "BlockType": "TABLE", "Confidence": 99.1,
             "Relationships": [{"Type": "CHILD", "Ids": ["c1", "c2"]},
                               {"Type": "MERGED_CELL", "Ids": ["m1"]}]},
            {"Id": "c1", "BlockType": "CELL", "RowIndex": 1, "ColumnIndex": 1,
             "Relationships": [{"Type": "CHILD", "Ids": ["w1", "w2"]}]},
            {"Id": "c2", "BlockType": "CELL", "RowIndex": 2, "ColumnIndex": 1},
            {"Id": "m1", "BlockType": "MERGED_CELL", "RowIndex": 1, "ColumnIndex": 1},
            {"Id": "w1", "BlockType": "WORD", "Text": "Valor"},
            {"Id": "w2", "BlockType": "WORD", "Text": "Original"}
        ]
    }"#;

    #[test]
    fn test_parse_document_shape() {
        let doc = parse_document(DOC).unwrap();
        assert_eq!(doc.blocks.len(), 7);
        assert_eq!(doc.blocks[0].block_type, BlockType::Other);
        assert_eq!(doc.blocks[2].row_index, Some(1));
        assert_eq!(doc.blocks[5].text.as_deref(), Some("Valor"));
    }

    #[test]
    fn test_document_to_tables() {
        let doc = parse_document(DOC).unwrap();
        let tables = reconstruct(&doc.blocks);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].cell(0, 0), Some("Valor Original"));
        assert_eq!(tables[0].cell(1, 0), Some(""));
    }

    #[test]
    fn test_missing_blocks_key_is_empty_document() {
        let doc = parse_document("{}").unwrap();
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_document("not json").is_err());
    }
}
