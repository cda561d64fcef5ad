use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockType {
    Table,
    Cell,
    Word,
    /// PAGE, LINE, MERGED_CELL, KEY_VALUE_SET, ... (not used for tables)
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationshipType {
    Child,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Relationship {
    #[serde(rename = "Type")]
    pub kind: RelationshipType,
    #[serde(default)]
    pub ids: Vec<String>,
}

/// One recognized unit of a document-analysis result (table, cell, word, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub id: String,
    pub block_type: BlockType,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// 1-based, CELL blocks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,
    /// 1-based, CELL blocks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,
    /// WORD blocks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Block {
    pub fn table(id: impl Into<String>, cell_ids: Vec<String>) -> Self {
        Self::with_children(id, BlockType::Table, cell_ids)
    }

    pub fn cell(id: impl Into<String>, row: u32, col: u32, word_ids: Vec<String>) -> Self {
        let mut block = Self::with_children(id, BlockType::Cell, word_ids);
        block.row_index = Some(row);
        block.column_index = Some(col);
        block
    }

    pub fn word(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: BlockType::Word,
            relationships: Vec::new(),
            row_index: None,
            column_index: None,
            text: Some(text.into()),
        }
    }

    fn with_children(id: impl Into<String>, block_type: BlockType, ids: Vec<String>) -> Self {
        let relationships = if ids.is_empty() {
            Vec::new()
        } else {
            vec![Relationship {
                kind: RelationshipType::Child,
                ids,
            }]
        };
        Self {
            id: id.into(),
            block_type,
            relationships,
            row_index: None,
            column_index: None,
            text: None,
        }
    }

    /// Ids of all CHILD relationships, in relationship order.
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(|rel| rel.kind == RelationshipType::Child)
            .flat_map(|rel| rel.ids.iter().map(String::as_str))
    }
}

/// Top-level document-analysis response envelope (`{"Blocks": [...]}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    #[serde(rename = "Blocks", default)]
    pub blocks: Vec<Block>,
}
