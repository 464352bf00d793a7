//! Column layout of feature tables.
//!
//! A table is a delimited text file: one header row, then one row per image
//! with the id first and the vector components after it.

pub const DELIMITER: char = ',';
pub const ID_COLUMN: &str = "filename";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBlock {
    pub prefix: String,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub id_column: String,
    pub blocks: Vec<ColumnBlock>,
}

impl TableSchema {
    /// `filename,feature_0,feature_1,...`
    pub fn generic(dimension: usize) -> Self {
        Self::with_blocks(&[("feature_", dimension)])
    }

    /// Several named runs of columns, e.g. `top_feature_*` then `bottom_feature_*`.
    pub fn with_blocks(blocks: &[(&str, usize)]) -> Self {
        Self {
            id_column: ID_COLUMN.to_string(),
            blocks: blocks
                .iter()
                .map(|&(prefix, len)| ColumnBlock {
                    prefix: prefix.to_string(),
                    len,
                })
                .collect(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.blocks.iter().map(|b| b.len).sum()
    }

    pub fn header(&self) -> String {
        let mut header = self.id_column.clone();
        for block in &self.blocks {
            for i in 0..block.len {
                header.push(DELIMITER);
                header.push_str(&block.prefix);
                header.push_str(&i.to_string());
            }
        }
        header
    }
}
