//! Flat table projection: one row per node joined with its metadata.

use serde_json::Value;

use crate::metadata::{FieldMetadata, FieldMetadataStore};
use crate::node::{Node, NodeModel};
use crate::serialize::display_text;

#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    pub node: &'a Node,
    pub metadata: Option<&'a FieldMetadata>,
}

impl TableRow<'_> {
    /// Scalar payload as text; empty for composites and `null`.
    pub fn display_value(&self) -> String {
        if self.node.node_type.is_composite() || self.node.value == Value::Null {
            return String::new();
        }
        display_text(&self.node.value)
    }

    pub fn description(&self) -> &str {
        self.metadata.map_or("", |meta| meta.description.as_str())
    }

    pub fn example(&self) -> &str {
        self.metadata.map_or("", |meta| meta.example.as_str())
    }

    fn matches(&self, term: &str) -> bool {
        [
            self.node.path.as_str(),
            self.node.key.as_str(),
            self.display_value().as_str(),
            self.description(),
            self.example(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
    }
}

/// Rows for every node in model order.
pub fn rows<'a>(model: &'a NodeModel, metadata: &'a FieldMetadataStore) -> Vec<TableRow<'a>> {
    model
        .iter()
        .map(|node| TableRow {
            node,
            metadata: metadata.get(&node.path),
        })
        .collect()
}

/// Rows where path, key, value, description or example contains `term`
/// (case-insensitive).
pub fn filter_rows<'a>(rows: &[TableRow<'a>], term: &str) -> Vec<TableRow<'a>> {
    if term.is_empty() {
        return rows.to_vec();
    }
    let term = term.to_lowercase();
    rows.iter().filter(|row| row.matches(&term)).copied().collect()
}
