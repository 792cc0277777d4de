//! Field metadata: descriptive annotations keyed by path.
//!
//! Entries survive reconciliation (which may assign new ids to the same
//! path) and are moved only when a structural edit changes a path.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::paths::PathChange;

/// Annotation attached to one field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMetadata {
    pub description: String,
    pub example: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl Default for FieldMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            example: String::new(),
            required: false,
            field_type: "unknown".to_string(),
        }
    }
}

/// A single-field write to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataUpdate {
    Description(String),
    Example(String),
    Required(bool),
    Type(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMetadataStore {
    entries: IndexMap<String, FieldMetadata>,
}

impl FieldMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&FieldMetadata> {
        self.entries.get(path)
    }

    /// The entry at `path`, created with defaults on first access.
    pub fn entry_mut(&mut self, path: &str) -> &mut FieldMetadata {
        self.entries.entry(path.to_string()).or_default()
    }

    pub fn set(&mut self, path: &str, update: MetadataUpdate) {
        let entry = self.entry_mut(path);
        match update {
            MetadataUpdate::Description(text) => entry.description = text,
            MetadataUpdate::Example(text) => entry.example = text,
            MetadataUpdate::Required(required) => entry.required = required,
            MetadataUpdate::Type(ty) => entry.field_type = ty,
        }
    }

    /// Sets the `type` of an existing entry; absent entries stay absent.
    pub fn update_type(&mut self, path: &str, field_type: &str) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.field_type = field_type.to_string();
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<FieldMetadata> {
        self.entries.shift_remove(path)
    }

    /// Moves entries from each change's old path to its new path.
    ///
    /// All old keys are vacated before any entry is re-inserted, so chains
    /// such as `[2] -> [1]`, `[3] -> [2]` move every entry exactly once.
    pub fn migrate(&mut self, changes: &[PathChange]) {
        let moved: Vec<(String, FieldMetadata)> = changes
            .iter()
            .filter_map(|change| {
                self.entries
                    .shift_remove(&change.old_path)
                    .map(|entry| (change.new_path.clone(), entry))
            })
            .collect();
        for (path, entry) in moved {
            self.entries.insert(path, entry);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldMetadata)> {
        self.entries.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
