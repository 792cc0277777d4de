//! Export and re-import of a whole mapping session.
//!
//! Exported mapping paths drop the leading `root.`/`root`. On import both
//! documents are normalized afresh and each mapping path is parsed and
//! resolved back to the new ids; mappings that are malformed or no longer
//! resolve are skipped with a warning.

use std::collections::HashMap;

use json_field_path::{format_path, parse_path, parse_relative_path, strip_root, PathError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::metadata::FieldMetadataStore;
use crate::node::NodeId;
use crate::session::{MappingSession, Side};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid mapping document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("mapping document is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub source: String,
    pub target: String,
}

/// The persisted shape of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingExport {
    pub mappings: Vec<MappingEntry>,
    pub source_data_preview: Value,
    pub target_data_preview: Value,
    pub source_field_metadata: FieldMetadataStore,
    pub target_field_metadata: FieldMetadataStore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Mappings that became a new link.
    pub resolved: usize,
    /// Mappings repeating a pair already linked by an earlier entry.
    pub duplicates: usize,
    pub skipped: Vec<MappingEntry>,
}

/// Fields that must be present and non-null.
const REQUIRED_FIELDS: [&str; 3] = ["mappings", "source_field_metadata", "target_field_metadata"];
/// Fields that must be present; `null` is a valid document.
const PREVIEW_FIELDS: [&str; 2] = ["source_data_preview", "target_data_preview"];

impl MappingSession {
    /// Snapshot of the session in its persisted shape. Stale links are left
    /// out.
    pub fn export(&self) -> MappingExport {
        let mappings = self
            .resolved_links()
            .into_iter()
            .map(|link| MappingEntry {
                source: strip_root(&link.source.path).to_string(),
                target: strip_root(&link.target.path).to_string(),
            })
            .collect();
        MappingExport {
            mappings,
            source_data_preview: self.current_json(Side::Source),
            target_data_preview: self.current_json(Side::Target),
            source_field_metadata: self.metadata(Side::Source).clone(),
            target_field_metadata: self.metadata(Side::Target).clone(),
        }
    }

    /// Parses and imports an exported document.
    pub fn import_str(&mut self, text: &str) -> Result<ImportReport, ImportError> {
        let doc: Value = serde_json::from_str(text)?;
        self.import(&doc)
    }

    /// Replaces the whole session with an exported document.
    ///
    /// A missing top-level field fails the import and leaves the session
    /// untouched; unresolvable mapping entries are skipped.
    pub fn import(&mut self, doc: &Value) -> Result<ImportReport, ImportError> {
        for field in REQUIRED_FIELDS {
            if doc.get(field).map_or(true, Value::is_null) {
                return Err(ImportError::MissingField(field));
            }
        }
        for field in PREVIEW_FIELDS {
            if doc.get(field).is_none() {
                return Err(ImportError::MissingField(field));
            }
        }
        let export = MappingExport::deserialize(doc)?;

        self.load(Side::Source, &export.source_data_preview);
        self.load(Side::Target, &export.target_data_preview);
        self.document_mut(Side::Source).metadata = export.source_field_metadata;
        self.document_mut(Side::Target).metadata = export.target_field_metadata;

        let source_ids = self.model(Side::Source).path_index();
        let target_ids = self.model(Side::Target).path_index();

        let mut report = ImportReport::default();
        for entry in export.mappings {
            let source = lookup(&source_ids, &entry.source);
            let target = lookup(&target_ids, &entry.target);
            match (source, target) {
                (Ok(Some(source)), Ok(Some(target))) => {
                    match self.links_mut().insert(source.clone(), target.clone()) {
                        Some(_) => report.resolved += 1,
                        None => report.duplicates += 1,
                    }
                }
                (Err(err), _) | (_, Err(err)) => {
                    warn!(
                        source = %entry.source,
                        target = %entry.target,
                        error = %err,
                        "skipping mapping: malformed path"
                    );
                    report.skipped.push(entry);
                }
                _ => {
                    warn!(
                        source = %entry.source,
                        target = %entry.target,
                        "skipping mapping: path not found"
                    );
                    report.skipped.push(entry);
                }
            }
        }
        debug!(
            resolved = report.resolved,
            duplicates = report.duplicates,
            skipped = report.skipped.len(),
            "mapping document imported"
        );
        Ok(report)
    }
}

/// Resolves a mapping path against a `path -> id` index.
///
/// Exported paths have `root` stripped; a full path written by hand is
/// tried next. Both are canonicalized first, so `["a"]` finds `root.a`.
fn lookup<'a>(
    index: &'a HashMap<String, NodeId>,
    path: &str,
) -> Result<Option<&'a NodeId>, PathError> {
    let relative = parse_relative_path(path);
    if let Ok(steps) = &relative {
        if let Some(id) = index.get(&format_path(steps)) {
            return Ok(Some(id));
        }
    }
    match parse_path(path) {
        Ok(steps) => Ok(index.get(&format_path(&steps))),
        Err(_) => relative.map(|_| None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataUpdate;
    use serde_json::json;

    #[test]
    fn export_strips_root_prefix() {
        let mut session = MappingSession::default();
        session.load(Side::Source, &json!({"user": {"id": 1}}));
        session.load(Side::Target, &json!([{"uid": 0}]));
        let source = session.model(Side::Source).find_by_path("root.user.id").unwrap().id.clone();
        let target = session.model(Side::Target).find_by_path("root[0].uid").unwrap().id.clone();
        session.link(&source, &target).unwrap();
        session.set_metadata(Side::Source, "root.user.id", MetadataUpdate::Required(true));

        let export = serde_json::to_value(session.export()).unwrap();
        assert_eq!(export["mappings"], json!([{"source": "user.id", "target": "[0].uid"}]));
        assert_eq!(export["target_data_preview"], json!([{"uid": 0}]));
        assert_eq!(export["source_field_metadata"]["root.user.id"]["required"], json!(true));
    }

    #[test]
    fn missing_fields_are_fatal() {
        let mut session = MappingSession::default();
        session.load(Side::Source, &json!({"keep": 1}));
        let err = session
            .import(&json!({
                "mappings": [],
                "source_data_preview": {},
                "source_field_metadata": {},
                "target_field_metadata": {}
            }))
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingField("target_data_preview")));
        assert_eq!(session.current_json(Side::Source), json!({"keep": 1}));

        let err = session
            .import(&json!({
                "mappings": null,
                "source_data_preview": {},
                "target_data_preview": {},
                "source_field_metadata": {},
                "target_field_metadata": {}
            }))
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingField("mappings")));
    }

    #[test]
    fn null_previews_are_documents() {
        let mut session = MappingSession::default();
        let report = session
            .import(&json!({
                "mappings": [{"source": "", "target": ""}],
                "source_data_preview": null,
                "target_data_preview": "x",
                "source_field_metadata": {},
                "target_field_metadata": {}
            }))
            .unwrap();
        assert_eq!(report.resolved, 1);
        assert_eq!(session.current_json(Side::Source), json!(null));
        assert_eq!(session.current_json(Side::Target), json!("x"));
    }

    #[test]
    fn keys_starting_with_root_survive() {
        let mut session = MappingSession::default();
        session.load(Side::Source, &json!({"rootage": 1, "root": {"x": 2}}));
        session.load(Side::Target, &json!({"t": 0, "u": 0}));
        let rootage = session.model(Side::Source).find_by_path("root.rootage").unwrap().id.clone();
        let nested = session.model(Side::Source).find_by_path("root.root.x").unwrap().id.clone();
        let t = session.model(Side::Target).find_by_path("root.t").unwrap().id.clone();
        let u = session.model(Side::Target).find_by_path("root.u").unwrap().id.clone();
        session.link(&rootage, &t).unwrap();
        session.link(&nested, &u).unwrap();

        let export = serde_json::to_value(session.export()).unwrap();
        assert_eq!(export["mappings"][0]["source"], json!("rootage"));
        assert_eq!(export["mappings"][1]["source"], json!("root.x"));

        let mut restored = MappingSession::default();
        let report = restored.import(&export).unwrap();
        assert_eq!(report.resolved, 2);
        let paths: Vec<_> = restored
            .resolved_links()
            .iter()
            .map(|l| l.source.path.clone())
            .collect();
        assert_eq!(paths, ["root.rootage", "root.root.x"]);
    }

    fn two_leaf_doc(mappings: Value) -> Value {
        json!({
            "mappings": mappings,
            "source_data_preview": {"a": 1, "list": [0]},
            "target_data_preview": {"b": 1},
            "source_field_metadata": {},
            "target_field_metadata": {}
        })
    }

    #[test]
    fn repeated_mappings_count_once() {
        let mut session = MappingSession::default();
        let report = session
            .import(&two_leaf_doc(json!([
                {"source": "a", "target": "b"},
                {"source": "root.a", "target": "b"}
            ])))
            .unwrap();
        assert_eq!(report.resolved, 1);
        assert_eq!(report.duplicates, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(session.links().len(), 1);
    }

    #[test]
    fn malformed_paths_are_skipped() {
        let mut session = MappingSession::default();
        let report = session
            .import(&two_leaf_doc(json!([
                {"source": "list[01]", "target": "b"},
                {"source": "a", "target": "b["},
                {"source": "list[0]", "target": "b"}
            ])))
            .unwrap();
        assert_eq!(report.resolved, 1);
        let skipped: Vec<_> = report.skipped.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(skipped, ["list[01]", "a"]);
    }

    #[test]
    fn quoted_plain_keys_resolve() {
        let mut session = MappingSession::default();
        let report = session
            .import(&two_leaf_doc(json!([{"source": r#"["a"]"#, "target": "b"}])))
            .unwrap();
        assert_eq!(report.resolved, 1);
        assert_eq!(session.resolved_links()[0].source.path, "root.a");
    }

    #[test]
    fn malformed_text_is_json_error() {
        let mut session = MappingSession::default();
        assert!(matches!(session.import_str("{"), Err(ImportError::Json(_))));
    }
}
