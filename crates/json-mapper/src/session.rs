//! Mapping session: the single owner of both documents and their links.
//!
//! Every mutation runs to completion before returning, and any node
//! removal on either side is applied to the link store in the same call.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::MapperConfig;
use crate::debounce::Debouncer;
use crate::edit::{self, EditError};
use crate::links::{LinkId, LinkStore, ResolvedLink};
use crate::metadata::{FieldMetadataStore, MetadataUpdate};
use crate::node::{Node, NodeId, NodeModel, NodeType};
use crate::normalize::normalize_with;
use crate::reconcile::reconcile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("{side} node `{id}` not found")]
    UnknownNode { side: Side, id: NodeId },
    #[error("{side} node `{id}` has children; only leaves can be mapped")]
    NotALeaf { side: Side, id: NodeId },
}

/// One side of the session: its node model and field metadata.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) model: NodeModel,
    pub(crate) metadata: FieldMetadataStore,
}

impl Document {
    pub fn new(id_prefix: &str) -> Self {
        Self {
            model: NodeModel::empty(id_prefix),
            metadata: FieldMetadataStore::new(),
        }
    }

    pub fn model(&self) -> &NodeModel {
        &self.model
    }

    pub fn metadata(&self) -> &FieldMetadataStore {
        &self.metadata
    }

    /// Replaces the model with `value`, keeping the id sequence going.
    pub(crate) fn replace(&mut self, value: &Value) {
        self.model = normalize_with(value, self.model.minter.clone(), None);
    }
}

/// Outcome of [`MappingSession::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub changed: bool,
    pub deleted_ids: Vec<NodeId>,
    pub pruned_links: usize,
}

#[derive(Debug, Clone)]
pub struct MappingSession {
    config: MapperConfig,
    source: Document,
    target: Document,
    links: LinkStore,
}

impl Default for MappingSession {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}

impl MappingSession {
    pub fn new(config: MapperConfig) -> Self {
        Self {
            source: Document::new(&config.source_prefix),
            target: Document::new(&config.target_prefix),
            links: LinkStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn document(&self, side: Side) -> &Document {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    pub(crate) fn document_mut(&mut self, side: Side) -> &mut Document {
        match side {
            Side::Source => &mut self.source,
            Side::Target => &mut self.target,
        }
    }

    pub fn model(&self, side: Side) -> &NodeModel {
        &self.document(side).model
    }

    pub fn metadata(&self, side: Side) -> &FieldMetadataStore {
        &self.document(side).metadata
    }

    pub fn links(&self) -> &LinkStore {
        &self.links
    }

    pub(crate) fn links_mut(&mut self) -> &mut LinkStore {
        &mut self.links
    }

    /// A debouncer for edited text, using the configured delay.
    pub fn text_debouncer(&self) -> Debouncer<String> {
        Debouncer::new(self.config.debounce())
    }

    // ── Documents ─────────────────────────────────────────────────────────

    /// Loads a new document on `side`. All links are cleared.
    pub fn load(&mut self, side: Side, value: &Value) {
        let doc = self.document_mut(side);
        doc.replace(value);
        let nodes = doc.model.len();
        self.links.clear();
        debug!(%side, nodes, "document loaded");
    }

    /// Applies an edited JSON value to `side`, keeping ids for unchanged
    /// paths and dropping links to nodes that disappeared.
    pub fn reconcile(&mut self, side: Side, value: &Value) -> ReconcileReport {
        let doc = self.document_mut(side);
        let outcome = reconcile(&doc.model, value);
        if !outcome.changed {
            return ReconcileReport {
                changed: false,
                deleted_ids: Vec::new(),
                pruned_links: 0,
            };
        }
        doc.model = outcome.model;
        let pruned_links = self.links.prune_links(&outcome.deleted_ids);
        ReconcileReport {
            changed: true,
            deleted_ids: outcome.deleted_ids,
            pruned_links,
        }
    }

    /// Current JSON of `side`, as shown in the text view.
    pub fn current_json(&self, side: Side) -> Value {
        self.model(side).to_value()
    }

    // ── Structural edits ──────────────────────────────────────────────────

    pub fn rename_key(&mut self, side: Side, id: &NodeId, new_key: &str) -> Result<(), EditError> {
        let doc = self.document_mut(side);
        edit::rename_key(&mut doc.model, &mut doc.metadata, id, new_key)
    }

    /// Retypes a node, pruning links to any descendants it loses.
    pub fn change_type(
        &mut self,
        side: Side,
        id: &NodeId,
        new_type: NodeType,
    ) -> Result<Vec<NodeId>, EditError> {
        let doc = self.document_mut(side);
        let removed = edit::change_type(&mut doc.model, &mut doc.metadata, id, new_type)?;
        self.links.prune_links(&removed);
        Ok(removed)
    }

    pub fn set_value(&mut self, side: Side, id: &NodeId, value: Value) -> Result<(), EditError> {
        edit::set_value(&mut self.document_mut(side).model, id, value)
    }

    /// Deletes a node and its subtree, pruning links into it.
    pub fn delete_node(&mut self, side: Side, id: &NodeId) -> Result<Vec<NodeId>, EditError> {
        let doc = self.document_mut(side);
        let removed = edit::delete_node(&mut doc.model, &mut doc.metadata, id)?;
        self.links.prune_links(&removed);
        Ok(removed)
    }

    pub fn set_metadata(&mut self, side: Side, path: &str, update: MetadataUpdate) {
        self.document_mut(side).metadata.set(path, update);
    }

    // ── Links ─────────────────────────────────────────────────────────────

    /// Links a source leaf to a target leaf. `Ok(None)` means the pair was
    /// already linked.
    pub fn link(&mut self, source_id: &NodeId, target_id: &NodeId) -> Result<Option<LinkId>, LinkError> {
        let source = leaf(&self.source.model, Side::Source, source_id)?;
        let target = leaf(&self.target.model, Side::Target, target_id)?;
        Ok(self.links.add_link(source, target))
    }

    pub fn unlink(&mut self, id: LinkId) -> bool {
        self.links.delete_link(id)
    }

    pub fn resolved_links(&self) -> Vec<ResolvedLink<'_>> {
        self.links.resolve(&self.source.model, &self.target.model)
    }

    /// Links whose source or target path, or either side's field
    /// description, contains `term` (case-insensitive).
    pub fn search_links(&self, term: &str) -> Vec<ResolvedLink<'_>> {
        let resolved = self.resolved_links();
        if term.is_empty() {
            return resolved;
        }
        let term = term.to_lowercase();
        let description = |store: &FieldMetadataStore, path: &str| {
            store
                .get(path)
                .is_some_and(|meta| meta.description.to_lowercase().contains(&term))
        };
        resolved
            .into_iter()
            .filter(|l| {
                l.source.path.to_lowercase().contains(&term)
                    || l.target.path.to_lowercase().contains(&term)
                    || description(&self.source.metadata, &l.source.path)
                    || description(&self.target.metadata, &l.target.path)
            })
            .collect()
    }

    /// Ids on `side` that take part in at least one live link. Links whose
    /// other end is gone are ignored like in [`Self::resolved_links`].
    pub fn mapped_ids(&self, side: Side) -> HashSet<&NodeId> {
        self.resolved_links()
            .into_iter()
            .map(|resolved| resolved.link)
            .map(|link| match side {
                Side::Source => &link.source_id,
                Side::Target => &link.target_id,
            })
            .collect()
    }
}

fn leaf<'a>(model: &'a NodeModel, side: Side, id: &NodeId) -> Result<&'a Node, LinkError> {
    let node = model.get(id).ok_or_else(|| LinkError::UnknownNode {
        side,
        id: id.clone(),
    })?;
    if node.has_children() {
        return Err(LinkError::NotALeaf {
            side,
            id: id.clone(),
        });
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_at(session: &MappingSession, side: Side, path: &str) -> NodeId {
        session.model(side).find_by_path(path).unwrap().id.clone()
    }

    fn linked_session() -> MappingSession {
        let mut session = MappingSession::default();
        session.load(Side::Source, &json!({"a": 1, "n": {"k": "v"}}));
        session.load(Side::Target, &json!({"b": 2, "c": 3}));
        let a = id_at(&session, Side::Source, "root.a");
        let b = id_at(&session, Side::Target, "root.b");
        session.link(&a, &b).unwrap();
        session
    }

    #[test]
    fn link_requires_leaves() {
        let mut session = linked_session();
        let n = id_at(&session, Side::Source, "root.n");
        let c = id_at(&session, Side::Target, "root.c");
        assert_eq!(
            session.link(&n, &c),
            Err(LinkError::NotALeaf {
                side: Side::Source,
                id: n.clone()
            })
        );
        let ghost = NodeId::new("target-node-77");
        assert!(matches!(
            session.link(&id_at(&session, Side::Source, "root.a"), &ghost),
            Err(LinkError::UnknownNode { side: Side::Target, .. })
        ));
    }

    #[test]
    fn duplicate_link_is_none() {
        let mut session = linked_session();
        let a = id_at(&session, Side::Source, "root.a");
        let b = id_at(&session, Side::Target, "root.b");
        assert_eq!(session.link(&a, &b), Ok(None));
        assert_eq!(session.links().len(), 1);
    }

    #[test]
    fn loading_clears_links_and_keeps_ids_fresh() {
        let mut session = linked_session();
        let old: Vec<NodeId> = session.model(Side::Target).ids().cloned().collect();
        session.load(Side::Target, &json!({"b": 2}));
        assert!(session.links().is_empty());
        let new_id = id_at(&session, Side::Target, "root.b");
        assert!(!old.contains(&new_id));
    }

    #[test]
    fn reconcile_prunes_links() {
        let mut session = linked_session();
        let a = id_at(&session, Side::Source, "root.a");
        let report = session.reconcile(Side::Source, &json!({"n": {"k": "v"}}));
        assert!(report.changed);
        assert_eq!(report.deleted_ids, vec![a]);
        assert_eq!(report.pruned_links, 1);
        assert!(session.links().is_empty());
    }

    #[test]
    fn reconcile_without_change_keeps_links() {
        let mut session = linked_session();
        let current = session.current_json(Side::Target);
        let report = session.reconcile(Side::Target, &current);
        assert!(!report.changed);
        assert_eq!(session.links().len(), 1);
    }

    #[test]
    fn structural_edits_prune_links() {
        let mut session = linked_session();
        let b = id_at(&session, Side::Target, "root.b");
        session.rename_key(Side::Target, &b, "bb").unwrap();
        assert_eq!(session.resolved_links()[0].target.path, "root.bb");

        session.delete_node(Side::Target, &b).unwrap();
        assert!(session.links().is_empty());
    }

    #[test]
    fn search_matches_paths_and_descriptions() {
        let mut session = linked_session();
        session.set_metadata(
            Side::Target,
            "root.b",
            MetadataUpdate::Description("Billing amount".into()),
        );
        assert_eq!(session.search_links("BILLING").len(), 1);
        assert_eq!(session.search_links("root.a").len(), 1);
        assert!(session.search_links("nothing").is_empty());
        assert_eq!(session.search_links("").len(), 1);
    }

    #[test]
    fn mapped_ids_skip_stale_links() {
        let mut session = linked_session();
        let c = id_at(&session, Side::Target, "root.c");
        session
            .links_mut()
            .insert(NodeId::new("source-node-99"), c.clone());
        assert_eq!(session.links().len(), 2);
        assert!(!session.mapped_ids(Side::Target).contains(&c));
        assert_eq!(session.mapped_ids(Side::Source).len(), 1);
    }

    #[test]
    fn mapped_ids_per_side() {
        let session = linked_session();
        let a = id_at(&session, Side::Source, "root.a");
        assert!(session.mapped_ids(Side::Source).contains(&a));
        assert_eq!(session.mapped_ids(Side::Target).len(), 1);
    }
}
