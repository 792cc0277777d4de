//! Mapping link store: identity pairs between a source and a target model.
//!
//! Links only ever hold ids. Readers resolve them against the current
//! models and drop links whose nodes have gone.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::node::{Node, NodeId, NodeModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingLink {
    pub id: LinkId,
    pub source_id: NodeId,
    pub target_id: NodeId,
}

/// A link with both ends resolved to live nodes.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLink<'a> {
    pub link: &'a MappingLink,
    pub source: &'a Node,
    pub target: &'a Node,
}

#[derive(Debug, Clone, Default)]
pub struct LinkStore {
    links: Vec<MappingLink>,
    next: u64,
}

impl LinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links `source` to `target` unless the pair already exists.
    ///
    /// Callers must only pass leaves.
    pub fn add_link(&mut self, source: &Node, target: &Node) -> Option<LinkId> {
        self.insert(source.id.clone(), target.id.clone())
    }

    /// Id-level form of [`add_link`](Self::add_link).
    pub fn insert(&mut self, source_id: NodeId, target_id: NodeId) -> Option<LinkId> {
        if self.contains(&source_id, &target_id) {
            return None;
        }
        let id = LinkId(self.next);
        self.next += 1;
        self.links.push(MappingLink {
            id,
            source_id,
            target_id,
        });
        Some(id)
    }

    /// Removes a link. Returns `false` if it did not exist.
    pub fn delete_link(&mut self, id: LinkId) -> bool {
        let before = self.links.len();
        self.links.retain(|link| link.id != id);
        self.links.len() != before
    }

    /// Removes every link touching one of `deleted_ids`, returning how many
    /// were dropped.
    pub fn prune_links(&mut self, deleted_ids: &[NodeId]) -> usize {
        if deleted_ids.is_empty() {
            return 0;
        }
        let deleted: HashSet<&NodeId> = deleted_ids.iter().collect();
        let before = self.links.len();
        self.links
            .retain(|link| !deleted.contains(&link.source_id) && !deleted.contains(&link.target_id));
        let pruned = before - self.links.len();
        if pruned > 0 {
            debug!(pruned, "links pruned after node removal");
        }
        pruned
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }

    pub fn contains(&self, source_id: &NodeId, target_id: &NodeId) -> bool {
        self.links
            .iter()
            .any(|link| &link.source_id == source_id && &link.target_id == target_id)
    }

    pub fn get(&self, id: LinkId) -> Option<&MappingLink> {
        self.links.iter().find(|link| link.id == id)
    }

    pub fn links(&self) -> &[MappingLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Resolves links against the current models, skipping stale ones.
    pub fn resolve<'a>(
        &'a self,
        source: &'a NodeModel,
        target: &'a NodeModel,
    ) -> Vec<ResolvedLink<'a>> {
        self.links
            .iter()
            .filter_map(|link| match (source.get(&link.source_id), target.get(&link.target_id)) {
                (Some(source), Some(target)) => Some(ResolvedLink {
                    link,
                    source,
                    target,
                }),
                _ => {
                    warn!(link = %link.id, "skipping stale mapping link");
                    None
                }
            })
            .collect()
    }
}
