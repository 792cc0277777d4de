//! Normalizer: raw JSON value -> [`NodeModel`].
//!
//! A top-level object or array contributes its members as the roots; a
//! top-level scalar becomes one synthetic root keyed `"value"` at path
//! `root`. Traversal is depth-first and every node's path is built by
//! appending `.key` (objects) or `[index]` (arrays) to its parent's.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use json_field_path::{child_path, ROOT};
use serde_json::Value;

use crate::node::{IdMinter, Node, NodeId, NodeModel, NodeType, RootKind, SCALAR_ROOT_KEY};

/// `path -> id` lookup consulted before minting a fresh id.
pub type ReuseIds = HashMap<String, NodeId>;

/// Normalizes `json` into a fresh model whose minted ids carry `id_prefix`.
///
/// When `reuse_ids` holds a node's computed path, that id is used instead
/// of a new one. Minted ids never coincide with any id in `reuse_ids`.
pub fn normalize(json: &Value, id_prefix: &str, reuse_ids: Option<&ReuseIds>) -> NodeModel {
    normalize_with(json, IdMinter::new(id_prefix), reuse_ids)
}

/// Same as [`normalize`], continuing an existing id sequence.
pub(crate) fn normalize_with(
    json: &Value,
    minter: IdMinter,
    reuse_ids: Option<&ReuseIds>,
) -> NodeModel {
    let mut walker = Walker {
        nodes: IndexMap::new(),
        minter,
        reserved: reuse_ids
            .map(|ids| ids.values().cloned().collect())
            .unwrap_or_default(),
        reuse_ids,
    };

    let (root_ids, root_kind) = match json {
        Value::Object(_) => (walker.members(json, None, 0, ROOT), RootKind::Object),
        Value::Array(_) => (walker.members(json, None, 0, ROOT), RootKind::Array),
        scalar => {
            let id = walker.id_for(ROOT);
            walker.nodes.insert(
                id.clone(),
                Node {
                    id: id.clone(),
                    key: SCALAR_ROOT_KEY.to_string(),
                    value: scalar.clone(),
                    node_type: NodeType::of(scalar),
                    level: 0,
                    parent_id: None,
                    path: ROOT.to_string(),
                    children_ids: Vec::new(),
                },
            );
            (vec![id], RootKind::Scalar)
        }
    };

    NodeModel {
        nodes: walker.nodes,
        root_ids,
        root_kind,
        minter: walker.minter,
    }
}

struct Walker<'a> {
    nodes: IndexMap<NodeId, Node>,
    minter: IdMinter,
    reuse_ids: Option<&'a ReuseIds>,
    /// Every id `reuse_ids` may hand out; the minter skips these.
    reserved: HashSet<NodeId>,
}

impl Walker<'_> {
    fn id_for(&mut self, path: &str) -> NodeId {
        match self.reuse_ids.and_then(|ids| ids.get(path)) {
            Some(id) if !self.nodes.contains_key(id) => id.clone(),
            _ => self.fresh_id(),
        }
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = self.minter.mint();
            if !self.reserved.contains(&id) {
                return id;
            }
        }
    }

    /// Normalizes the members of `container`, returning their ids in order.
    fn members(
        &mut self,
        container: &Value,
        parent_id: Option<&NodeId>,
        level: usize,
        parent_path: &str,
    ) -> Vec<NodeId> {
        match container {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    self.member(idx.to_string(), item, parent_id, level, parent_path, true)
                })
                .collect(),
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| {
                    self.member(key.clone(), item, parent_id, level, parent_path, false)
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn member(
        &mut self,
        key: String,
        value: &Value,
        parent_id: Option<&NodeId>,
        level: usize,
        parent_path: &str,
        in_array: bool,
    ) -> NodeId {
        let path = child_path(parent_path, &key, in_array);
        let id = self.id_for(&path);
        let node_type = NodeType::of(value);
        let composite = node_type.is_composite();

        // Parent goes in first so the map reads in pre-order.
        self.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                key,
                value: if composite { Value::Null } else { value.clone() },
                node_type,
                level,
                parent_id: parent_id.cloned(),
                path: path.clone(),
                children_ids: Vec::new(),
            },
        );

        if composite {
            let children = self.members(value, Some(&id), level + 1, &path);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children_ids = children;
            }
        }
        id
    }
}
