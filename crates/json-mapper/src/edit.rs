//! Structural mutators used by the tree and table views.
//!
//! Unlike text reconciliation these keep node identity: a rename moves
//! the node's path (and its metadata) but leaves its id alone.

use serde_json::Value;
use thiserror::Error;

use crate::metadata::FieldMetadataStore;
use crate::node::{NodeId, NodeModel, NodeType, RootKind};
use crate::paths::reparent_paths;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("node `{0}` not found")]
    NodeNotFound(NodeId),
    #[error("a sibling already uses key `{0}`")]
    DuplicateKey(String),
    #[error("array elements are addressed by index and cannot be renamed")]
    ArrayElementKey,
    #[error("the root of a scalar document cannot be renamed")]
    ScalarRoot,
    #[error("node `{0}` has children")]
    NotALeaf(NodeId),
    #[error("leaf values must be scalars")]
    NotAScalar,
}

/// Renames the key of `id`, recomputing its subtree's paths.
pub fn rename_key(
    model: &mut NodeModel,
    metadata: &mut FieldMetadataStore,
    id: &NodeId,
    new_key: &str,
) -> Result<(), EditError> {
    let node = model
        .get(id)
        .ok_or_else(|| EditError::NodeNotFound(id.clone()))?;
    if node.key == new_key {
        return Ok(());
    }
    let parent = node.parent_id.clone();
    if parent.is_none() && model.root_kind() == RootKind::Scalar {
        return Err(EditError::ScalarRoot);
    }
    if model.is_array_parent(parent.as_ref()) {
        return Err(EditError::ArrayElementKey);
    }
    let taken = model
        .child_ids(parent.as_ref())
        .iter()
        .filter(|sibling| *sibling != id)
        .filter_map(|sibling| model.get(sibling))
        .any(|sibling| sibling.key == new_key);
    if taken {
        return Err(EditError::DuplicateKey(new_key.to_string()));
    }

    let parent_path = model.parent_path(parent.as_ref());
    if let Some(node) = model.get_mut(id) {
        node.key = new_key.to_string();
    }
    reparent_paths(model, metadata, id, &parent_path, false);
    Ok(())
}

/// Retypes `id`. The payload resets to the type's default and all
/// descendants are removed along with their metadata; their ids are
/// returned so links can be pruned.
pub fn change_type(
    model: &mut NodeModel,
    metadata: &mut FieldMetadataStore,
    id: &NodeId,
    new_type: NodeType,
) -> Result<Vec<NodeId>, EditError> {
    let node = model
        .get(id)
        .ok_or_else(|| EditError::NodeNotFound(id.clone()))?;
    if node.node_type == new_type {
        return Ok(Vec::new());
    }
    let path = node.path.clone();
    let children = node.children_ids.clone();

    let removed: Vec<NodeId> = children
        .iter()
        .flat_map(|child| model.remove_subtree(child))
        .map(|node| {
            metadata.remove(&node.path);
            node.id
        })
        .collect();

    if let Some(node) = model.get_mut(id) {
        node.node_type = new_type;
        node.value = new_type.default_value();
        node.children_ids.clear();
    }
    metadata.update_type(&path, new_type.as_str());
    Ok(removed)
}

/// Stores a raw scalar payload (typically table-edited text) on a leaf.
pub fn set_value(model: &mut NodeModel, id: &NodeId, value: Value) -> Result<(), EditError> {
    if value.is_object() || value.is_array() {
        return Err(EditError::NotAScalar);
    }
    let node = model
        .get_mut(id)
        .ok_or_else(|| EditError::NodeNotFound(id.clone()))?;
    if node.has_children() || node.node_type.is_composite() {
        return Err(EditError::NotALeaf(id.clone()));
    }
    node.value = value;
    Ok(())
}

/// Deletes `id` and its subtree, returning every removed id.
///
/// Metadata of removed paths is dropped. Removing an array element
/// re-keys the elements after it and moves their paths down by one.
pub fn delete_node(
    model: &mut NodeModel,
    metadata: &mut FieldMetadataStore,
    id: &NodeId,
) -> Result<Vec<NodeId>, EditError> {
    let parent = model
        .get(id)
        .ok_or_else(|| EditError::NodeNotFound(id.clone()))?
        .parent_id
        .clone();

    let removed = model.remove_subtree(id);
    for node in &removed {
        metadata.remove(&node.path);
    }
    if let Some(siblings) = model.child_ids_mut(parent.as_ref()) {
        siblings.retain(|sibling| sibling != id);
    }

    if model.is_array_parent(parent.as_ref()) {
        let parent_path = model.parent_path(parent.as_ref());
        let siblings = model.child_ids(parent.as_ref()).to_vec();
        for (idx, sibling) in siblings.iter().enumerate() {
            let key = idx.to_string();
            let Some(node) = model.get_mut(sibling) else {
                continue;
            };
            if node.key != key {
                node.key = key;
                reparent_paths(model, metadata, sibling, &parent_path, true);
            }
        }
    }

    Ok(removed.into_iter().map(|node| node.id).collect())
}
