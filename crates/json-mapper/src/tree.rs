//! Nested tree projection of a flat model, built on demand for tree views.

use serde_json::Value;

use crate::node::{Node, NodeId, NodeModel};
use crate::serialize::display_text;

#[derive(Debug, Clone)]
pub struct TreeNode<'a> {
    pub node: &'a Node,
    pub children: Vec<TreeNode<'a>>,
}

/// Builds the tree under the model's roots. Ids missing from the map are
/// skipped.
pub fn build_tree(model: &NodeModel) -> Vec<TreeNode<'_>> {
    build_level(model, model.root_ids())
}

fn build_level<'a>(model: &'a NodeModel, ids: &[NodeId]) -> Vec<TreeNode<'a>> {
    ids.iter()
        .filter_map(|id| model.get(id))
        .map(|node| TreeNode {
            node,
            children: build_level(model, &node.children_ids),
        })
        .collect()
}

/// Keeps nodes whose key or scalar value contains `term`
/// (case-insensitive), plus the ancestors of any match.
pub fn filter_tree<'a>(nodes: &[TreeNode<'a>], term: &str) -> Vec<TreeNode<'a>> {
    if term.is_empty() {
        return nodes.to_vec();
    }
    filter_level(nodes, &term.to_lowercase())
}

fn filter_level<'a>(nodes: &[TreeNode<'a>], term: &str) -> Vec<TreeNode<'a>> {
    nodes
        .iter()
        .filter_map(|tree| {
            let children = filter_level(&tree.children, term);
            let value_matches = !matches!(tree.node.value, Value::Null)
                && display_text(&tree.node.value).to_lowercase().contains(term);
            let matches = tree.node.key.to_lowercase().contains(term) || value_matches;
            (matches || !children.is_empty()).then(|| TreeNode {
                node: tree.node,
                children,
            })
        })
        .collect()
}
