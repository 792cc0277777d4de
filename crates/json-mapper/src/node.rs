//! Node model: flat `id -> Node` storage plus the ordered root list.
//!
//! # Invariants
//!
//! - Every id listed in some node's `children_ids` (or in `root_ids`) is a
//!   key of the map.
//! - A node with children has type `object` or `array`; for `array` the
//!   child order is the index order.
//! - No two nodes share a `path`.
//! - Ids are minted from a per-document counter and never handed out twice,
//!   including across reconciliations and reloads of the same document.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use json_field_path::ROOT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ── NodeId ────────────────────────────────────────────────────────────────

/// Opaque, stable node identity (`source-node-7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints ids scoped by a prefix so source and target ids never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdMinter {
    prefix: String,
    next: u64,
}

impl IdMinter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    pub fn mint(&mut self) -> NodeId {
        let id = NodeId(format!("{}-node-{}", self.prefix, self.next));
        self.next += 1;
        id
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

// ── NodeType ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    String,
    Number,
    Boolean,
    Null,
    Object,
    Array,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown node type `{0}`")]
pub struct UnknownNodeType(pub String);

impl NodeType {
    /// Type of a parsed JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => NodeType::Null,
            Value::Bool(_) => NodeType::Boolean,
            Value::Number(_) => NodeType::Number,
            Value::String(_) => NodeType::String,
            Value::Array(_) => NodeType::Array,
            Value::Object(_) => NodeType::Object,
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, NodeType::Object | NodeType::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::String => "string",
            NodeType::Number => "number",
            NodeType::Boolean => "boolean",
            NodeType::Null => "null",
            NodeType::Object => "object",
            NodeType::Array => "array",
        }
    }

    /// Payload a node receives when retyped to `self`.
    pub fn default_value(self) -> Value {
        match self {
            NodeType::String => Value::String(String::new()),
            NodeType::Number => Value::from(0),
            NodeType::Boolean => Value::Bool(false),
            NodeType::Null | NodeType::Object | NodeType::Array => Value::Null,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = UnknownNodeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(NodeType::String),
            "number" => Ok(NodeType::Number),
            "boolean" => Ok(NodeType::Boolean),
            "null" => Ok(NodeType::Null),
            "object" => Ok(NodeType::Object),
            "array" => Ok(NodeType::Array),
            other => Err(UnknownNodeType(other.to_string())),
        }
    }
}

// ── Node ──────────────────────────────────────────────────────────────────

/// One key/value entry of a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    /// Property name, or the decimal index inside an array parent.
    pub key: String,
    /// Scalar payload for leaves; `null` for composites. May hold text
    /// for edited scalars; the serializer coerces it by `node_type`.
    pub value: Value,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Display depth only.
    pub level: usize,
    pub parent_id: Option<NodeId>,
    pub path: String,
    pub children_ids: Vec<NodeId>,
}

impl Node {
    pub fn has_children(&self) -> bool {
        !self.children_ids.is_empty()
    }

    /// Only childless nodes take part in mapping links.
    pub fn is_leaf(&self) -> bool {
        self.children_ids.is_empty()
    }
}

// ── NodeModel ─────────────────────────────────────────────────────────────

/// How the root entries of a model are reassembled into one JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    /// Roots are the members of a top-level object.
    Object,
    /// Roots are the elements of a top-level array.
    Array,
    /// A single synthetic root (key `"value"`, path `root`) wrapping a
    /// top-level scalar.
    Scalar,
}

/// Key given to the synthetic root of a scalar document.
pub const SCALAR_ROOT_KEY: &str = "value";

#[derive(Debug, Clone)]
pub struct NodeModel {
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) root_ids: Vec<NodeId>,
    pub(crate) root_kind: RootKind,
    pub(crate) minter: IdMinter,
}

impl NodeModel {
    /// An empty document whose ids will carry `id_prefix`.
    pub fn empty(id_prefix: impl Into<String>) -> Self {
        Self::with_minter(IdMinter::new(id_prefix))
    }

    pub(crate) fn with_minter(minter: IdMinter) -> Self {
        Self {
            nodes: IndexMap::new(),
            root_ids: Vec::new(),
            root_kind: RootKind::Object,
            minter,
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.root_ids
    }

    pub fn root_kind(&self) -> RootKind {
        self.root_kind
    }

    pub fn id_prefix(&self) -> &str {
        self.minter.prefix()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in model order (parents before their children).
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// `path -> id` lookup over every node.
    pub fn path_index(&self) -> HashMap<String, NodeId> {
        self.nodes
            .values()
            .map(|node| (node.path.clone(), node.id.clone()))
            .collect()
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        self.nodes.values().find(|node| node.path == path)
    }

    /// Children of `parent`, or the root list for `None`.
    pub fn child_ids(&self, parent: Option<&NodeId>) -> &[NodeId] {
        match parent {
            None => &self.root_ids,
            Some(id) => self
                .nodes
                .get(id)
                .map_or(&[][..], |node| node.children_ids.as_slice()),
        }
    }

    pub(crate) fn child_ids_mut(&mut self, parent: Option<&NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            None => Some(&mut self.root_ids),
            Some(id) => self.nodes.get_mut(id).map(|node| &mut node.children_ids),
        }
    }

    /// Whether the children of `parent` are array elements.
    pub fn is_array_parent(&self, parent: Option<&NodeId>) -> bool {
        match parent {
            None => self.root_kind == RootKind::Array,
            Some(id) => self
                .nodes
                .get(id)
                .is_some_and(|node| node.node_type == NodeType::Array),
        }
    }

    /// Path that children of `parent` are built from.
    pub fn parent_path(&self, parent: Option<&NodeId>) -> String {
        parent
            .and_then(|id| self.nodes.get(id))
            .map_or_else(|| ROOT.to_string(), |node| node.path.clone())
    }

    /// `id` and all of its descendants, depth-first pre-order.
    pub fn subtree_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children_ids.iter().rev().cloned());
                out.push(current);
            }
        }
        out
    }

    /// Removes `id` and its descendants from the map, returning them in
    /// pre-order. Does not touch the parent's child list.
    pub(crate) fn remove_subtree(&mut self, id: &NodeId) -> Vec<Node> {
        self.subtree_ids(id)
            .into_iter()
            .filter_map(|id| self.nodes.shift_remove(&id))
            .collect()
    }

    /// Serializes the model back to plain JSON.
    pub fn to_value(&self) -> Value {
        crate::serialize::build_value(self)
    }
}
