//! Reconciler: rebuilds a model from freshly parsed JSON while keeping
//! the id of every node whose path still exists.
//!
//! Matching is purely by path. Renaming a key in the text is therefore a
//! delete plus an insert and the old id is reported as deleted; renames
//! that should keep identity go through [`crate::edit::rename_key`].

use serde_json::Value;
use tracing::debug;

use crate::node::{NodeId, NodeModel};
use crate::normalize::normalize_with;
use crate::serialize::build_value;

/// Result of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub model: NodeModel,
    /// Old ids with no counterpart in the new model, in old model order.
    pub deleted_ids: Vec<NodeId>,
    /// `false` when the old model already serialized to the new value and
    /// was returned as is.
    pub changed: bool,
}

/// Reconciles `old` against `new_value`.
///
/// Callers parse the edited text first and only call this on success.
/// Freshly minted ids continue `old`'s sequence, so an id dropped here is
/// never handed out again for this document.
pub fn reconcile(old: &NodeModel, new_value: &Value) -> Reconciliation {
    if same_json(&build_value(old), new_value) {
        debug!(prefix = old.id_prefix(), "reconcile: no structural change");
        return Reconciliation {
            model: old.clone(),
            deleted_ids: Vec::new(),
            changed: false,
        };
    }

    let reuse_ids = old.path_index();
    let model = normalize_with(new_value, old.minter.clone(), Some(&reuse_ids));
    let deleted_ids: Vec<NodeId> = old.ids().filter(|id| !model.contains(id)).cloned().collect();

    debug!(
        prefix = old.id_prefix(),
        nodes = model.len(),
        deleted = deleted_ids.len(),
        "reconcile: model rebuilt"
    );
    Reconciliation {
        model,
        deleted_ids,
        changed: true,
    }
}

/// Structural equality that also compares object key order, so an edit
/// that only reorders keys is still applied.
fn same_json(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            a == b || matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_json(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && same_json(va, vb))
        }
        _ => false,
    }
}
