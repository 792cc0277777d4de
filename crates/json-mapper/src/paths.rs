//! Path maintainer: recomputes paths below a node after its key changed
//! or it moved under a different parent path, migrating field metadata
//! along with every changed path.

use json_field_path::child_path;

use crate::metadata::FieldMetadataStore;
use crate::node::{NodeId, NodeModel, NodeType};

/// One node whose path was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub id: NodeId,
    pub old_path: String,
    pub new_path: String,
}

/// Recomputes the path of `node_id` as `new_parent_path` plus its own key,
/// then the paths of all its descendants.
///
/// Metadata entries keyed by any old path are moved to the new path before
/// returning. Unknown ids are ignored.
pub fn reparent_paths(
    model: &mut NodeModel,
    metadata: &mut FieldMetadataStore,
    node_id: &NodeId,
    new_parent_path: &str,
    parent_is_array: bool,
) -> Vec<PathChange> {
    let mut changes = Vec::new();
    let mut stack = vec![(node_id.clone(), new_parent_path.to_string(), parent_is_array)];

    while let Some((id, parent_path, in_array)) = stack.pop() {
        let Some(node) = model.get_mut(&id) else {
            continue;
        };
        let new_path = child_path(&parent_path, &node.key, in_array);
        if node.path != new_path {
            let old_path = std::mem::replace(&mut node.path, new_path.clone());
            changes.push(PathChange {
                id: id.clone(),
                old_path,
                new_path: new_path.clone(),
            });
        }
        let is_array = node.node_type == NodeType::Array;
        for child in node.children_ids.iter().rev() {
            stack.push((child.clone(), new_path.clone(), is_array));
        }
    }

    metadata.migrate(&changes);
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataUpdate;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn rewrites_subtree_and_moves_metadata() {
        let mut model = normalize(&json!({"a": {"b": [{"c": 1}]}}), "t", None);
        let mut metadata = FieldMetadataStore::new();
        metadata.set("root.a.b[0].c", MetadataUpdate::Description("deep".into()));

        let a = model.find_by_path("root.a").unwrap().id.clone();
        model.get_mut(&a).unwrap().key = "z".into();
        let changes = reparent_paths(&mut model, &mut metadata, &a, "root", false);

        let new_paths: Vec<_> = changes.iter().map(|c| c.new_path.as_str()).collect();
        assert_eq!(new_paths, ["root.z", "root.z.b", "root.z.b[0]", "root.z.b[0].c"]);
        assert!(model.find_by_path("root.a.b[0].c").is_none());
        assert_eq!(
            model.find_by_path("root.z.b[0].c").unwrap().value,
            json!(1)
        );
        assert!(metadata.get("root.a.b[0].c").is_none());
        assert_eq!(metadata.get("root.z.b[0].c").unwrap().description, "deep");
    }

    #[test]
    fn unchanged_paths_report_nothing() {
        let mut model = normalize(&json!({"a": {"b": 1}}), "t", None);
        let mut metadata = FieldMetadataStore::new();
        let a = model.root_ids()[0].clone();
        assert!(reparent_paths(&mut model, &mut metadata, &a, "root", false).is_empty());
    }

    #[test]
    fn array_parent_uses_brackets() {
        let mut model = normalize(&json!({"a": 1}), "t", None);
        let mut metadata = FieldMetadataStore::new();
        let a = model.root_ids()[0].clone();
        model.get_mut(&a).unwrap().key = "4".into();
        reparent_paths(&mut model, &mut metadata, &a, "root.list", true);
        assert_eq!(model.get(&a).unwrap().path, "root.list[4]");
    }
}
