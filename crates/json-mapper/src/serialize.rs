//! Serializer: [`NodeModel`] -> plain JSON value.
//!
//! Leaf payloads are coerced by the node's declared type, since edited
//! scalars are usually stored as text.

use serde_json::{Map, Number, Value};

use crate::node::{Node, NodeModel, NodeType, RootKind};

/// Rebuilds the JSON document described by `model`.
///
/// An empty model yields `{}` (or `[]` when it was normalized from an
/// empty array). A scalar document yields its coerced scalar directly.
pub fn build_value(model: &NodeModel) -> Value {
    match model.root_kind() {
        RootKind::Scalar => model
            .root_ids()
            .first()
            .and_then(|id| node_value(model, model.get(id)?))
            .unwrap_or_else(|| Value::Object(Map::new())),
        RootKind::Array => Value::Array(
            model
                .root_ids()
                .iter()
                .filter_map(|id| node_value(model, model.get(id)?))
                .collect(),
        ),
        RootKind::Object => {
            let mut out = Map::new();
            for id in model.root_ids() {
                if let Some(node) = model.get(id) {
                    if let Some(value) = node_value(model, node) {
                        out.insert(node.key.clone(), value);
                    }
                }
            }
            Value::Object(out)
        }
    }
}

fn node_value(model: &NodeModel, node: &Node) -> Option<Value> {
    if node.is_leaf() {
        return Some(coerce(node.node_type, &node.value));
    }
    let children = node.children_ids.iter().filter_map(|id| model.get(id));
    if node.node_type == NodeType::Array {
        Some(Value::Array(
            children.filter_map(|child| node_value(model, child)).collect(),
        ))
    } else {
        let mut out = Map::new();
        for child in children {
            if let Some(value) = node_value(model, child) {
                out.insert(child.key.clone(), value);
            }
        }
        Some(Value::Object(out))
    }
}

/// Coerces a stored leaf payload to `node_type`.
///
/// - `string`: textual form of the payload.
/// - `number`: numbers pass through; blank text is `0`; other text is
///   parsed (integer first, then finite float); anything unparsable is
///   returned as stored.
/// - `boolean`: `true` iff the textual form equals `"true"` ignoring case.
/// - `null`: always `null`.
/// - `object`/`array` without children: an empty container.
pub fn coerce(node_type: NodeType, value: &Value) -> Value {
    match node_type {
        NodeType::String => Value::String(display_text(value)),
        NodeType::Number => coerce_number(value),
        NodeType::Boolean => Value::Bool(match value {
            Value::Bool(b) => *b,
            other => display_text(other).eq_ignore_ascii_case("true"),
        }),
        NodeType::Null => Value::Null,
        NodeType::Object => match value {
            Value::Object(_) => value.clone(),
            _ => Value::Object(Map::new()),
        },
        NodeType::Array => match value {
            Value::Array(_) => value.clone(),
            _ => Value::Array(Vec::new()),
        },
    }
}

fn coerce_number(value: &Value) -> Value {
    let Value::String(text) = value else {
        return value.clone();
    };
    let text = text.trim();
    if text.is_empty() {
        return Value::from(0);
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(n) = text.parse::<u64>() {
        return Value::from(n);
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| value.clone(), Value::Number)
}

/// Textual form of a payload, as shown in tables and used for `string`
/// coercion.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn empty_model_is_empty_object() {
        assert_eq!(build_value(&NodeModel::empty("t")), json!({}));
        assert_eq!(build_value(&normalize(&json!({}), "t", None)), json!({}));
    }

    #[test]
    fn empty_array_stays_array() {
        assert_eq!(build_value(&normalize(&json!([]), "t", None)), json!([]));
    }

    #[test]
    fn flat_and_nested_objects() {
        let doc = json!({"name": "John", "age": 30, "user": {"details": {"id": 123}}});
        assert_eq!(build_value(&normalize(&doc, "t", None)), doc);
    }

    #[test]
    fn array_of_objects_in_order() {
        let doc = json!([{"item": "A"}, {"item": "B"}]);
        assert_eq!(build_value(&normalize(&doc, "t", None)), doc);
    }

    #[test]
    fn unwraps_scalar_document() {
        let model = normalize(&json!("just a string"), "t", None);
        assert_eq!(build_value(&model), json!("just a string"));
    }

    #[test]
    fn object_with_value_key_is_not_unwrapped() {
        let doc = json!({"value": 1});
        assert_eq!(build_value(&normalize(&doc, "t", None)), doc);
    }

    #[test]
    fn coerces_text_payloads() {
        assert_eq!(coerce(NodeType::Boolean, &json!("TRUE")), json!(true));
        assert_eq!(coerce(NodeType::Boolean, &json!("yes")), json!(false));
        assert_eq!(coerce(NodeType::Boolean, &json!(false)), json!(false));
        assert_eq!(coerce(NodeType::Number, &json!("100")), json!(100));
        assert_eq!(coerce(NodeType::Number, &json!(" 2.5 ")), json!(2.5));
        assert_eq!(coerce(NodeType::Number, &json!("abc")), json!("abc"));
        assert_eq!(coerce(NodeType::Number, &json!("NaN")), json!("NaN"));
        assert_eq!(coerce(NodeType::Null, &json!("x")), json!(null));
        assert_eq!(coerce(NodeType::String, &json!(12)), json!("12"));
        assert_eq!(coerce(NodeType::String, &json!(true)), json!("true"));
    }

    #[test]
    fn blank_number_text_is_zero() {
        assert_eq!(coerce(NodeType::Number, &json!("")), json!(0));
        assert_eq!(coerce(NodeType::Number, &json!("  ")), json!(0));
    }

    #[test]
    fn childless_composites_are_empty_containers() {
        let doc = json!({"o": {}, "a": [], "n": [[]]});
        assert_eq!(build_value(&normalize(&doc, "t", None)), doc);
    }

    #[test]
    fn large_unsigned_numbers_parse() {
        assert_eq!(
            coerce(NodeType::Number, &json!("18446744073709551615")),
            json!(18446744073709551615u64)
        );
    }
}
