//! Typed data-node tree returned by the asset backend.
//!
//! The backend serves every `.img` node as JSON. A node may be a bare scalar, an object
//! wrapping its value under `data` (current backend) or `value` (older dumps), or an object
//! holding named `children`. [`DataNode::from_json`] validates that shape once, up front,
//! so the rest of the crate only deals with [`DataNode`] and [`NodeValue`].
//!
//! Only a malformed root is an error. A malformed node further down is dropped from its
//! parent and reads as absent, so one broken entry never takes its siblings with it.

use core::fmt;

use bevy::prelude::*;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Field carrying a node's payload in the current backend format.
pub const PAYLOAD_FIELD: &str = "data";

/// Field carrying a node's payload in older dumps.
pub const LEGACY_VALUE_FIELD: &str = "value";

/// Field holding named child nodes.
pub const CHILDREN_FIELD: &str = "children";

/// Property type tag some backends attach next to the payload.
pub const TYPE_FIELD: &str = "type";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("Unexpected array at '{path}'")]
    UnexpectedArray { path: String },

    #[error("'children' of '{path}' is not an object")]
    InvalidChildren { path: String },

    #[error("Unrecognized payload object at '{path}'")]
    UnrecognizedPayload { path: String },
}

/// A primitive value carried by a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// A 2D vector property such as `origin`.
    Vector(Vec2),
    /// Bitmap dimensions of a canvas node.
    Canvas { width: u32, height: u32 },
}

impl NodeValue {
    /// Integer view of the value. Floats are truncated, numeric strings are parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NodeValue::Int(i) => Some(*i),
            NodeValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            NodeValue::Bool(b) => Some(i64::from(*b)),
            NodeValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            NodeValue::Int(i) => Some(*i as f32),
            NodeValue::Float(f) => Some(*f as f32),
            NodeValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            NodeValue::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Canvas dimensions as a `Vec2` (width, height).
    pub fn as_canvas_size(&self) -> Option<Vec2> {
        match self {
            NodeValue::Canvas { width, height } => Some(Vec2::new(*width as f32, *height as f32)),
            _ => None,
        }
    }

    /// Flag semantics used by the map format: `0`, `false` and `""` are off.
    pub fn is_truthy(&self) -> bool {
        match self {
            NodeValue::Int(i) => *i != 0,
            NodeValue::Float(f) => *f != 0.0 && !f.is_nan(),
            NodeValue::Bool(b) => *b,
            NodeValue::Str(s) => !s.is_empty(),
            NodeValue::Vector(_) | NodeValue::Canvas { .. } => true,
        }
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Int(i) => write!(f, "{i}"),
            NodeValue::Float(v) => write!(f, "{v}"),
            NodeValue::Bool(b) => write!(f, "{b}"),
            NodeValue::Str(s) => f.write_str(s),
            NodeValue::Vector(v) => write!(f, "{},{}", v.x, v.y),
            NodeValue::Canvas { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

/// Conversion from a [`NodeValue`] into a concrete Rust type.
///
/// Used by [`DataNode::get`] so parsers can read typed fields in one call.
pub trait FromNodeValue: Sized {
    fn from_node_value(value: &NodeValue) -> Option<Self>;
}

impl FromNodeValue for i64 {
    fn from_node_value(value: &NodeValue) -> Option<Self> {
        value.as_i64()
    }
}

impl FromNodeValue for i32 {
    fn from_node_value(value: &NodeValue) -> Option<Self> {
        value.as_i64().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromNodeValue for u32 {
    fn from_node_value(value: &NodeValue) -> Option<Self> {
        value.as_i64().and_then(|i| u32::try_from(i).ok())
    }
}

impl FromNodeValue for f32 {
    fn from_node_value(value: &NodeValue) -> Option<Self> {
        value.as_f32()
    }
}

impl FromNodeValue for bool {
    fn from_node_value(value: &NodeValue) -> Option<Self> {
        Some(value.is_truthy())
    }
}

impl FromNodeValue for String {
    fn from_node_value(value: &NodeValue) -> Option<Self> {
        Some(value.to_string())
    }
}

impl FromNodeValue for Vec2 {
    fn from_node_value(value: &NodeValue) -> Option<Self> {
        value.as_vec2()
    }
}

/// One node of the backend's data tree.
///
/// Children keep the order the backend sent them in; use [`DataNode::sorted_children`]
/// where the map format relies on numeric key order instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataNode {
    value: Option<NodeValue>,
    children: Vec<(String, DataNode)>,
}

impl DataNode {
    /// A childless node carrying `value`.
    pub fn leaf(value: NodeValue) -> Self {
        Self {
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// A node with children and no payload.
    pub fn branch<K: Into<String>>(children: impl IntoIterator<Item = (K, DataNode)>) -> Self {
        Self {
            value: None,
            children: children.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Validate a JSON document into a node tree.
    ///
    /// `null` becomes a node without payload, which is how the format spells "absent".
    /// Malformed descendants are dropped (logged at `debug`); only a malformed root fails.
    pub fn from_json(json: &Value) -> Result<Self, NodeError> {
        parse_node(json, "")
    }

    /// The node's resolved primitive value, if any.
    #[inline]
    pub fn value(&self) -> Option<&NodeValue> {
        self.value.as_ref()
    }

    pub fn child(&self, name: &str) -> Option<&DataNode> {
        self.children
            .iter()
            .find_map(|(key, node)| (key == name).then_some(node))
    }

    /// Resolved value of a named child. Missing children yield `None`.
    pub fn child_value(&self, name: &str) -> Option<&NodeValue> {
        value(self.child(name))
    }

    /// Typed value of a named child.
    pub fn get<T: FromNodeValue>(&self, name: &str) -> Option<T> {
        self.child_value(name).and_then(T::from_node_value)
    }

    /// Truthiness of a named child; absent counts as off.
    pub fn flag(&self, name: &str) -> bool {
        self.child_value(name).is_some_and(NodeValue::is_truthy)
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &DataNode)> {
        self.children.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Children in ascending numeric key order.
    ///
    /// Keys that are not integers sort after all numeric keys, lexically.
    pub fn sorted_children(&self) -> Vec<(&str, &DataNode)> {
        let mut sorted: Vec<_> = self.children().collect();
        sorted.sort_by(|(a, _), (b, _)| {
            match (a.parse::<i64>(), b.parse::<i64>()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                (Ok(_), Err(_)) => core::cmp::Ordering::Less,
                (Err(_), Ok(_)) => core::cmp::Ordering::Greater,
                (Err(_), Err(_)) => a.cmp(b),
            }
        });
        sorted
    }
}

/// Resolve the primitive value of a possibly-absent node.
#[inline]
pub fn value(node: Option<&DataNode>) -> Option<&NodeValue> {
    node.and_then(DataNode::value)
}

fn parse_node(json: &Value, path: &str) -> Result<DataNode, NodeError> {
    let Value::Object(fields) = json else {
        return Ok(DataNode {
            value: parse_payload(json, path)?,
            children: Vec::new(),
        });
    };

    if fields.is_empty() {
        return Ok(DataNode::default());
    }

    let wrapped = [PAYLOAD_FIELD, LEGACY_VALUE_FIELD, CHILDREN_FIELD, TYPE_FIELD]
        .iter()
        .any(|field| fields.contains_key(*field));

    if !wrapped {
        // A bare object is the primitive itself (e.g. `{ "x": 1, "y": 2 }`)
        return Ok(DataNode {
            value: parse_payload(json, path)?,
            children: Vec::new(),
        });
    }

    let payload = [PAYLOAD_FIELD, LEGACY_VALUE_FIELD]
        .iter()
        .filter_map(|field| fields.get(*field))
        .find(|v| !v.is_null());
    let value = match payload {
        Some(payload) => parse_payload(payload, path)?,
        None => None,
    };

    let children = match fields.get(CHILDREN_FIELD) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(key, child)| {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}/{key}")
                };
                match parse_node(child, &child_path) {
                    Ok(node) => Some((key.clone(), node)),
                    Err(e) => {
                        debug!("Dropping malformed node: {}", e);
                        None
                    }
                }
            })
            .collect(),
        Some(_) => {
            return Err(NodeError::InvalidChildren {
                path: path.to_string(),
            });
        }
    };

    Ok(DataNode { value, children })
}

fn parse_payload(json: &Value, path: &str) -> Result<Option<NodeValue>, NodeError> {
    let value = match json {
        Value::Null => None,
        Value::Bool(b) => Some(NodeValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(NodeValue::Int(i)),
            None => n.as_f64().map(NodeValue::Float),
        },
        Value::String(s) => Some(NodeValue::Str(s.clone())),
        Value::Array(_) => {
            return Err(NodeError::UnexpectedArray {
                path: path.to_string(),
            });
        }
        Value::Object(fields) => {
            let number = |key: &str| fields.get(key).and_then(Value::as_f64);
            if let (Some(x), Some(y)) = (number("x"), number("y")) {
                Some(NodeValue::Vector(Vec2::new(x as f32, y as f32)))
            } else if let (Some(width), Some(height)) = (number("width"), number("height")) {
                Some(NodeValue::Canvas {
                    width: width.max(0.0) as u32,
                    height: height.max(0.0) as u32,
                })
            } else {
                return Err(NodeError::UnrecognizedPayload {
                    path: path.to_string(),
                });
            }
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_field_takes_precedence() {
        let node = DataNode::from_json(&json!({ "data": 7, "value": 3 })).unwrap();
        assert_eq!(node.value(), Some(&NodeValue::Int(7)));
    }

    #[test]
    fn test_legacy_value_field() {
        let node = DataNode::from_json(&json!({ "value": "abc" })).unwrap();
        assert_eq!(node.value(), Some(&NodeValue::Str("abc".into())));

        // A null payload falls through to the legacy field
        let node = DataNode::from_json(&json!({ "data": null, "value": 4 })).unwrap();
        assert_eq!(node.value(), Some(&NodeValue::Int(4)));
    }

    #[test]
    fn test_bare_scalar_is_its_own_value() {
        let node = DataNode::from_json(&json!(12.5)).unwrap();
        assert_eq!(node.value(), Some(&NodeValue::Float(12.5)));
    }

    #[test]
    fn test_bare_vector_object() {
        let node = DataNode::from_json(&json!({ "x": 3, "y": -4 })).unwrap();
        assert_eq!(node.value(), Some(&NodeValue::Vector(Vec2::new(3.0, -4.0))));
    }

    #[test]
    fn test_absent_is_distinct_from_falsy() {
        let node = DataNode::from_json(&json!({
            "children": {
                "zero": { "data": 0 },
                "off": { "data": false },
                "missing": { "data": null }
            }
        }))
        .unwrap();

        assert_eq!(node.child_value("zero"), Some(&NodeValue::Int(0)));
        assert_eq!(node.child_value("off"), Some(&NodeValue::Bool(false)));
        assert_eq!(node.child_value("missing"), None);
        assert_eq!(node.child_value("nope"), None);
        assert!(!node.flag("zero"));
    }

    #[test]
    fn test_value_of_absent_node() {
        assert_eq!(value(None), None);
    }

    #[test]
    fn test_malformed_root_rejected() {
        let err = DataNode::from_json(&json!([1, 2])).unwrap_err();
        assert_eq!(err, NodeError::UnexpectedArray { path: String::new() });

        let err = DataNode::from_json(&json!({ "children": 3 })).unwrap_err();
        assert_eq!(err, NodeError::InvalidChildren { path: String::new() });
    }

    #[test]
    fn test_malformed_descendants_dropped() {
        let node = DataNode::from_json(&json!({
            "children": {
                "list": { "data": [1, 2] },
                "odd": { "children": 3 },
                "blob": { "data": { "foo": 1 } },
                "entry": { "children": { "pn": { "data": ["sp"] }, "x": { "data": 4 } } },
                "ok": { "data": 1 }
            }
        }))
        .unwrap();

        let keys: Vec<_> = node.children().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["entry", "ok"]);

        // The bad leaf reads as absent, its siblings survive
        let entry = node.child("entry").unwrap();
        assert_eq!(entry.child_value("pn"), None);
        assert_eq!(entry.get::<i32>("x"), Some(4));
    }

    #[test]
    fn test_built_nodes_match_parsed_nodes() {
        let built = DataNode::branch([
            ("x", DataNode::leaf(NodeValue::Int(3))),
            ("name", DataNode::leaf(NodeValue::Str("sp".into()))),
        ]);
        let parsed = DataNode::from_json(&json!({
            "children": { "x": { "data": 3 }, "name": { "data": "sp" } }
        }))
        .unwrap();

        assert_eq!(built, parsed);
        assert_eq!(built.value(), None);
        assert!(built.has_children());
    }

    #[test]
    fn test_unrecognized_payload_rejected() {
        let err = DataNode::from_json(&json!({ "data": { "foo": 1 } })).unwrap_err();
        assert_eq!(err, NodeError::UnrecognizedPayload { path: String::new() });
    }

    #[test]
    fn test_canvas_payload() {
        let node = DataNode::from_json(&json!({ "data": { "width": 20, "height": 30 } })).unwrap();
        assert_eq!(
            node.value().and_then(NodeValue::as_canvas_size),
            Some(Vec2::new(20.0, 30.0))
        );
    }

    #[test]
    fn test_sorted_children_numeric_order() {
        let node = DataNode::from_json(&json!({
            "children": { "2": 0, "10": 0, "info": 0, "1": 0 }
        }))
        .unwrap();
        let keys: Vec<_> = node.sorted_children().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["1", "2", "10", "info"]);
    }

    #[test]
    fn test_typed_getters() {
        let node = DataNode::from_json(&json!({
            "children": { "x": { "data": "-12" }, "f": { "data": 1 }, "name": { "data": 100 } }
        }))
        .unwrap();
        assert_eq!(node.get::<i32>("x"), Some(-12));
        assert_eq!(node.get::<f32>("x"), Some(-12.0));
        assert_eq!(node.get::<String>("name"), Some("100".into()));
        assert!(node.flag("f"));
        assert_eq!(node.get::<u32>("x"), None);
    }
}
