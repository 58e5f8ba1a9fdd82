//! Graph nodes and references.
//!
//! A node is the committed, typed unit in the destination store. Relations
//! and media fields hold `Reference` values rather than embedded copies, so
//! entities own their own record and cyclic links between content types stay
//! cheap lookups.

use serde_json::Value;
use std::collections::HashMap;

/// A (type name, id) pair pointing at a node in another collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Collection the referenced node lives in
    pub type_name: String,
    /// Node id within that collection
    pub id: String,
}

impl Reference {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }
}

/// A single field value on a graph node.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Raw scalar or JSON value, stored as-is
    Value(Value),
    /// Reference to a single node
    Ref(Reference),
    /// Ordered list of node references
    RefList(Vec<Reference>),
}

/// A node committed to a graph collection. Append-only per build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphNode {
    /// Node identity, unique within its collection
    pub id: String,
    /// Field values keyed by field name
    pub fields: HashMap<String, FieldValue>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Remove a field if present.
    pub fn remove(&mut self, name: &str) {
        self.fields.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Builder-style field setter for tests and fixtures.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }
}

/// Normalize a raw id value to a node id string.
///
/// The source serves numeric ids for entries and media but string ids are
/// possible too; everything else has no usable identity.
pub fn id_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_string_normalizes_numbers() {
        assert_eq!(id_string(&json!(9)).as_deref(), Some("9"));
        assert_eq!(id_string(&json!("abc")).as_deref(), Some("abc"));
        assert_eq!(id_string(&json!(null)), None);
        assert_eq!(id_string(&json!({ "id": 1 })), None);
    }

    #[test]
    fn node_fields_replace_on_set() {
        let mut node = GraphNode::new("1");
        node.set("title", FieldValue::Value(json!("Hi")));
        node.set("title", FieldValue::Value(json!("Hello")));

        assert_eq!(node.get("title"), Some(&FieldValue::Value(json!("Hello"))));
        node.remove("title");
        assert!(node.get("title").is_none());
    }
}
