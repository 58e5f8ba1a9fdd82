use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A raw entry as served by the entry endpoints, keyed by field name.
///
/// Entries are opaque to the client; the sync engine interprets them against
/// the owning content type's attributes.
pub type Entry = serde_json::Map<String, serde_json::Value>;

/// Envelope for the descriptor endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptorResponse {
    pub data: Vec<ContentType>,
}

/// A content-type or component descriptor.
///
/// Components are served by their own endpoint but share this shape; they
/// carry no `kind` and are never filtered on `isDisplayed`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentType {
    pub uid: String,
    #[serde(rename = "apiID")]
    pub api_id: String,
    #[serde(default)]
    pub kind: ContentKind,
    #[serde(rename = "isDisplayed", default)]
    pub is_displayed: bool,
    #[serde(default)]
    pub attributes: HashMap<String, Attribute>,
}

/// Whether a content type holds many entries or exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    #[default]
    CollectionType,
    SingleType,
}

/// A raw attribute descriptor.
///
/// The `type` tag is an open string taxonomy; the payload fields below are
/// each meaningful for a subset of tags. Classification into a closed
/// representation happens downstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,

    // media
    #[serde(default)]
    pub multiple: bool,
    #[serde(rename = "allowedTypes", default)]
    pub allowed_types: Vec<String>,

    // relation
    #[serde(rename = "relationType")]
    pub relation_type: Option<String>,
    pub model: Option<String>,
    pub collection: Option<String>,

    // component
    pub component: Option<String>,
    #[serde(default)]
    pub repeatable: bool,

    // dynamic zone
    #[serde(default)]
    pub components: Vec<String>,
}

/// Body for the login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Response from the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_type_deserializes_remote_casing() {
        let ty: ContentType = serde_json::from_value(json!({
            "uid": "application::article.article",
            "apiID": "article",
            "kind": "collectionType",
            "isDisplayed": true,
            "attributes": {
                "title": { "type": "string", "required": true },
                "cover": { "type": "media", "allowedTypes": ["images"] }
            }
        }))
        .unwrap();

        assert_eq!(ty.api_id, "article");
        assert_eq!(ty.kind, ContentKind::CollectionType);
        assert!(ty.is_displayed);
        assert_eq!(ty.attributes["title"].kind, "string");
        assert!(ty.attributes["cover"]
            .allowed_types
            .iter()
            .any(|t| t == "images"));
    }

    #[test]
    fn component_descriptor_defaults_missing_fields() {
        let ty: ContentType = serde_json::from_value(json!({
            "uid": "sections.hero",
            "apiID": "hero",
            "isDisplayed": true,
            "attributes": {
                "heading": { "type": "string" }
            }
        }))
        .unwrap();

        // Components carry no kind; the default stands in.
        assert_eq!(ty.kind, ContentKind::CollectionType);
    }

    #[test]
    fn relation_attribute_carries_target_fields() {
        let attr: Attribute = serde_json::from_value(json!({
            "type": "relation",
            "relationType": "oneToMany",
            "collection": "comment"
        }))
        .unwrap();

        assert_eq!(attr.kind, "relation");
        assert_eq!(attr.relation_type.as_deref(), Some("oneToMany"));
        assert_eq!(attr.collection.as_deref(), Some("comment"));
        assert!(attr.model.is_none());
    }
}
