//! Attribute classification.
//!
//! The source describes its schema with an open string taxonomy (`type:
//! "string"`, `"media"`, `"relation"`, ...). Classification turns each
//! attribute into exactly one closed bucket, with an explicit unmapped arm
//! instead of silent fallthrough, and is the single rule applied to content
//! types and components alike.

use std::collections::HashMap;
use tracing::warn;

use cms_client::types::{Attribute, ContentKind, ContentType};

use crate::types::naming::{pluralize, TypeNamer};
use crate::types::schema::ScalarType;

/// Relation cardinality as declared by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "oneToOne" => Some(RelationKind::OneToOne),
            "oneToMany" => Some(RelationKind::OneToMany),
            "manyToOne" => Some(RelationKind::ManyToOne),
            "manyToMany" => Some(RelationKind::ManyToMany),
            _ => None,
        }
    }

    /// Whether the raw value is a list of stubs rather than a single stub.
    pub fn is_multi(&self) -> bool {
        matches!(self, RelationKind::OneToMany | RelationKind::ManyToMany)
    }
}

/// A scalar attribute and its mapped schema type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarField {
    pub name: String,
    pub scalar: ScalarType,
}

/// A media attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaField {
    pub name: String,
    /// List of assets rather than a single asset
    pub multiple: bool,
    /// Allowed to hold images; only image media are downloaded and rewritten
    pub image: bool,
}

/// A relation attribute. `kind` or `target` may be absent on malformed or
/// unrecognized descriptors; the resolver drops such fields with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationField {
    pub name: String,
    pub kind: Option<RelationKind>,
    pub target: Option<String>,
}

/// An embedded component attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentField {
    pub name: String,
    /// Component uid the payload instantiates
    pub component: String,
    pub repeatable: bool,
}

/// A dynamic zone attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneField {
    pub name: String,
    /// Component uids allowed in the zone
    pub components: Vec<String>,
}

/// An attribute whose kind matched no bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedField {
    pub name: String,
    pub kind: String,
}

/// Attributes of one descriptor partitioned into buckets.
///
/// Bucket order carries no meaning; consumers must not depend on it.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedType {
    pub scalars: Vec<ScalarField>,
    pub media: Vec<MediaField>,
    pub relations: Vec<RelationField>,
    pub components: Vec<ComponentField>,
    pub zones: Vec<ZoneField>,
    pub unmapped: Vec<UnmappedField>,
}

/// Map a scalar kind tag to its schema type.
pub fn scalar_type(kind: &str) -> Option<ScalarType> {
    match kind {
        "integer" => Some(ScalarType::Int),
        "float" | "decimal" => Some(ScalarType::Float),
        "string" | "text" | "richtext" | "uid" | "email" | "enumeration" | "time"
        | "biginteger" => Some(ScalarType::String),
        "boolean" => Some(ScalarType::Boolean),
        "date" | "datetime" | "timestamp" => Some(ScalarType::Date),
        "json" => Some(ScalarType::Json),
        _ => None,
    }
}

/// Partition a descriptor's attributes into classified buckets.
///
/// `type_label` names the owning descriptor in diagnostics. Unknown kinds
/// land in `unmapped` and are reported once per type; they never fail the
/// sync. The `id` attribute is the node identity and is not classified.
pub fn classify(type_label: &str, attributes: &HashMap<String, Attribute>) -> ClassifiedType {
    let mut classified = ClassifiedType::default();

    for (name, attribute) in attributes {
        if name == "id" {
            continue;
        }

        match attribute.kind.as_str() {
            "media" => classified.media.push(MediaField {
                name: name.clone(),
                multiple: attribute.multiple,
                image: attribute.allowed_types.iter().any(|t| t == "images"),
            }),
            "relation" => classified.relations.push(RelationField {
                name: name.clone(),
                kind: attribute
                    .relation_type
                    .as_deref()
                    .and_then(RelationKind::parse),
                target: attribute.model.clone().or_else(|| attribute.collection.clone()),
            }),
            "component" => match &attribute.component {
                Some(component) => classified.components.push(ComponentField {
                    name: name.clone(),
                    component: component.clone(),
                    repeatable: attribute.repeatable,
                }),
                None => classified.unmapped.push(UnmappedField {
                    name: name.clone(),
                    kind: attribute.kind.clone(),
                }),
            },
            "dynamiczone" => classified.zones.push(ZoneField {
                name: name.clone(),
                components: attribute.components.clone(),
            }),
            kind => match scalar_type(kind) {
                Some(scalar) => classified.scalars.push(ScalarField {
                    name: name.clone(),
                    scalar,
                }),
                None => classified.unmapped.push(UnmappedField {
                    name: name.clone(),
                    kind: kind.to_string(),
                }),
            },
        }
    }

    if !classified.unmapped.is_empty() {
        let fields: Vec<String> = classified
            .unmapped
            .iter()
            .map(|f| format!("{} ({})", f.name, f.kind))
            .collect();
        warn!(
            content_type = type_label,
            fields = %fields.join(", "),
            "Skipping attributes with no matching schema type"
        );
    }

    classified
}

/// A content type ready to sync: naming, endpoint, and classified fields.
#[derive(Debug, Clone)]
pub struct ClassifiedContentType {
    pub uid: String,
    pub api_id: String,
    pub kind: ContentKind,
    /// Generated collection type name
    pub type_name: String,
    /// Entry endpoint: pluralized api id for collections, bare for singletons
    pub endpoint: String,
    pub fields: ClassifiedType,
}

impl ClassifiedContentType {
    pub fn from_descriptor(namer: &TypeNamer, descriptor: &ContentType) -> Self {
        let endpoint = match descriptor.kind {
            ContentKind::CollectionType => pluralize(&descriptor.api_id),
            ContentKind::SingleType => descriptor.api_id.clone(),
        };

        Self {
            uid: descriptor.uid.clone(),
            api_id: descriptor.api_id.clone(),
            kind: descriptor.kind,
            type_name: namer.type_name(&descriptor.api_id),
            endpoint,
            fields: classify(&descriptor.api_id, &descriptor.attributes),
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.kind == ContentKind::SingleType
    }
}

/// A component descriptor classified and named, ready for zone resolution.
#[derive(Debug, Clone)]
pub struct ClassifiedComponent {
    pub uid: String,
    /// Generated collection type name, derived from the uid
    pub type_name: String,
    pub fields: ClassifiedType,
}

/// Classified component descriptors keyed by uid.
///
/// Built once per run from the fetched component descriptors; zone elements
/// look their discriminator up here.
#[derive(Debug, Default)]
pub struct ComponentIndex {
    by_uid: HashMap<String, ClassifiedComponent>,
}

impl ComponentIndex {
    pub fn build(namer: &TypeNamer, components: &[ContentType]) -> Self {
        let by_uid = components
            .iter()
            .map(|descriptor| {
                let classified = ClassifiedComponent {
                    uid: descriptor.uid.clone(),
                    type_name: namer.type_name(&descriptor.uid),
                    fields: classify(&descriptor.uid, &descriptor.attributes),
                };
                (descriptor.uid.clone(), classified)
            })
            .collect();

        Self { by_uid }
    }

    pub fn get(&self, uid: &str) -> Option<&ClassifiedComponent> {
        self.by_uid.get(uid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedComponent> {
        self.by_uid.values()
    }

    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }
}
