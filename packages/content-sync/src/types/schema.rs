//! Schema descriptors registered with the destination store.
//!
//! These are declarative: the engine describes object types, unions, and
//! resolvers, and the host query layer executes them. Relation and dynamic
//! zone fields never appear on the static object type (their targets are not
//! statically enumerable); they resolve through stored references and the
//! registered union resolvers instead.

use std::collections::{BTreeMap, HashMap};

/// Scalar kinds emitted by the attribute classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int,
    Float,
    String,
    Boolean,
    Date,
    Json,
}

impl ScalarType {
    /// The scalar's name in a schema definition.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::String => "String",
            ScalarType::Boolean => "Boolean",
            ScalarType::Date => "Date",
            ScalarType::Json => "JSON",
        }
    }
}

/// A field declaration on an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Non-null identity field (`ID!`)
    Id,
    /// Scalar field
    Scalar(ScalarType),
    /// Single or list reference to another collection
    Reference { type_name: String, list: bool },
}

/// An object type registered for one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    /// Collection type name
    pub name: String,

    /// Interfaces this type implements (`Node` for content types)
    pub interfaces: Vec<String>,

    /// Keep undeclared raw fields queryable through inference
    pub infer: bool,

    /// Declared fields, deterministic order
    pub fields: BTreeMap<String, FieldType>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interfaces: Vec::new(),
            infer: true,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, field: FieldType) -> Self {
        self.fields.insert(name.into(), field);
        self
    }
}

/// A union type generated for one dynamic zone field.
///
/// Maps runtime discriminator values (component uids) back to concrete
/// member type names so the query layer can resolve heterogeneous lists.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    /// Union type name
    pub name: String,

    /// Member object type names
    pub members: Vec<String>,

    /// Component uid to member type name
    pub discriminators: HashMap<String, String>,
}

impl UnionType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            discriminators: HashMap::new(),
        }
    }

    /// Add a member resolved from the given discriminator.
    pub fn with_member(mut self, discriminator: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        self.members.push(type_name.clone());
        self.discriminators.insert(discriminator.into(), type_name);
        self
    }

    /// Resolve a zone element's discriminator to its member type name.
    pub fn resolve_member(&self, discriminator: &str) -> Option<&str> {
        self.discriminators.get(discriminator).map(String::as_str)
    }
}

/// A query-layer resolver registered alongside the static types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolver {
    /// Root query field resolving to the sole node of a collection.
    ///
    /// An empty collection resolves to no node; callers treat that as
    /// "not configured" rather than an error.
    SingletonQuery { field: String, type_name: String },

    /// Zone field on a parent type resolving through a union list.
    ZoneField {
        type_name: String,
        field: String,
        union: String,
    },
}
