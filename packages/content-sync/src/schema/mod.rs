//! Schema mapping: attribute classification and graph type registration.

pub mod classify;
pub mod registrar;

pub use classify::{
    classify, ClassifiedComponent, ClassifiedContentType, ClassifiedType, ComponentIndex,
    RelationKind,
};
pub use registrar::{build_union_type, register_singleton_queries, register_types};
