//! Destination trait for the host graph store.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::node::GraphNode;
use crate::types::schema::{ObjectType, Resolver, UnionType};

/// The collection-oriented store the engine syncs into.
///
/// Writers for the same node id always produce identical content, so
/// last-writer-wins insertion is acceptable; no method ever mutates an
/// already-committed node.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create a collection if it does not exist yet.
    async fn ensure_collection(&self, type_name: &str) -> Result<()>;

    /// Insert a node into a collection.
    async fn insert_node(&self, type_name: &str, node: GraphNode) -> Result<()>;

    /// Register a static object type.
    async fn register_object_type(&self, object: ObjectType) -> Result<()>;

    /// Register a union type for a dynamic zone field.
    async fn register_union_type(&self, union: UnionType) -> Result<()>;

    /// Register a query-layer resolver.
    async fn register_resolver(&self, resolver: Resolver) -> Result<()>;
}
