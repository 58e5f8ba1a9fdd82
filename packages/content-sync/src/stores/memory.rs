//! In-memory graph store implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::traits::GraphStore;
use crate::types::node::GraphNode;
use crate::types::schema::{ObjectType, Resolver, UnionType};

/// In-memory implementation of [`GraphStore`].
///
/// Collections are keyed by type name, nodes within a collection by id.
/// Inserting a node with an id already present in its collection replaces
/// the earlier node, which is what makes repeated media sightings and
/// re-synced entries idempotent.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, GraphNode>>>,
    object_types: RwLock<HashMap<String, ObjectType>>,
    union_types: RwLock<HashMap<String, UnionType>>,
    resolvers: RwLock<Vec<Resolver>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all collections, registered types, and resolvers.
    pub fn clear(&self) {
        self.collections.write().unwrap().clear();
        self.object_types.write().unwrap().clear();
        self.union_types.write().unwrap().clear();
        self.resolvers.write().unwrap().clear();
    }

    /// Names of all collections, including empty ones.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of nodes in one collection, zero when it does not exist.
    pub fn node_count(&self, type_name: &str) -> usize {
        self.collections
            .read()
            .unwrap()
            .get(type_name)
            .map_or(0, HashMap::len)
    }

    /// Total node count across all collections.
    pub fn total_nodes(&self) -> usize {
        self.collections
            .read()
            .unwrap()
            .values()
            .map(HashMap::len)
            .sum()
    }

    /// Look up one node by collection and id.
    pub fn get_node(&self, type_name: &str, id: &str) -> Option<GraphNode> {
        self.collections
            .read()
            .unwrap()
            .get(type_name)
            .and_then(|nodes| nodes.get(id))
            .cloned()
    }

    /// Look up a registered object type by name.
    pub fn object_type(&self, name: &str) -> Option<ObjectType> {
        self.object_types.read().unwrap().get(name).cloned()
    }

    /// Look up a registered union type by name.
    pub fn union_type(&self, name: &str) -> Option<UnionType> {
        self.union_types.read().unwrap().get(name).cloned()
    }

    /// All registered resolvers in registration order.
    pub fn resolvers(&self) -> Vec<Resolver> {
        self.resolvers.read().unwrap().clone()
    }

    /// Evaluate a singleton query resolver: the sole node of the collection
    /// it points at, or nothing when the collection is empty or missing.
    pub fn resolve_singleton(&self, field: &str) -> Option<GraphNode> {
        let type_name = self
            .resolvers
            .read()
            .unwrap()
            .iter()
            .find_map(|resolver| match resolver {
                Resolver::SingletonQuery {
                    field: query_field,
                    type_name,
                } if query_field == field => Some(type_name.clone()),
                _ => None,
            })?;

        let collections = self.collections.read().unwrap();
        collections.get(&type_name)?.values().next().cloned()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn ensure_collection(&self, type_name: &str) -> Result<()> {
        self.collections
            .write()
            .unwrap()
            .entry(type_name.to_string())
            .or_default();
        Ok(())
    }

    async fn insert_node(&self, type_name: &str, node: GraphNode) -> Result<()> {
        self.collections
            .write()
            .unwrap()
            .entry(type_name.to_string())
            .or_default()
            .insert(node.id.clone(), node);
        Ok(())
    }

    async fn register_object_type(&self, object: ObjectType) -> Result<()> {
        self.object_types
            .write()
            .unwrap()
            .insert(object.name.clone(), object);
        Ok(())
    }

    async fn register_union_type(&self, union: UnionType) -> Result<()> {
        self.union_types
            .write()
            .unwrap()
            .insert(union.name.clone(), union);
        Ok(())
    }

    async fn register_resolver(&self, resolver: Resolver) -> Result<()> {
        self.resolvers.write().unwrap().push(resolver);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::node::FieldValue;
    use serde_json::json;

    #[tokio::test]
    async fn insert_with_same_id_replaces_the_node() {
        let store = MemoryStore::new();

        store
            .insert_node(
                "TestArticle",
                GraphNode::new("1").with_field("title", FieldValue::Value(json!("first"))),
            )
            .await
            .unwrap();
        store
            .insert_node(
                "TestArticle",
                GraphNode::new("1").with_field("title", FieldValue::Value(json!("second"))),
            )
            .await
            .unwrap();

        assert_eq!(store.node_count("TestArticle"), 1);
        let node = store.get_node("TestArticle", "1").unwrap();
        assert_eq!(node.get("title"), Some(&FieldValue::Value(json!("second"))));
    }

    #[tokio::test]
    async fn ensure_collection_is_idempotent_and_keeps_nodes() {
        let store = MemoryStore::new();

        store.ensure_collection("TestImage").await.unwrap();
        store
            .insert_node("TestImage", GraphNode::new("9"))
            .await
            .unwrap();
        store.ensure_collection("TestImage").await.unwrap();

        assert_eq!(store.collection_names(), vec!["TestImage".to_string()]);
        assert_eq!(store.node_count("TestImage"), 1);
        assert_eq!(store.total_nodes(), 1);
    }

    #[tokio::test]
    async fn resolve_singleton_yields_the_sole_node() {
        let store = MemoryStore::new();

        store
            .register_resolver(Resolver::SingletonQuery {
                field: "testSettings".to_string(),
                type_name: "TestSettings".to_string(),
            })
            .await
            .unwrap();

        // registered but unpopulated: resolves to nothing
        assert!(store.resolve_singleton("testSettings").is_none());

        store
            .insert_node("TestSettings", GraphNode::new("1"))
            .await
            .unwrap();
        assert_eq!(store.resolve_singleton("testSettings").unwrap().id, "1");

        // unknown query field
        assert!(store.resolve_singleton("testMissing").is_none());
    }
}
