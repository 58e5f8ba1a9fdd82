//! Entry resolution - raw records become committed graph nodes.
//!
//! Every raw field is carried onto the node as-is, then media, relation,
//! component, and dynamic zone fields are rewritten into references. Child
//! nodes (media assets, component instances) are committed before the node
//! that references them, so a committed reference never dangles.
//!
//! Mapping failures here are never fatal: the affected field or element is
//! dropped with a warning and the surrounding entry still commits.

use serde_json::Value;
use tracing::warn;

use cms_client::types::Entry;

use crate::error::Result;
use crate::media::{MediaAsset, MediaSync};
use crate::schema::classify::{
    ClassifiedComponent, ClassifiedContentType, ClassifiedType, RelationField,
};
use crate::schema::ComponentIndex;
use crate::traits::{ContentSource, GraphStore};
use crate::types::naming::TypeNamer;
use crate::types::node::{id_string, FieldValue, GraphNode, Reference};

/// Resolves one content type's entries against the classified schema.
///
/// A single resolver is shared by all concurrently-processed content types;
/// it holds no per-type state.
pub struct EntryResolver<'a, S, G> {
    namer: &'a TypeNamer,
    components: &'a ComponentIndex,
    media: Option<&'a MediaSync<S>>,
    store: &'a G,
}

impl<'a, S: ContentSource + 'static, G: GraphStore> EntryResolver<'a, S, G> {
    pub fn new(
        namer: &'a TypeNamer,
        components: &'a ComponentIndex,
        media: Option<&'a MediaSync<S>>,
        store: &'a G,
    ) -> Self {
        Self {
            namer,
            components,
            media,
            store,
        }
    }

    /// Resolve and commit a batch of entries, in batch order.
    ///
    /// Returns the number of nodes committed. Entries without an id carry
    /// no usable identity and are skipped with a warning.
    pub async fn resolve_type(
        &self,
        content_type: &ClassifiedContentType,
        entries: Vec<Entry>,
    ) -> Result<usize> {
        self.store
            .ensure_collection(&content_type.type_name)
            .await?;

        let mut committed = 0;
        for entry in entries {
            let id = match entry.get("id").and_then(id_string) {
                Some(id) => id,
                None => {
                    warn!(
                        content_type = %content_type.api_id,
                        "Skipping entry without an id"
                    );
                    continue;
                }
            };

            let node = self.resolve_entry(content_type, &id, entry).await?;
            self.store
                .insert_node(&content_type.type_name, node)
                .await?;
            committed += 1;
        }

        Ok(committed)
    }

    async fn resolve_entry(
        &self,
        content_type: &ClassifiedContentType,
        id: &str,
        entry: Entry,
    ) -> Result<GraphNode> {
        let mut node = GraphNode::new(id);
        for (field, value) in entry {
            node.set(field, FieldValue::Value(value));
        }

        self.resolve_media(&content_type.api_id, &content_type.fields, &mut node)
            .await?;
        self.resolve_relations(&content_type.api_id, &content_type.fields, &mut node);
        self.resolve_components(&content_type.api_id, id, &content_type.fields, &mut node)
            .await?;
        self.resolve_zones(content_type, id, &mut node).await?;

        Ok(node)
    }

    /// Rewrite image-media fields into references, committing asset nodes
    /// and queueing downloads through the shared media synchronizer.
    ///
    /// With images disabled, and for media fields that cannot hold images,
    /// the raw payload stays on the node untouched.
    async fn resolve_media(
        &self,
        type_label: &str,
        fields: &ClassifiedType,
        node: &mut GraphNode,
    ) -> Result<()> {
        let media = match self.media {
            Some(media) => media,
            None => return Ok(()),
        };

        for field in &fields.media {
            if !field.image {
                continue;
            }
            let raw = match node.get(&field.name) {
                Some(FieldValue::Value(value)) => value.clone(),
                _ => continue,
            };
            if raw.is_null() {
                continue;
            }

            if field.multiple {
                let items = match raw.as_array() {
                    Some(items) => items,
                    None => {
                        warn!(
                            content_type = type_label,
                            field = %field.name,
                            "Expected a list of media payloads"
                        );
                        continue;
                    }
                };

                let assets: Vec<MediaAsset> =
                    items.iter().filter_map(MediaAsset::from_value).collect();
                if assets.len() < items.len() {
                    warn!(
                        content_type = type_label,
                        field = %field.name,
                        "Skipping media payloads without id, name, and url"
                    );
                }

                let refs = media.sync_assets(self.store, assets).await?;
                node.set(&field.name, FieldValue::RefList(refs));
            } else {
                match MediaAsset::from_value(&raw) {
                    Some(asset) => {
                        let refs = media.sync_assets(self.store, vec![asset]).await?;
                        if let Some(reference) = refs.into_iter().next() {
                            node.set(&field.name, FieldValue::Ref(reference));
                        }
                    }
                    None => warn!(
                        content_type = type_label,
                        field = %field.name,
                        "Skipping media payload without id, name, and url"
                    ),
                }
            }
        }

        Ok(())
    }

    /// Rewrite relation fields into references by declared cardinality.
    fn resolve_relations(&self, type_label: &str, fields: &ClassifiedType, node: &mut GraphNode) {
        for field in &fields.relations {
            let raw = match node.get(&field.name) {
                Some(FieldValue::Value(value)) => value.clone(),
                _ => continue,
            };

            match self.resolve_relation(type_label, field, &raw) {
                Some(value) => node.set(&field.name, value),
                None => node.remove(&field.name),
            }
        }
    }

    /// One relation field. Empty or absent raw values resolve to no field
    /// at all; an empty reference is never emitted.
    fn resolve_relation(
        &self,
        type_label: &str,
        field: &RelationField,
        raw: &Value,
    ) -> Option<FieldValue> {
        if raw.is_null() {
            return None;
        }
        if matches!(raw, Value::Array(items) if items.is_empty()) {
            return None;
        }

        let (kind, target) = match (field.kind, field.target.as_deref()) {
            (Some(kind), Some(target)) => (kind, target),
            _ => {
                warn!(
                    content_type = type_label,
                    field = %field.name,
                    "No relation handler for this field shape"
                );
                return None;
            }
        };
        let type_name = self.namer.type_name(target);

        if kind.is_multi() {
            let items = match raw.as_array() {
                Some(items) => items,
                None => {
                    warn!(
                        content_type = type_label,
                        field = %field.name,
                        "Expected a list of related stubs"
                    );
                    return None;
                }
            };

            let refs: Vec<Reference> = items
                .iter()
                .filter_map(|stub| match stub.get("id").and_then(id_string) {
                    Some(id) => Some(Reference::new(&type_name, id)),
                    None => {
                        warn!(
                            content_type = type_label,
                            field = %field.name,
                            "Dropping related stub without an id"
                        );
                        None
                    }
                })
                .collect();

            if refs.is_empty() {
                return None;
            }
            Some(FieldValue::RefList(refs))
        } else {
            match raw.get("id").and_then(id_string) {
                Some(id) => Some(FieldValue::Ref(Reference::new(type_name, id))),
                None => {
                    warn!(
                        content_type = type_label,
                        field = %field.name,
                        "Dropping relation without a related id"
                    );
                    None
                }
            }
        }
    }

    /// Rewrite embedded component fields into references, committing one
    /// node per payload in the component's own collection.
    async fn resolve_components(
        &self,
        type_label: &str,
        entry_id: &str,
        fields: &ClassifiedType,
        node: &mut GraphNode,
    ) -> Result<()> {
        for field in &fields.components {
            let raw = match node.get(&field.name) {
                Some(FieldValue::Value(value)) => value.clone(),
                _ => continue,
            };
            if raw.is_null() {
                continue;
            }

            let component = match self.components.get(&field.component) {
                Some(component) => component,
                None => {
                    warn!(
                        content_type = type_label,
                        field = %field.name,
                        component = %field.component,
                        "Dropping component field with no matching descriptor"
                    );
                    node.remove(&field.name);
                    continue;
                }
            };

            if field.repeatable {
                let items = match raw.as_array() {
                    Some(items) => items.clone(),
                    None => {
                        warn!(
                            content_type = type_label,
                            field = %field.name,
                            "Expected a list of component payloads"
                        );
                        node.remove(&field.name);
                        continue;
                    }
                };

                let mut refs = Vec::with_capacity(items.len());
                for (index, payload) in items.iter().enumerate() {
                    let fallback_id = format!("{}-{}-{}", entry_id, field.name, index);
                    if let Some(reference) =
                        self.commit_component(component, payload, &fallback_id).await?
                    {
                        refs.push(reference);
                    }
                }
                node.set(&field.name, FieldValue::RefList(refs));
            } else {
                let fallback_id = format!("{}-{}", entry_id, field.name);
                match self.commit_component(component, &raw, &fallback_id).await? {
                    Some(reference) => node.set(&field.name, FieldValue::Ref(reference)),
                    None => node.remove(&field.name),
                }
            }
        }

        Ok(())
    }

    /// Expand dynamic zone fields element by element.
    ///
    /// Each element's discriminator picks its component descriptor; unknown
    /// discriminators drop the element so schema drift never crashes a
    /// build. The zone field always resolves to a reference list, in
    /// element order.
    async fn resolve_zones(
        &self,
        content_type: &ClassifiedContentType,
        entry_id: &str,
        node: &mut GraphNode,
    ) -> Result<()> {
        for zone in &content_type.fields.zones {
            let elements = match node.get(&zone.name) {
                Some(FieldValue::Value(Value::Array(elements))) => elements.clone(),
                _ => Vec::new(),
            };

            let mut refs = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                let discriminator = match element.get("__component").and_then(Value::as_str) {
                    Some(discriminator) => discriminator,
                    None => {
                        warn!(
                            content_type = %content_type.api_id,
                            field = %zone.name,
                            "Dropping zone element without a component discriminator"
                        );
                        continue;
                    }
                };

                let component = match self.components.get(discriminator) {
                    Some(component) => component,
                    None => {
                        warn!(
                            content_type = %content_type.api_id,
                            field = %zone.name,
                            component = discriminator,
                            "Dropping zone element with unknown component"
                        );
                        continue;
                    }
                };

                let fallback_id = format!("{}-{}-{}", entry_id, zone.name, index);
                if let Some(reference) =
                    self.commit_component(component, element, &fallback_id).await?
                {
                    refs.push(reference);
                }
            }

            node.set(&zone.name, FieldValue::RefList(refs));
        }

        Ok(())
    }

    /// Commit one component payload as a node in its component collection.
    ///
    /// The payload's own image-media and relation fields resolve by the
    /// same rules as entries; zones or components nested one level deeper
    /// are dropped with a warning. Payloads without an id get a
    /// deterministic id derived from their position.
    async fn commit_component(
        &self,
        component: &ClassifiedComponent,
        payload: &Value,
        fallback_id: &str,
    ) -> Result<Option<Reference>> {
        let raw = match payload.as_object() {
            Some(raw) => raw,
            None => {
                warn!(component = %component.uid, "Dropping non-object component payload");
                return Ok(None);
            }
        };

        let id = raw
            .get("id")
            .and_then(id_string)
            .unwrap_or_else(|| fallback_id.to_string());

        let mut node = GraphNode::new(&id);
        for (field, value) in raw {
            node.set(field, FieldValue::Value(value.clone()));
        }
        node.set(
            "component",
            FieldValue::Value(Value::String(component.uid.clone())),
        );

        self.resolve_media(&component.uid, &component.fields, &mut node)
            .await?;
        self.resolve_relations(&component.uid, &component.fields, &mut node);

        for zone in &component.fields.zones {
            if node.get(&zone.name).is_some() {
                warn!(
                    component = %component.uid,
                    field = %zone.name,
                    "Dropping dynamic zone nested inside a component"
                );
                node.remove(&zone.name);
            }
        }
        for nested in &component.fields.components {
            if node.get(&nested.name).is_some() {
                warn!(
                    component = %component.uid,
                    field = %nested.name,
                    "Dropping component nested inside a component"
                );
                node.remove(&nested.name);
            }
        }

        self.store.ensure_collection(&component.type_name).await?;
        self.store.insert_node(&component.type_name, node).await?;

        Ok(Some(Reference::new(&component.type_name, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{component_descriptor, content_descriptor, MockSource};
    use serde_json::json;

    fn entry(value: Value) -> Entry {
        match value {
            Value::Object(map) => map,
            _ => panic!("entries are objects"),
        }
    }

    fn article_type(namer: &TypeNamer) -> ClassifiedContentType {
        ClassifiedContentType::from_descriptor(
            namer,
            &content_descriptor(
                "article",
                "collectionType",
                json!({
                    "title": { "type": "string" },
                    "author": { "type": "relation", "relationType": "manyToOne", "model": "author" },
                    "tags": { "type": "relation", "relationType": "manyToMany", "collection": "tag" },
                    "body": { "type": "dynamiczone", "components": ["sections.hero"] }
                }),
            ),
        )
    }

    fn hero_index(namer: &TypeNamer) -> ComponentIndex {
        ComponentIndex::build(
            namer,
            &[component_descriptor(
                "sections.hero",
                json!({ "heading": { "type": "string" } }),
            )],
        )
    }

    fn resolver<'a>(
        namer: &'a TypeNamer,
        components: &'a ComponentIndex,
        store: &'a MemoryStore,
    ) -> EntryResolver<'a, MockSource, MemoryStore> {
        EntryResolver::new(namer, components, None, store)
    }

    #[tokio::test]
    async fn empty_relations_are_omitted_from_the_node() {
        let namer = TypeNamer::new("Test");
        let components = ComponentIndex::default();
        let store = MemoryStore::new();
        let resolver = resolver(&namer, &components, &store);

        let committed = resolver
            .resolve_type(
                &article_type(&namer),
                vec![entry(json!({
                    "id": 1,
                    "title": "Hi",
                    "author": null,
                    "tags": []
                }))],
            )
            .await
            .unwrap();
        assert_eq!(committed, 1);

        let node = store.get_node("TestArticle", "1").unwrap();
        assert!(node.get("author").is_none());
        assert!(node.get("tags").is_none());
        assert_eq!(node.get("title"), Some(&FieldValue::Value(json!("Hi"))));
    }

    #[tokio::test]
    async fn relations_resolve_by_cardinality_preserving_order() {
        let namer = TypeNamer::new("Test");
        let components = ComponentIndex::default();
        let store = MemoryStore::new();
        let resolver = resolver(&namer, &components, &store);

        resolver
            .resolve_type(
                &article_type(&namer),
                vec![entry(json!({
                    "id": 1,
                    "author": { "id": 7, "name": "Sam" },
                    "tags": [{ "id": 3 }, { "id": 1 }, { "id": 2 }]
                }))],
            )
            .await
            .unwrap();

        let node = store.get_node("TestArticle", "1").unwrap();
        assert_eq!(
            node.get("author"),
            Some(&FieldValue::Ref(Reference::new("TestAuthor", "7")))
        );
        assert_eq!(
            node.get("tags"),
            Some(&FieldValue::RefList(vec![
                Reference::new("TestTag", "3"),
                Reference::new("TestTag", "1"),
                Reference::new("TestTag", "2"),
            ]))
        );
    }

    #[tokio::test]
    async fn unknown_relation_shapes_drop_the_field() {
        let namer = TypeNamer::new("Test");
        let components = ComponentIndex::default();
        let store = MemoryStore::new();
        let resolver = resolver(&namer, &components, &store);

        let polymorphic = ClassifiedContentType::from_descriptor(
            &namer,
            &content_descriptor(
                "article",
                "collectionType",
                json!({
                    "owner": { "type": "relation", "relationType": "morphOne", "model": "user" }
                }),
            ),
        );

        resolver
            .resolve_type(
                &polymorphic,
                vec![entry(json!({ "id": 1, "owner": { "id": 4 } }))],
            )
            .await
            .unwrap();

        let node = store.get_node("TestArticle", "1").unwrap();
        assert!(node.get("owner").is_none());
    }

    #[tokio::test]
    async fn zone_elements_with_unknown_discriminators_are_dropped() {
        let namer = TypeNamer::new("Test");
        let components = hero_index(&namer);
        let store = MemoryStore::new();
        let resolver = resolver(&namer, &components, &store);

        resolver
            .resolve_type(
                &article_type(&namer),
                vec![entry(json!({
                    "id": 1,
                    "body": [
                        { "__component": "sections.hero", "id": 11, "heading": "Welcome" },
                        { "__component": "sections.unknown", "id": 12 }
                    ]
                }))],
            )
            .await
            .unwrap();

        let node = store.get_node("TestArticle", "1").unwrap();
        assert_eq!(
            node.get("body"),
            Some(&FieldValue::RefList(vec![Reference::new(
                "TestSectionsHero",
                "11"
            )]))
        );

        // The known element committed into its component collection, with
        // its discriminator recorded.
        let hero = store.get_node("TestSectionsHero", "11").unwrap();
        assert_eq!(
            hero.get("component"),
            Some(&FieldValue::Value(json!("sections.hero")))
        );
        assert_eq!(store.node_count("TestSectionsHero"), 1);
    }

    #[tokio::test]
    async fn zone_elements_without_ids_get_deterministic_ones() {
        let namer = TypeNamer::new("Test");
        let components = hero_index(&namer);
        let store = MemoryStore::new();
        let resolver = resolver(&namer, &components, &store);

        resolver
            .resolve_type(
                &article_type(&namer),
                vec![entry(json!({
                    "id": 5,
                    "body": [{ "__component": "sections.hero", "heading": "Welcome" }]
                }))],
            )
            .await
            .unwrap();

        let node = store.get_node("TestArticle", "5").unwrap();
        assert_eq!(
            node.get("body"),
            Some(&FieldValue::RefList(vec![Reference::new(
                "TestSectionsHero",
                "5-body-0"
            )]))
        );
        assert!(store.get_node("TestSectionsHero", "5-body-0").is_some());
    }

    #[tokio::test]
    async fn repeatable_component_fields_commit_one_node_per_payload() {
        let namer = TypeNamer::new("Test");
        let components = hero_index(&namer);
        let store = MemoryStore::new();
        let resolver = resolver(&namer, &components, &store);

        let with_components = ClassifiedContentType::from_descriptor(
            &namer,
            &content_descriptor(
                "page",
                "collectionType",
                json!({
                    "hero": { "type": "component", "component": "sections.hero" },
                    "panels": { "type": "component", "component": "sections.hero", "repeatable": true }
                }),
            ),
        );

        resolver
            .resolve_type(
                &with_components,
                vec![entry(json!({
                    "id": 2,
                    "hero": { "id": 21, "heading": "Top" },
                    "panels": [{ "heading": "One" }, { "heading": "Two" }]
                }))],
            )
            .await
            .unwrap();

        let node = store.get_node("TestPage", "2").unwrap();
        assert_eq!(
            node.get("hero"),
            Some(&FieldValue::Ref(Reference::new("TestSectionsHero", "21")))
        );
        assert_eq!(
            node.get("panels"),
            Some(&FieldValue::RefList(vec![
                Reference::new("TestSectionsHero", "2-panels-0"),
                Reference::new("TestSectionsHero", "2-panels-1"),
            ]))
        );
        assert_eq!(store.node_count("TestSectionsHero"), 3);
    }

    #[tokio::test]
    async fn entries_without_ids_are_skipped() {
        let namer = TypeNamer::new("Test");
        let components = ComponentIndex::default();
        let store = MemoryStore::new();
        let resolver = resolver(&namer, &components, &store);

        let committed = resolver
            .resolve_type(
                &article_type(&namer),
                vec![
                    entry(json!({ "title": "No identity" })),
                    entry(json!({ "id": 2, "title": "Ok" })),
                ],
            )
            .await
            .unwrap();

        assert_eq!(committed, 1);
        assert_eq!(store.node_count("TestArticle"), 1);
    }
}
