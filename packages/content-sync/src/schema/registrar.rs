//! Graph type registration.
//!
//! Emits one object type per classified content type and component, a union
//! type plus zone resolver per dynamic zone field, and a root query resolver
//! per singleton type. Relation and dynamic zone fields are deliberately
//! absent from the static object types: relations resolve through stored
//! references under inference, zones through their union resolvers.

use tracing::warn;

use crate::error::Result;
use crate::schema::classify::{ClassifiedContentType, ClassifiedType, ComponentIndex, ZoneField};
use crate::traits::GraphStore;
use crate::types::naming::TypeNamer;
use crate::types::schema::{FieldType, ObjectType, Resolver, UnionType};

/// Interface content types implement in the destination schema.
/// Components are embedded fragments and do not.
const NODE_INTERFACE: &str = "Node";

/// Register object types for every content type and component, plus the
/// union type and zone resolver for each dynamic zone field.
pub async fn register_types<G: GraphStore>(
    store: &G,
    namer: &TypeNamer,
    content_types: &[ClassifiedContentType],
    components: &ComponentIndex,
    images_enabled: bool,
) -> Result<()> {
    for component in components.iter() {
        let object = object_type(
            namer,
            &component.type_name,
            &component.uid,
            &component.fields,
            components,
            images_enabled,
            false,
        );
        store.register_object_type(object).await?;
    }

    for content_type in content_types {
        let object = object_type(
            namer,
            &content_type.type_name,
            &content_type.api_id,
            &content_type.fields,
            components,
            images_enabled,
            true,
        );
        store.register_object_type(object).await?;

        for zone in &content_type.fields.zones {
            let (union, resolver) = build_union_type(namer, content_type, zone, components);
            store.register_union_type(union).await?;
            store.register_resolver(resolver).await?;
        }
    }

    Ok(())
}

/// Register one root query resolver per singleton content type.
///
/// The resolver yields the sole node of the collection and nothing when the
/// collection is empty; it is registered even for types whose entry fetch
/// failed, so an unpopulated singleton is still addressable.
pub async fn register_singleton_queries<G: GraphStore>(
    store: &G,
    namer: &TypeNamer,
    content_types: &[ClassifiedContentType],
) -> Result<()> {
    for content_type in content_types.iter().filter(|t| t.is_singleton()) {
        store
            .register_resolver(Resolver::SingletonQuery {
                field: namer.query_field(&content_type.type_name),
                type_name: content_type.type_name.clone(),
            })
            .await?;
    }

    Ok(())
}

/// Build the union descriptor and zone resolver for one dynamic zone field.
///
/// Allowed components with no fetched descriptor are left out of the union
/// with a warning; their elements are dropped at resolution time anyway.
pub fn build_union_type(
    namer: &TypeNamer,
    content_type: &ClassifiedContentType,
    zone: &ZoneField,
    components: &ComponentIndex,
) -> (UnionType, Resolver) {
    let mut union = UnionType::new(namer.union_name(&content_type.api_id, &zone.name));

    for uid in &zone.components {
        match components.get(uid) {
            Some(component) => union = union.with_member(uid, &component.type_name),
            None => warn!(
                content_type = %content_type.api_id,
                field = %zone.name,
                component = %uid,
                "Dynamic zone allows a component with no fetched descriptor"
            ),
        }
    }

    let resolver = Resolver::ZoneField {
        type_name: content_type.type_name.clone(),
        field: zone.name.clone(),
        union: union.name.clone(),
    };

    (union, resolver)
}

/// The static object type for one classified descriptor.
fn object_type(
    namer: &TypeNamer,
    type_name: &str,
    type_label: &str,
    fields: &ClassifiedType,
    components: &ComponentIndex,
    images_enabled: bool,
    node_interface: bool,
) -> ObjectType {
    let mut object = ObjectType::new(type_name).with_field("id", FieldType::Id);
    if node_interface {
        object = object.with_interface(NODE_INTERFACE);
    }

    for scalar in &fields.scalars {
        object = object.with_field(&scalar.name, FieldType::Scalar(scalar.scalar));
    }

    if images_enabled {
        for media in &fields.media {
            if !media.image {
                warn!(
                    content_type = type_label,
                    field = %media.name,
                    "Media field cannot hold images; left to inference"
                );
                continue;
            }
            object = object.with_field(
                &media.name,
                FieldType::Reference {
                    type_name: namer.media_type_name(),
                    list: media.multiple,
                },
            );
        }
    }

    for component in &fields.components {
        match components.get(&component.component) {
            Some(classified) => {
                object = object.with_field(
                    &component.name,
                    FieldType::Reference {
                        type_name: classified.type_name.clone(),
                        list: component.repeatable,
                    },
                );
            }
            None => warn!(
                content_type = type_label,
                field = %component.name,
                component = %component.component,
                "Component field has no fetched descriptor; left to inference"
            ),
        }
    }

    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{component_descriptor, content_descriptor};
    use crate::types::schema::ScalarType;
    use serde_json::json;

    fn fixture(namer: &TypeNamer) -> (Vec<ClassifiedContentType>, ComponentIndex) {
        let article = ClassifiedContentType::from_descriptor(
            namer,
            &content_descriptor(
                "article",
                "collectionType",
                json!({
                    "title": { "type": "string" },
                    "views": { "type": "integer" },
                    "cover": { "type": "media", "allowedTypes": ["images"] },
                    "attachment": { "type": "media", "allowedTypes": ["files"] },
                    "hero": { "type": "component", "component": "sections.hero" },
                    "author": { "type": "relation", "relationType": "manyToOne", "model": "author" },
                    "body": { "type": "dynamiczone", "components": ["sections.hero", "sections.ghost"] },
                    "odd": { "type": "geopoint" }
                }),
            ),
        );
        let settings = ClassifiedContentType::from_descriptor(
            namer,
            &content_descriptor("settings", "singleType", json!({ "siteName": { "type": "string" } })),
        );

        let components = ComponentIndex::build(
            namer,
            &[component_descriptor(
                "sections.hero",
                json!({ "heading": { "type": "string" } }),
            )],
        );

        (vec![article, settings], components)
    }

    #[tokio::test]
    async fn object_types_declare_exactly_the_static_fields() {
        let namer = TypeNamer::new("Test");
        let (content_types, components) = fixture(&namer);
        let store = MemoryStore::new();

        register_types(&store, &namer, &content_types, &components, true)
            .await
            .unwrap();

        let article = store.object_type("TestArticle").unwrap();
        assert_eq!(article.interfaces, vec!["Node".to_string()]);
        assert!(article.infer);
        assert_eq!(article.fields["id"], FieldType::Id);
        assert_eq!(article.fields["title"], FieldType::Scalar(ScalarType::String));
        assert_eq!(article.fields["views"], FieldType::Scalar(ScalarType::Int));
        assert_eq!(
            article.fields["cover"],
            FieldType::Reference {
                type_name: "TestImage".to_string(),
                list: false
            }
        );
        assert_eq!(
            article.fields["hero"],
            FieldType::Reference {
                type_name: "TestSectionsHero".to_string(),
                list: false
            }
        );
        // relations, zones, non-image media, unmapped kinds: not declared
        assert!(!article.fields.contains_key("author"));
        assert!(!article.fields.contains_key("body"));
        assert!(!article.fields.contains_key("attachment"));
        assert!(!article.fields.contains_key("odd"));

        // components do not implement Node
        let hero = store.object_type("TestSectionsHero").unwrap();
        assert!(hero.interfaces.is_empty());
        assert_eq!(hero.fields["heading"], FieldType::Scalar(ScalarType::String));
    }

    #[tokio::test]
    async fn media_fields_are_not_declared_when_images_are_disabled() {
        let namer = TypeNamer::new("Test");
        let (content_types, components) = fixture(&namer);
        let store = MemoryStore::new();

        register_types(&store, &namer, &content_types, &components, false)
            .await
            .unwrap();

        let article = store.object_type("TestArticle").unwrap();
        assert!(!article.fields.contains_key("cover"));
    }

    #[tokio::test]
    async fn zone_unions_carry_only_known_members() {
        let namer = TypeNamer::new("Test");
        let (content_types, components) = fixture(&namer);
        let store = MemoryStore::new();

        register_types(&store, &namer, &content_types, &components, true)
            .await
            .unwrap();

        let union = store.union_type("TestArticleBody").unwrap();
        assert_eq!(union.members, vec!["TestSectionsHero".to_string()]);
        assert_eq!(
            union.resolve_member("sections.hero"),
            Some("TestSectionsHero")
        );
        assert_eq!(union.resolve_member("sections.ghost"), None);

        assert!(store.resolvers().contains(&Resolver::ZoneField {
            type_name: "TestArticle".to_string(),
            field: "body".to_string(),
            union: "TestArticleBody".to_string(),
        }));
    }

    #[tokio::test]
    async fn singleton_queries_register_camel_cased_fields() {
        let namer = TypeNamer::new("Test");
        let (content_types, _) = fixture(&namer);
        let store = MemoryStore::new();

        register_singleton_queries(&store, &namer, &content_types)
            .await
            .unwrap();

        assert_eq!(
            store.resolvers(),
            vec![Resolver::SingletonQuery {
                field: "testSettings".to_string(),
                type_name: "TestSettings".to_string(),
            }]
        );
    }
}
