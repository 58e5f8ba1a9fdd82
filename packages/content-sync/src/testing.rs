//! Testing utilities including mock implementations.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, RwLock};

use cms_client::types::{ContentType, Entry};

use crate::error::{SourceError, SourceResult};
use crate::traits::ContentSource;

/// Record of one call made against a [`MockSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockSourceCall {
    ContentTypes,
    Components,
    CollectionEntries { endpoint: String },
    SingletonEntry { endpoint: String },
    DownloadAsset { url: String },
}

/// Mock [`ContentSource`] with canned descriptors, entries, and asset bodies.
///
/// Clones share state, so a test can keep a handle for assertions while the
/// pipeline owns another. Failure modes are opt-in per endpoint or asset.
#[derive(Default, Clone)]
pub struct MockSource {
    content_types: Arc<RwLock<Vec<ContentType>>>,
    components: Arc<RwLock<Vec<ContentType>>>,
    collections: Arc<RwLock<HashMap<String, Vec<Entry>>>>,
    singletons: Arc<RwLock<HashMap<String, Entry>>>,
    asset_bodies: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_content_types: Arc<RwLock<bool>>,
    fail_components: Arc<RwLock<bool>>,
    fail_endpoints: Arc<RwLock<HashSet<String>>>,
    fail_assets: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<MockSourceCall>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(self, descriptor: ContentType) -> Self {
        self.content_types.write().unwrap().push(descriptor);
        self
    }

    pub fn with_component(self, descriptor: ContentType) -> Self {
        self.components.write().unwrap().push(descriptor);
        self
    }

    pub fn with_collection(self, endpoint: impl Into<String>, entries: Vec<Entry>) -> Self {
        self.collections
            .write()
            .unwrap()
            .insert(endpoint.into(), entries);
        self
    }

    pub fn with_singleton(self, endpoint: impl Into<String>, entry: Entry) -> Self {
        self.singletons
            .write()
            .unwrap()
            .insert(endpoint.into(), entry);
        self
    }

    pub fn with_asset(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.asset_bodies
            .write()
            .unwrap()
            .insert(url.into(), body.into());
        self
    }

    /// Make the content-type listing fail, as an unauthorized schema read does.
    pub fn failing_content_types(self) -> Self {
        *self.fail_content_types.write().unwrap() = true;
        self
    }

    /// Make the component listing fail.
    pub fn failing_components(self) -> Self {
        *self.fail_components.write().unwrap() = true;
        self
    }

    /// Make entry fetches against one endpoint fail.
    pub fn failing_endpoint(self, endpoint: impl Into<String>) -> Self {
        self.fail_endpoints.write().unwrap().insert(endpoint.into());
        self
    }

    /// Make downloads of one asset url fail.
    pub fn failing_asset(self, url: impl Into<String>) -> Self {
        self.fail_assets.write().unwrap().insert(url.into());
        self
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<MockSourceCall> {
        self.calls.read().unwrap().clone()
    }

    /// Urls of every download attempt, in call order.
    pub fn download_calls(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                MockSourceCall::DownloadAsset { url } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockSourceCall) {
        self.calls.write().unwrap().push(call);
    }

    fn unavailable(what: &str) -> SourceError {
        SourceError::Http(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            format!("{what} unavailable"),
        )))
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn content_types(&self) -> SourceResult<Vec<ContentType>> {
        self.record(MockSourceCall::ContentTypes);
        if *self.fail_content_types.read().unwrap() {
            return Err(Self::unavailable("content types"));
        }
        Ok(self.content_types.read().unwrap().clone())
    }

    async fn components(&self) -> SourceResult<Vec<ContentType>> {
        self.record(MockSourceCall::Components);
        if *self.fail_components.read().unwrap() {
            return Err(Self::unavailable("components"));
        }
        Ok(self.components.read().unwrap().clone())
    }

    async fn collection_entries(
        &self,
        endpoint: &str,
        _page_size: usize,
    ) -> SourceResult<Vec<Entry>> {
        self.record(MockSourceCall::CollectionEntries {
            endpoint: endpoint.to_string(),
        });
        if self.fail_endpoints.read().unwrap().contains(endpoint) {
            return Err(Self::unavailable(endpoint));
        }
        Ok(self
            .collections
            .read()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or_default())
    }

    async fn singleton_entry(&self, endpoint: &str) -> SourceResult<Entry> {
        self.record(MockSourceCall::SingletonEntry {
            endpoint: endpoint.to_string(),
        });
        if self.fail_endpoints.read().unwrap().contains(endpoint) {
            return Err(Self::unavailable(endpoint));
        }
        self.singletons
            .read()
            .unwrap()
            .get(endpoint)
            .cloned()
            .ok_or_else(|| Self::unavailable(endpoint))
    }

    async fn download_asset(&self, url: &str, dest: &Path) -> SourceResult<()> {
        self.record(MockSourceCall::DownloadAsset {
            url: url.to_string(),
        });
        if self.fail_assets.read().unwrap().contains(url) {
            return Err(Self::unavailable(url));
        }
        let body = self
            .asset_bodies
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| b"binary".to_vec());
        tokio::fs::write(dest, body).await?;
        Ok(())
    }
}

/// Build a content-type descriptor the way the management API serves one.
pub fn content_descriptor(api_id: &str, kind: &str, attributes: Value) -> ContentType {
    serde_json::from_value(json!({
        "uid": format!("application::{api_id}.{api_id}"),
        "apiID": api_id,
        "kind": kind,
        "isDisplayed": true,
        "attributes": attributes,
    }))
    .unwrap()
}

/// Build a component descriptor. Components carry no kind and their type
/// name derives from the uid.
pub fn component_descriptor(uid: &str, attributes: Value) -> ContentType {
    let api_id = uid.rsplit('.').next().unwrap_or(uid);
    serde_json::from_value(json!({
        "uid": uid,
        "apiID": api_id,
        "isDisplayed": true,
        "attributes": attributes,
    }))
    .unwrap()
}

/// Convert a JSON object literal into an entry map.
pub fn entry(value: Value) -> Entry {
    match value {
        Value::Object(map) => map,
        other => panic!("entries are JSON objects, got {other}"),
    }
}
