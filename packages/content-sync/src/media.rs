//! Media synchronization - deduplicated, bounded-concurrency asset downloads.
//!
//! One `MediaSync` lives for the whole build. Every referenced asset is
//! committed to the shared media collection at most once (keyed by source
//! id), and its binary payload is fetched at most once, no matter how many
//! entries reference it or how many resolver tasks run concurrently.
//!
//! Nodes are committed immediately so relation rewriting never waits on a
//! download; the downloads themselves run on spawned tasks behind a
//! semaphore and are drained by [`MediaSync::finish`] before the run ends.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::{ContentSource, GraphStore};
use crate::types::config::ImageConfig;
use crate::types::node::{id_string, FieldValue, GraphNode, Reference};
use crate::types::report::MediaStats;

/// A media payload lifted out of an entry field.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    /// Source-side asset id; the dedup key
    pub id: String,
    /// Declared file name; the asset lands at `<dir>/<name>`
    pub name: String,
    /// Source URL, absolute or relative to the API base
    pub url: String,
    /// Full raw payload, carried onto the committed node
    pub raw: Map<String, Value>,
}

impl MediaAsset {
    /// Parse an asset out of a raw media payload.
    ///
    /// Requires `id`, `name`, and `url`; payloads missing any of them have
    /// no usable identity or destination and yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let raw = value.as_object()?;
        let id = id_string(raw.get("id")?)?;
        let name = raw.get("name")?.as_str()?.to_string();
        let url = raw.get("url")?.as_str()?.to_string();

        Some(Self {
            id,
            name,
            url,
            raw: raw.clone(),
        })
    }
}

enum DownloadOutcome {
    Fetched,
    Cached,
    Failed(String),
}

/// Build-wide media synchronizer.
pub struct MediaSync<S> {
    source: Arc<S>,
    /// Shared media collection name
    type_name: String,
    config: ImageConfig,
    semaphore: Arc<Semaphore>,
    seen: Mutex<HashSet<String>>,
    handles: Mutex<Vec<JoinHandle<DownloadOutcome>>>,
}

impl<S: ContentSource + 'static> MediaSync<S> {
    /// Create the synchronizer and its download directory.
    pub fn new(source: Arc<S>, type_name: impl Into<String>, config: ImageConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.dir)?;

        Ok(Self {
            source,
            type_name: type_name.into(),
            semaphore: Arc::new(Semaphore::new(config.concurrency)),
            config,
            seen: Mutex::new(HashSet::new()),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// The collection media nodes are committed to.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Commit nodes for a batch of assets and return references to them.
    ///
    /// Unseen assets get a node and a queued download; assets already seen
    /// this build only produce the reference.
    pub async fn sync_assets(
        &self,
        store: &impl GraphStore,
        assets: Vec<MediaAsset>,
    ) -> Result<Vec<Reference>> {
        let mut refs = Vec::with_capacity(assets.len());

        for asset in assets {
            refs.push(Reference::new(&self.type_name, &asset.id));

            let first_sighting = self.seen.lock().unwrap().insert(asset.id.clone());
            if !first_sighting {
                continue;
            }

            let dest = self.config.dir.join(&asset.name);
            store
                .insert_node(&self.type_name, self.asset_node(&asset, &dest))
                .await?;
            self.spawn_download(asset, dest);
        }

        Ok(refs)
    }

    /// Wait for every queued download and return the combined counters.
    pub async fn finish(&self) -> MediaStats {
        let handles = std::mem::take(&mut *self.handles.lock().unwrap());
        let mut stats = MediaStats::default();

        for handle in handles {
            match handle.await {
                Ok(DownloadOutcome::Fetched) => stats.downloaded += 1,
                Ok(DownloadOutcome::Cached) => stats.cached += 1,
                Ok(DownloadOutcome::Failed(name)) => stats.failed.push(name),
                Err(e) => warn!(error = %e, "Media download task failed to complete"),
            }
        }

        stats
    }

    /// The committed node: the full raw payload plus the local path under
    /// the configured key.
    fn asset_node(&self, asset: &MediaAsset, dest: &Path) -> GraphNode {
        let mut node = GraphNode::new(&asset.id);
        for (field, value) in &asset.raw {
            node.set(field, FieldValue::Value(value.clone()));
        }
        node.set(
            &self.config.key,
            FieldValue::Value(Value::String(dest.to_string_lossy().into_owned())),
        );
        node
    }

    fn spawn_download(&self, asset: MediaAsset, dest: PathBuf) {
        let source = Arc::clone(&self.source);
        let semaphore = Arc::clone(&self.semaphore);
        let cache = self.config.cache;
        let part = self.config.dir.join(format!(".{}.part", asset.name));

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return DownloadOutcome::Failed(asset.name),
            };

            if cache && tokio::fs::try_exists(&dest).await.unwrap_or(false) {
                debug!(file = %dest.display(), "Media file already present, skipping download");
                return DownloadOutcome::Cached;
            }

            // Stage into a part file so a partial write is never mistaken
            // for a complete download.
            let staged = match source.download_asset(&asset.url, &part).await {
                Ok(()) => tokio::fs::rename(&part, &dest).await.map_err(|e| e.into()),
                Err(e) => Err(e),
            };

            match staged {
                Ok(()) => {
                    debug!(url = %asset.url, file = %dest.display(), "Downloaded media file");
                    DownloadOutcome::Fetched
                }
                Err(e) => {
                    warn!(url = %asset.url, error = %e, "Media download failed; node keeps its local path");
                    let _ = tokio::fs::remove_file(&part).await;
                    DownloadOutcome::Failed(asset.name)
                }
            }
        });

        self.handles.lock().unwrap().push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::MockSource;
    use serde_json::json;

    fn asset(id: u64, name: &str) -> MediaAsset {
        MediaAsset::from_value(&json!({
            "id": id,
            "name": name,
            "url": format!("/uploads/{name}"),
            "mime": "image/png"
        }))
        .unwrap()
    }

    fn media_sync(source: MockSource, dir: &Path) -> MediaSync<MockSource> {
        MediaSync::new(Arc::new(source), "TestImage", ImageConfig::new(dir)).unwrap()
    }

    #[test]
    fn from_value_requires_identity_and_destination() {
        assert!(MediaAsset::from_value(&json!({ "id": 1, "name": "a.png", "url": "/a" })).is_some());
        assert!(MediaAsset::from_value(&json!({ "name": "a.png", "url": "/a" })).is_none());
        assert!(MediaAsset::from_value(&json!({ "id": 1, "url": "/a" })).is_none());
        assert!(MediaAsset::from_value(&json!(null)).is_none());
    }

    #[tokio::test]
    async fn shared_assets_commit_one_node_and_one_download() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let media = media_sync(MockSource::new(), dir.path());

        // The same asset referenced from two different batches.
        let first = media
            .sync_assets(&store, vec![asset(9, "a.png")])
            .await
            .unwrap();
        let second = media
            .sync_assets(&store, vec![asset(9, "a.png")])
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0], Reference::new("TestImage", "9"));

        let stats = media.finish().await;
        assert_eq!(stats.downloaded, 1);
        assert_eq!(store.node_count("TestImage"), 1);
        assert_eq!(media.source.download_calls().len(), 1);
        assert!(dir.path().join("a.png").exists());
    }

    #[tokio::test]
    async fn cached_files_skip_the_network() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"already here").unwrap();

        let store = MemoryStore::new();
        let media = media_sync(MockSource::new(), dir.path());

        media
            .sync_assets(&store, vec![asset(9, "a.png")])
            .await
            .unwrap();

        let stats = media.finish().await;
        assert_eq!(stats.downloaded, 0);
        assert_eq!(stats.cached, 1);
        assert!(media.source.download_calls().is_empty());
    }

    #[tokio::test]
    async fn failed_download_leaves_no_file_but_keeps_the_node() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let source = MockSource::new().failing_asset("/uploads/a.png");
        let media = media_sync(source, dir.path());

        media
            .sync_assets(&store, vec![asset(9, "a.png")])
            .await
            .unwrap();

        let stats = media.finish().await;
        assert_eq!(stats.failed, vec!["a.png".to_string()]);
        assert_eq!(store.node_count("TestImage"), 1);
        assert!(!dir.path().join("a.png").exists());
        assert!(!dir.path().join(".a.png.part").exists());

        // The node still advertises its intended local path.
        let node = store.get_node("TestImage", "9").unwrap();
        let expected = dir.path().join("a.png");
        assert_eq!(
            node.get("downloaded"),
            Some(&FieldValue::Value(json!(expected.to_string_lossy())))
        );
    }
}
