//! Source trait for the remote content system.

use async_trait::async_trait;
use std::path::Path;

use cms_client::types::{ContentType, Entry};

use crate::error::SourceResult;

/// A remote content system the engine syncs from.
///
/// The HTTP client implements this over the real admin API; tests use
/// `MockSource`. Pagination is the source's concern: `collection_entries`
/// returns the complete entry list for an endpoint.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the content-type descriptors.
    async fn content_types(&self) -> SourceResult<Vec<ContentType>>;

    /// Fetch the component descriptors.
    async fn components(&self) -> SourceResult<Vec<ContentType>>;

    /// Fetch every entry of a collection-type endpoint, in source order.
    async fn collection_entries(&self, endpoint: &str, page_size: usize)
        -> SourceResult<Vec<Entry>>;

    /// Fetch the sole entry of a single-type endpoint.
    async fn singleton_entry(&self, endpoint: &str) -> SourceResult<Entry>;

    /// Download an asset to the given destination path.
    ///
    /// `url` may be absolute or relative to the source's base URL. The write
    /// need not be atomic; callers stage downloads and rename on completion.
    async fn download_asset(&self, url: &str, dest: &Path) -> SourceResult<()>;
}
