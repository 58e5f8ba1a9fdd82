//! Configuration for sync runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SyncError};

/// Configuration for a full sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the source API
    pub api_url: String,

    /// Type-name prefix for every synced collection
    pub prefix: String,

    /// Number of content types fetched and resolved simultaneously
    pub concurrency: usize,

    /// Page size for offset/limit entry pagination
    pub limit: usize,

    /// Fetch component descriptors (required for dynamic zone resolution)
    pub components: bool,

    /// Log per-type progress detail
    pub debug: bool,

    /// Image download settings; None leaves media fields raw
    pub images: Option<ImageConfig>,
}

impl SyncConfig {
    /// Create a config with default pool widths and page size.
    pub fn new(api_url: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            prefix: prefix.into(),
            concurrency: 5,
            limit: 100,
            components: true,
            debug: false,
            images: None,
        }
    }

    /// Set how many content types are processed simultaneously.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the entry pagination page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Skip the component-descriptor fetch (dynamic zones will not resolve).
    pub fn without_components(mut self) -> Self {
        self.components = false;
        self
    }

    /// Enable per-type progress logging.
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Enable image downloading.
    pub fn with_images(mut self, images: ImageConfig) -> Self {
        self.images = Some(images);
        self
    }

    /// Check required options. Runs before any I/O.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(SyncError::MissingOption("api_url"));
        }
        if self.prefix.trim().is_empty() {
            return Err(SyncError::MissingOption("prefix"));
        }
        if let Some(images) = &self.images {
            if images.dir.as_os_str().is_empty() {
                return Err(SyncError::MissingOption("images.dir"));
            }
        }
        Ok(())
    }
}

/// Image download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Directory downloaded files land in (created if absent)
    pub dir: PathBuf,

    /// Skip downloads whose destination file already exists
    pub cache: bool,

    /// Node field that carries the local file path
    pub key: String,

    /// Number of simultaneous downloads
    pub concurrency: usize,
}

impl ImageConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: true,
            key: "downloaded".to_string(),
            concurrency: 20,
        }
    }

    /// Enable or disable the existing-file cache check.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Set the node field that carries the local file path.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the download pool width.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_widths() {
        let config = SyncConfig::new("http://localhost:1337", "Test");
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.limit, 100);
        assert!(config.components);
        assert!(!config.debug);
        assert!(config.images.is_none());

        let images = ImageConfig::new("./assets");
        assert!(images.cache);
        assert_eq!(images.key, "downloaded");
        assert_eq!(images.concurrency, 20);
    }

    #[test]
    fn validate_rejects_blank_required_options() {
        let missing_url = SyncConfig::new("", "Test");
        assert!(matches!(
            missing_url.validate(),
            Err(SyncError::MissingOption("api_url"))
        ));

        let blank_prefix = SyncConfig::new("http://localhost:1337", "  ");
        assert!(matches!(
            blank_prefix.validate(),
            Err(SyncError::MissingOption("prefix"))
        ));

        let empty_dir =
            SyncConfig::new("http://localhost:1337", "Test").with_images(ImageConfig::new(""));
        assert!(matches!(
            empty_dir.validate(),
            Err(SyncError::MissingOption("images.dir"))
        ));
    }

    #[test]
    fn builders_override_defaults() {
        let config = SyncConfig::new("http://localhost:1337", "Test")
            .with_concurrency(2)
            .with_limit(10)
            .without_components()
            .with_debug();

        assert_eq!(config.concurrency, 2);
        assert_eq!(config.limit, 10);
        assert!(!config.components);
        assert!(config.debug);
    }
}
