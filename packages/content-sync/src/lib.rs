//! Content Synchronization Engine
//!
//! Syncs a headless CMS into a typed graph store: schema descriptors are
//! classified, entries become graph nodes with relations, embedded
//! components, and dynamic zones rewritten into typed references, media
//! files are mirrored to disk, and the static portion of the schema is
//! registered alongside query resolvers.
//!
//! # Design
//!
//! - Schema-driven: the descriptor, not the payload, decides how a field
//!   resolves
//! - Failures stay narrow: one bad field, entry, or download never aborts
//!   a run. Only an unreadable schema does
//! - References over embedding: related records link by (type name, id),
//!   so cycles are fine and every entity owns its own record
//! - Bounded concurrency: content types and downloads run in pools with
//!   configurable widths
//!
//! # Usage
//!
//! ```rust,ignore
//! use content_sync::{CmsClient, ImageConfig, MemoryStore, SyncConfig, Synchronizer};
//!
//! let client = CmsClient::new("http://localhost:1337")?;
//! let config = SyncConfig::new("http://localhost:1337", "Cms")
//!     .with_images(ImageConfig::new("./assets"));
//!
//! let mut sync = Synchronizer::new(client, MemoryStore::new(), config);
//! let report = sync.run().await?;
//! println!("synced {} entries", report.entries_committed);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (ContentSource, GraphStore)
//! - [`types`] - Configuration, naming, nodes, schema, and run reports
//! - [`schema`] - Descriptor classification and graph type registration
//! - [`pipeline`] - Entry resolution and the sync orchestrator
//! - [`media`] - Deduplicated, bounded-concurrency asset downloads
//! - [`sources`] - ContentSource implementations
//! - [`stores`] - GraphStore implementations (MemoryStore)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod media;
pub mod pipeline;
pub mod schema;
pub mod sources;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{Result, SourceError, SourceResult, SyncError};
pub use traits::{ContentSource, GraphStore};
pub use types::{
    config::{ImageConfig, SyncConfig},
    naming::TypeNamer,
    node::{FieldValue, GraphNode, Reference},
    report::{MediaStats, SyncPhase, SyncReport},
    schema::{FieldType, ObjectType, Resolver, ScalarType, UnionType},
};

// Re-export the pipeline entry points
pub use pipeline::{EntryResolver, Synchronizer};

// Re-export schema classification
pub use schema::{ClassifiedContentType, ComponentIndex};

// Re-export media synchronization
pub use media::{MediaAsset, MediaSync};

// Re-export stores
pub use stores::MemoryStore;

// Re-export the REST client and its wire types
pub use cms_client::{self, CmsClient};
