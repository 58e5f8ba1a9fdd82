//! Synchronization orchestrator.
//!
//! Drives one full run: fetch schema descriptors, classify them, fetch and
//! resolve entries under bounded concurrency, register the static graph
//! types, and drain media downloads. Only an unreadable schema fails the
//! run; every later failure is isolated to one content type, field, or
//! asset and recorded on the report.

use chrono::Utc;
use futures::{stream, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};

use cms_client::types::Entry;

use crate::error::{Result, SourceResult, SyncError};
use crate::media::MediaSync;
use crate::pipeline::entry::EntryResolver;
use crate::schema::classify::ClassifiedContentType;
use crate::schema::{registrar, ComponentIndex};
use crate::traits::{ContentSource, GraphStore};
use crate::types::config::SyncConfig;
use crate::types::naming::TypeNamer;
use crate::types::report::{SyncPhase, SyncReport};

/// One content synchronization run against a source and a destination store.
pub struct Synchronizer<S, G> {
    source: Arc<S>,
    store: G,
    config: SyncConfig,
    phase: SyncPhase,
}

impl<S: ContentSource + 'static, G: GraphStore> Synchronizer<S, G> {
    pub fn new(source: S, store: G, config: SyncConfig) -> Self {
        Self {
            source: Arc::new(source),
            store,
            config,
            phase: SyncPhase::FetchingSchema,
        }
    }

    /// The phase the last run ended in.
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// The destination store.
    pub fn store(&self) -> &G {
        &self.store
    }

    /// Run a full synchronization.
    pub async fn run(&mut self) -> Result<SyncReport> {
        self.config.validate()?;
        let started_at = Utc::now();
        let mut report = SyncReport {
            types_synced: 0,
            entries_committed: 0,
            media: Default::default(),
            failed_types: Vec::new(),
            started_at,
            finished_at: started_at,
        };

        self.phase = SyncPhase::FetchingSchema;
        info!(
            phase = self.phase.as_str(),
            url = %self.config.api_url,
            "Fetching schema descriptors"
        );

        let descriptors = match self.source.content_types().await {
            Ok(descriptors) => descriptors,
            Err(e) => {
                self.phase = SyncPhase::Failed;
                error!(
                    error = %e,
                    "Cannot read content-type descriptors; the API user needs content manager read permissions"
                );
                return Err(SyncError::SchemaAccess(e));
            }
        };

        let component_descriptors = if self.config.components {
            match self.source.components().await {
                Ok(components) => components,
                Err(e) => {
                    error!(error = %e, "Cannot read component descriptors; dynamic zone content will be dropped");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let namer = TypeNamer::new(&self.config.prefix);
        let content_types: Vec<ClassifiedContentType> = descriptors
            .iter()
            .filter(|d| d.is_displayed && d.uid.contains("application"))
            .map(|d| ClassifiedContentType::from_descriptor(&namer, d))
            .collect();
        let components = ComponentIndex::build(&namer, &component_descriptors);

        if content_types.is_empty() {
            warn!("No displayed application content types in the source; nothing to sync");
            self.phase = SyncPhase::Done;
            report.finished_at = Utc::now();
            return Ok(report);
        }

        let media = match &self.config.images {
            Some(images) => {
                let media = MediaSync::new(
                    Arc::clone(&self.source),
                    namer.media_type_name(),
                    images.clone(),
                )?;
                self.store.ensure_collection(media.type_name()).await?;
                Some(media)
            }
            None => None,
        };

        self.phase = SyncPhase::FetchingEntries;
        info!(
            phase = self.phase.as_str(),
            content_types = content_types.len(),
            components = components.len(),
            "Fetching entries"
        );

        let limit = self.config.limit;
        let debug = self.config.debug;
        let fetches = content_types.iter().map(|content_type| {
            let source = Arc::clone(&self.source);
            async move {
                if debug {
                    info!(
                        content_type = %content_type.api_id,
                        endpoint = %content_type.endpoint,
                        "Fetching entries for content type"
                    );
                }
                let fetched: SourceResult<Vec<Entry>> = if content_type.is_singleton() {
                    source
                        .singleton_entry(&content_type.endpoint)
                        .await
                        .map(|entry| vec![entry])
                } else {
                    source.collection_entries(&content_type.endpoint, limit).await
                };
                (content_type, fetched)
            }
        });
        let fetched: Vec<(&ClassifiedContentType, SourceResult<Vec<Entry>>)> =
            stream::iter(fetches)
                .buffer_unordered(self.config.concurrency)
                .collect()
                .await;

        let mut batches = Vec::with_capacity(fetched.len());
        for (content_type, result) in fetched {
            match result {
                Ok(entries) => batches.push((content_type, entries)),
                Err(e) => {
                    error!(
                        content_type = %content_type.api_id,
                        error = %e,
                        "Failed to fetch entries; type stays registered without content"
                    );
                    report.failed_types.push(content_type.api_id.clone());
                }
            }
        }

        self.phase = SyncPhase::ResolvingEntries;
        info!(phase = self.phase.as_str(), "Resolving entries into nodes");

        let resolver = EntryResolver::new(&namer, &components, media.as_ref(), &self.store);
        let resolutions = batches.into_iter().map(|(content_type, entries)| {
            let resolver = &resolver;
            async move {
                if debug {
                    info!(
                        type_name = %content_type.type_name,
                        entries = entries.len(),
                        "Adding nodes to collection"
                    );
                }
                (content_type, resolver.resolve_type(content_type, entries).await)
            }
        });
        let resolved: Vec<(&ClassifiedContentType, Result<usize>)> = stream::iter(resolutions)
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        for (content_type, result) in resolved {
            match result {
                Ok(committed) => {
                    report.types_synced += 1;
                    report.entries_committed += committed;
                }
                Err(e) => {
                    error!(
                        content_type = %content_type.api_id,
                        error = %e,
                        "Failed to commit entries for content type"
                    );
                    report.failed_types.push(content_type.api_id.clone());
                }
            }
        }

        self.phase = SyncPhase::RegisteringSchema;
        info!(phase = self.phase.as_str(), "Registering graph types");

        registrar::register_types(
            &self.store,
            &namer,
            &content_types,
            &components,
            self.config.images.is_some(),
        )
        .await?;
        registrar::register_singleton_queries(&self.store, &namer, &content_types).await?;

        if let Some(media) = &media {
            let stats = media.finish().await;
            info!(
                downloaded = stats.downloaded,
                cached = stats.cached,
                failed = stats.failed.len(),
                "Media downloads drained"
            );
            report.media.merge(stats);
        }

        self.phase = SyncPhase::Done;
        report.finished_at = Utc::now();
        info!(
            types = report.types_synced,
            entries = report.entries_committed,
            failed_types = report.failed_types.len(),
            duration_ms = report.duration().num_milliseconds(),
            "Content sync complete"
        );

        Ok(report)
    }
}
