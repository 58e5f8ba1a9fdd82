//! Sync run reporting.

use chrono::{DateTime, Utc};

/// Phase of a sync run.
///
/// `Failed` is reachable only out of `FetchingSchema`; every later failure
/// is isolated to a content type, field, or asset and the run still ends in
/// `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    FetchingSchema,
    FetchingEntries,
    ResolvingEntries,
    RegisteringSchema,
    Done,
    Failed,
}

impl SyncPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPhase::FetchingSchema => "fetching-schema",
            SyncPhase::FetchingEntries => "fetching-entries",
            SyncPhase::ResolvingEntries => "resolving-entries",
            SyncPhase::RegisteringSchema => "registering-schema",
            SyncPhase::Done => "done",
            SyncPhase::Failed => "failed",
        }
    }
}

/// Counters from the media synchronizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaStats {
    /// Files fetched over the network
    pub downloaded: usize,

    /// Files already present on disk (cache hits)
    pub cached: usize,

    /// Asset names whose download failed; their nodes stay committed
    pub failed: Vec<String>,
}

impl MediaStats {
    /// Fold another batch of counters into this one.
    pub fn merge(&mut self, other: MediaStats) {
        self.downloaded += other.downloaded;
        self.cached += other.cached;
        self.failed.extend(other.failed);
    }
}

/// Result of a completed sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Content types whose entries were fetched and resolved
    pub types_synced: usize,

    /// Top-level entries committed across all collections
    pub entries_committed: usize,

    /// Media download counters
    pub media: MediaStats,

    /// Api ids whose entry fetch failed (their schema is still registered)
    pub failed_types: Vec<String>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Whether the run completed without recoverable failures.
    pub fn is_clean(&self) -> bool {
        self.failed_types.is_empty() && self.media.failed.is_empty()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_stats_merge_accumulates() {
        let mut stats = MediaStats {
            downloaded: 1,
            cached: 2,
            failed: vec!["a.png".to_string()],
        };
        stats.merge(MediaStats {
            downloaded: 3,
            cached: 0,
            failed: vec!["b.png".to_string()],
        });

        assert_eq!(stats.downloaded, 4);
        assert_eq!(stats.cached, 2);
        assert_eq!(stats.failed, vec!["a.png".to_string(), "b.png".to_string()]);
    }
}
