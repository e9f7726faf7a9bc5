//! # Offline Cache Manager
//!
//! Main orchestrator for admitting, reading, and reclaiming cached lessons.
//!
//! This module provides a priority-aware, size-bounded cache with:
//! - O(1) admission checks against incrementally maintained aggregate metadata
//! - Automatic eviction weighted by priority and staleness
//! - Per-process serialization of mutations (the durable store offers no
//!   cross-key atomicity, so read-modify-write of the aggregate must not race)
//! - A public surface that never fails: storage trouble degrades to
//!   `false`/`None`/default results, because the app must stay correct with an
//!   empty cache

use std::marker::PhantomData;
use std::sync::Arc;

use bridge_traits::{storage::DurableStore, time::Clock};
use chrono::{DateTime, Utc};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::config::CacheConfig;
use crate::entry::{CacheMetadata, CachePriority, CachedLesson, LessonRecord};
use crate::error::{CacheError, Result};
use crate::stats::CacheStats;

/// Fraction of each bound that cleanup frees down to, so the next insert does
/// not immediately re-trigger a pass.
const CLEANUP_HEADROOM: f64 = 0.8;

/// Offline cache for lesson records.
///
/// Generic over the payload type; the manager only ever touches the payload
/// through [`LessonRecord`]. All collaborators are injected, so hosts decide
/// where entries persist and tests control the clock.
pub struct OfflineCacheManager<L: LessonRecord> {
    config: CacheConfig,
    store: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    event_bus: Option<Arc<EventBus>>,
    /// Serializes all metadata-mutating operations within this process.
    mutation: Mutex<()>,
    _payload: PhantomData<fn() -> L>,
}

impl<L: LessonRecord> OfflineCacheManager<L> {
    /// Create a new cache manager.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use core_cache::{CacheConfig, OfflineCacheManager};
    /// use core_lessons::Lesson;
    /// use std::sync::Arc;
    ///
    /// let cache: OfflineCacheManager<Lesson> =
    ///     OfflineCacheManager::new(CacheConfig::default(), store, clock)?;
    /// ```
    pub fn new(
        config: CacheConfig,
        store: Arc<dyn DurableStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate().map_err(CacheError::Configuration)?;

        Ok(Self {
            config,
            store,
            clock,
            event_bus: None,
            mutation: Mutex::new(()),
            _payload: PhantomData,
        })
    }

    /// Set event bus for cache observations.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Cache a lesson for offline access.
    ///
    /// Admission is all-or-nothing: when the estimated size does not fit even
    /// after a cleanup pass, nothing is written and `false` is returned.
    /// Capacity exhaustion is an expected outcome, not an error.
    ///
    /// Re-caching an existing id overwrites the entry; the previous entry's
    /// size contribution is subtracted before the new one is added, so the
    /// aggregate never double-counts a lesson.
    #[instrument(skip(self, lesson), fields(lesson_id = lesson.lesson_id()))]
    pub async fn cache_lesson(&self, lesson: L, priority: CachePriority) -> bool {
        let lesson_id = lesson.lesson_id().to_string();
        if lesson_id.is_empty() {
            warn!("refusing to cache lesson with empty id");
            return false;
        }

        let download_size = lesson.estimated_size();

        let _guard = self.mutation.lock().await;

        if !self.ensure_space_available(download_size).await {
            info!(download_size, "insufficient space for caching lesson");
            return false;
        }

        let previous = self.read_entry(&lesson_id).await;

        let now = self.clock.now();
        let entry = CachedLesson {
            lesson,
            cached_at: now,
            last_accessed: now,
            download_size,
            priority,
        };

        if let Err(e) = self.write_entry(&lesson_id, &entry).await {
            error!(error = %e, "failed to cache lesson");
            return false;
        }

        let (size_delta, count_delta) = match previous {
            Some(old) => (download_size as i64 - old.download_size as i64, 0),
            None => (download_size as i64, 1),
        };
        self.update_metadata(size_delta, count_delta, None).await;

        debug!(download_size, priority = priority.as_str(), "lesson cached");

        self.emit(CacheEvent::LessonCached {
            lesson_id,
            size_bytes: download_size,
            priority: priority.as_str().to_string(),
        });

        true
    }

    /// Get a cached lesson, refreshing its last-accessed timestamp.
    ///
    /// Returns `None` for missing entries and for entries whose stored form no
    /// longer parses; a corrupt entry is indistinguishable from a miss.
    #[instrument(skip(self))]
    pub async fn cached_lesson(&self, lesson_id: &str) -> Option<CachedLesson<L>> {
        let mut entry = self.read_entry(lesson_id).await?;

        entry.last_accessed = self.clock.now();
        if let Err(e) = self.write_entry(lesson_id, &entry).await {
            // The read itself succeeded; a failed access-time refresh only
            // costs eviction accuracy.
            warn!(error = %e, "failed to refresh last-accessed time");
        }

        debug!("retrieved cached lesson");
        Some(entry)
    }

    /// Check whether a lesson is cached.
    ///
    /// Pure existence check: does not refresh last-accessed and does not touch
    /// metadata.
    #[instrument(skip(self))]
    pub async fn is_lesson_cached(&self, lesson_id: &str) -> bool {
        match self.store.contains(&self.config.entry_key(lesson_id)).await {
            Ok(present) => present,
            Err(e) => {
                warn!(error = %e, "failed to check lesson cache");
                false
            }
        }
    }

    /// Remove a lesson from the cache.
    ///
    /// Returns `false` (with metadata untouched) when the entry is absent.
    #[instrument(skip(self))]
    pub async fn remove_cached_lesson(&self, lesson_id: &str) -> bool {
        let _guard = self.mutation.lock().await;
        self.remove_entry_locked(lesson_id).await
    }

    /// All cached lessons in canonical importance order: priority descending,
    /// then most recently accessed first.
    ///
    /// Materializes the full set; the bounded cache keeps this small.
    #[instrument(skip(self))]
    pub async fn all_cached_lessons(&self) -> Vec<CachedLesson<L>> {
        let keys = match self.store.list_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                error!(error = %e, "failed to list cached lessons");
                return Vec::new();
            }
        };

        let prefix = format!("{}:", self.config.entry_key_prefix);
        let mut lessons: Vec<CachedLesson<L>> = Vec::new();

        for key in keys.iter().filter(|k| k.starts_with(&prefix)) {
            match self.store.get(key).await {
                Ok(Some(json)) => match serde_json::from_str(&json) {
                    Ok(entry) => lessons.push(entry),
                    Err(e) => warn!(key = %key, error = %e, "skipping corrupt cache entry"),
                },
                Ok(None) => {}
                Err(e) => warn!(key = %key, error = %e, "failed to load cache entry"),
            }
        }

        lessons.sort_by(|a, b| {
            b.priority
                .rank()
                .cmp(&a.priority.rank())
                .then(b.last_accessed.cmp(&a.last_accessed))
        });

        lessons
    }

    /// Run an eviction pass.
    ///
    /// Safe to call at any time: within-bounds caches return immediately, and
    /// interrupting a pass loses nothing because every removal commits
    /// independently.
    #[instrument(skip(self))]
    pub async fn cleanup(&self) {
        let _guard = self.mutation.lock().await;
        self.cleanup_locked().await;
    }

    /// Get cache statistics. Never fails; on storage trouble the snapshot
    /// reflects an empty cache.
    #[instrument(skip(self))]
    pub async fn cache_stats(&self) -> CacheStats {
        let metadata = self.metadata().await;
        CacheStats::from_metadata(&metadata)
    }

    /// Remove every cached lesson plus the metadata record.
    ///
    /// Unconditional: this is the only path that deletes high-priority
    /// entries.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) {
        let _guard = self.mutation.lock().await;

        let keys = match self.store.list_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                error!(error = %e, "failed to clear cache");
                return;
            }
        };

        let prefix = format!("{}:", self.config.entry_key_prefix);
        let mut removed = 0usize;

        for key in keys.iter().filter(|k| k.starts_with(&prefix)) {
            match self.store.remove(key).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %key, error = %e, "failed to remove cache entry"),
            }
        }

        if let Err(e) = self.store.remove(&self.config.metadata_key).await {
            warn!(error = %e, "failed to remove cache metadata");
        }

        info!(removed, "all cached lessons cleared");

        self.emit(CacheEvent::CacheCleared {
            lessons_removed: removed,
        });
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Check whether `required` bytes fit, triggering a cleanup pass when they
    /// don't. Caller must hold the mutation lock.
    async fn ensure_space_available(&self, required: u64) -> bool {
        let metadata = self.metadata().await;
        if metadata.total_size + required <= self.config.max_size_bytes {
            return true;
        }

        self.cleanup_locked().await;

        let metadata = self.metadata().await;
        metadata.total_size + required <= self.config.max_size_bytes
    }

    /// Eviction pass body. Caller must hold the mutation lock.
    async fn cleanup_locked(&self) {
        debug!("starting cache cleanup");

        // Bounds are re-verified here even when the caller already checked:
        // state may have moved between the check and the pass.
        let metadata = self.metadata().await;
        if metadata.total_size <= self.config.max_size_bytes
            && metadata.lesson_count <= self.config.max_lessons
        {
            debug!("cache within limits, no cleanup needed");
            return;
        }

        let lessons = self.all_cached_lessons().await;
        let total_before = lessons.len();
        let now = self.clock.now();

        // High-priority entries are never auto-evicted
        let mut candidates: Vec<CachedLesson<L>> = lessons
            .into_iter()
            .filter(|lesson| lesson.priority != CachePriority::High)
            .collect();

        // Highest removal score (stale and low-priority) goes first
        candidates.sort_by_key(|entry| std::cmp::Reverse(entry.removal_score(now)));

        let size_target = (self.config.max_size_bytes as f64 * CLEANUP_HEADROOM) as u64;
        let count_target = (self.config.max_lessons as f64 * CLEANUP_HEADROOM) as u64;

        let mut removed = 0usize;
        for entry in &candidates {
            let current = self.metadata().await;
            if current.total_size <= size_target && current.lesson_count <= count_target {
                break;
            }

            if self.remove_entry_locked(entry.lesson.lesson_id()).await {
                removed += 1;
            }
        }

        // Stamped even when nothing could be evicted, as a liveness signal
        let completed_at = self.clock.now();
        self.update_metadata(0, 0, Some(completed_at)).await;

        let remaining = total_before - removed;
        info!(removed, remaining, "cache cleanup complete");

        self.emit(CacheEvent::CleanupCompleted {
            lessons_removed: removed,
            lessons_remaining: remaining,
        });
    }

    /// Delete one entry and decrement the aggregate by its recorded
    /// contribution. Caller must hold the mutation lock.
    async fn remove_entry_locked(&self, lesson_id: &str) -> bool {
        let Some(entry) = self.read_entry(lesson_id).await else {
            return false;
        };

        if let Err(e) = self.store.remove(&self.config.entry_key(lesson_id)).await {
            error!(error = %e, "failed to remove cached lesson");
            return false;
        }

        self.update_metadata(-(entry.download_size as i64), -1, None)
            .await;

        debug!(lesson_id, "removed cached lesson");
        true
    }

    async fn read_entry(&self, lesson_id: &str) -> Option<CachedLesson<L>> {
        match self.try_read_entry(lesson_id).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(lesson_id, error = %e, "unreadable cache entry, treating as miss");
                None
            }
        }
    }

    async fn try_read_entry(&self, lesson_id: &str) -> Result<Option<CachedLesson<L>>> {
        let key = self.config.entry_key(lesson_id);
        let Some(json) = self.store.get(&key).await? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn write_entry(&self, lesson_id: &str, entry: &CachedLesson<L>) -> Result<()> {
        let key = self.config.entry_key(lesson_id);
        let json = serde_json::to_string(entry)?;
        self.store.set(&key, &json).await?;
        Ok(())
    }

    /// Load the aggregate metadata, creating and persisting a fresh record on
    /// first use. A read failure yields an in-memory empty record without
    /// persisting, so a transient outage cannot wipe a healthy aggregate.
    async fn metadata(&self) -> CacheMetadata {
        match self.store.get(&self.config.metadata_key).await {
            Ok(Some(json)) => match serde_json::from_str::<CacheMetadata>(&json) {
                Ok(metadata) => return metadata,
                Err(e) => {
                    warn!(error = %e, "corrupt cache metadata, resetting");
                }
            },
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "failed to read cache metadata");
                return CacheMetadata::empty(self.config.max_size_bytes);
            }
        }

        let metadata = CacheMetadata::empty(self.config.max_size_bytes);
        if let Err(e) = self.persist_metadata(&metadata).await {
            warn!(error = %e, "failed to persist initial cache metadata");
        }
        metadata
    }

    async fn update_metadata(
        &self,
        size_delta: i64,
        count_delta: i64,
        cleanup_time: Option<DateTime<Utc>>,
    ) {
        let mut metadata = self.metadata().await;
        metadata.apply(size_delta, count_delta);
        metadata.max_size = self.config.max_size_bytes;
        if let Some(completed_at) = cleanup_time {
            metadata.last_cleanup = Some(completed_at);
        }

        if let Err(e) = self.persist_metadata(&metadata).await {
            error!(error = %e, "failed to update cache metadata");
        }
    }

    async fn persist_metadata(&self, metadata: &CacheMetadata) -> Result<()> {
        let json = serde_json::to_string(metadata)?;
        self.store.set(&self.config.metadata_key, &json).await?;
        Ok(())
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(bus) = &self.event_bus {
            // Fire-and-forget observation; a missing subscriber is fine
            bus.emit(CoreEvent::Cache(event)).ok();
        }
    }
}
