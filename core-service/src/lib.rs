//! Core service façade.
//!
//! This crate wires host-provided bridge implementations (durable storage,
//! network monitoring, clock) and the remote lesson source into the offline
//! cache, and exposes the lesson-level API the UI layer consumes. Desktop
//! apps typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`); mobile hosts inject platform-native adapters instead.
//!
//! The facade adds what the cache itself deliberately lacks:
//! - network awareness (skip downloads while offline, prefer remote content
//!   when online)
//! - opportunistic pre-caching of recently used lessons
//! - per-operation observations on the event bus

use std::sync::Arc;

use bridge_traits::network::NetworkMonitor;
use core_cache::{CachePriority, CacheStats, CachedLesson, OfflineCacheManager};
use core_lessons::{Lesson, LessonSource};
use core_runtime::events::{CoreEvent, EventBus, LessonEvent, NetworkEvent};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{DesktopNetworkMonitor, SqliteDurableStore};

/// How many recent lessons an auto-download run will cache at most.
pub const AUTO_DOWNLOAD_LIMIT: usize = 10;

/// Lesson-level facade over the offline cache.
///
/// Mirrors the cache's operations one-to-one, with the network and remote
/// source folded in. Like the cache, the facade never fails outward: every
/// operation degrades to `false`/`None`/empty.
pub struct OfflineLessonService {
    cache: Arc<OfflineCacheManager<Lesson>>,
    source: Arc<dyn LessonSource>,
    network: Arc<dyn NetworkMonitor>,
    event_bus: Option<Arc<EventBus>>,
    /// Last observed connectivity, for emitting change events.
    last_online: Mutex<Option<bool>>,
}

impl OfflineLessonService {
    pub fn new(
        cache: Arc<OfflineCacheManager<Lesson>>,
        source: Arc<dyn LessonSource>,
        network: Arc<dyn NetworkMonitor>,
    ) -> Self {
        Self {
            cache,
            source,
            network,
            event_bus: None,
            last_online: Mutex::new(None),
        }
    }

    /// Set event bus for lesson and network observations.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Current connectivity, emitting a status-changed observation when it
    /// differs from the last poll.
    pub async fn is_online(&self) -> bool {
        let info = self.network.get_network_info().await.ok();
        let online = info
            .as_ref()
            .map(|i| i.status == bridge_traits::network::NetworkStatus::Connected)
            .unwrap_or(false);

        let mut last = self.last_online.lock().await;
        if last.is_some() && *last != Some(online) {
            debug!(online, "network status changed");
            self.emit_network(NetworkEvent::StatusChanged {
                online,
                connection_type: info
                    .and_then(|i| i.network_type)
                    .map(|t| t.as_str().to_string()),
            });
        }
        *last = Some(online);

        online
    }

    /// Fetch a lesson, preferring fresh remote content when online and falling
    /// back to the offline cache otherwise.
    #[instrument(skip(self))]
    pub async fn lesson(&self, lesson_id: &str) -> Option<Lesson> {
        if self.is_online().await {
            match self.source.fetch_lesson(lesson_id).await {
                Ok(Some(lesson)) => return Some(lesson),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "remote fetch failed, trying cache"),
            }
        }

        self.cached_lesson(lesson_id).await.map(|entry| entry.lesson)
    }

    /// Cache a lesson for offline access.
    pub async fn cache_lesson(&self, lesson: Lesson, priority: CachePriority) -> bool {
        self.cache.cache_lesson(lesson, priority).await
    }

    /// Get a cached lesson, refreshing its last-accessed timestamp.
    pub async fn cached_lesson(&self, lesson_id: &str) -> Option<CachedLesson<Lesson>> {
        let entry = self.cache.cached_lesson(lesson_id).await?;

        let offline = !self.is_online().await;
        self.emit_lesson(LessonEvent::CachedLessonAccessed {
            lesson_id: lesson_id.to_string(),
            offline,
        });

        Some(entry)
    }

    /// Check whether a lesson is cached, without touching access times.
    pub async fn is_lesson_cached(&self, lesson_id: &str) -> bool {
        self.cache.is_lesson_cached(lesson_id).await
    }

    /// Remove a lesson from the cache.
    pub async fn remove_cached_lesson(&self, lesson_id: &str) -> bool {
        let removed = self.cache.remove_cached_lesson(lesson_id).await;
        if removed {
            self.emit_lesson(LessonEvent::CachedLessonRemoved {
                lesson_id: lesson_id.to_string(),
            });
        }
        removed
    }

    /// All cached lessons, most important first.
    pub async fn cached_lessons(&self) -> Vec<CachedLesson<Lesson>> {
        self.cache.all_cached_lessons().await
    }

    /// Cache usage snapshot.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.cache_stats().await
    }

    /// Remove all cached lessons, including high-priority ones.
    pub async fn clear_cache(&self) {
        self.cache.clear_all().await;
    }

    /// Opportunistically cache the user's recent lessons at medium priority.
    ///
    /// Skipped entirely while offline. Lessons already cached are left alone
    /// (their priority and timestamps are not disturbed). Returns how many
    /// lessons were newly cached.
    #[instrument(skip(self))]
    pub async fn auto_download_recent(&self) -> usize {
        if !self.is_online().await {
            debug!("skipping auto-download: offline");
            return 0;
        }

        let recent = match self.source.recent_lessons(AUTO_DOWNLOAD_LIMIT).await {
            Ok(lessons) => lessons,
            Err(e) => {
                warn!(error = %e, "failed to fetch recent lessons");
                return 0;
            }
        };

        let mut downloaded = 0usize;
        for lesson in recent.into_iter().take(AUTO_DOWNLOAD_LIMIT) {
            if self.cache.is_lesson_cached(&lesson.id).await {
                continue;
            }

            if self.cache.cache_lesson(lesson, CachePriority::Medium).await {
                downloaded += 1;
            }
        }

        info!(downloaded, "auto-download complete");

        self.emit_lesson(LessonEvent::AutoDownloadCompleted {
            lessons_downloaded: downloaded,
        });

        downloaded
    }

    fn emit_lesson(&self, event: LessonEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Lesson(event)).ok();
        }
    }

    fn emit_network(&self, event: NetworkEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Network(event)).ok();
        }
    }
}
