//! # Offline Lesson Cache
//!
//! Priority-aware, size-bounded, persistent cache for lesson records with
//! automatic reclamation.
//!
//! ## Overview
//!
//! The offline cache lets users keep lessons available without network access.
//! Key properties:
//! - Persistent storage through the `DurableStore` trait (any host key-value
//!   backend)
//! - Aggregate size/count metadata maintained incrementally for O(1)
//!   admission checks
//! - Eviction weighted jointly by priority and staleness; high-priority
//!   entries are never auto-evicted
//! - A never-failing public surface: the cache is an optimization layer, and
//!   the app must stay correct when it is empty
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     OfflineCacheManager<L>             │
//! │  - cache_lesson()                      │
//! │  - cached_lesson()                     │
//! │  - cleanup()                           │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> DurableStore (entries + metadata)
//!          ├──> Clock (timestamps, eviction ages)
//!          └──> EventBus (optional observations)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_cache::{CacheConfig, CachePriority, OfflineCacheManager};
//! use core_lessons::Lesson;
//!
//! # async fn example(cache: &OfflineCacheManager<Lesson>, lesson: Lesson) {
//! // Cache a lesson for offline access
//! if cache.cache_lesson(lesson, CachePriority::High).await {
//!     println!("Available offline");
//! }
//!
//! // Get cache statistics
//! let stats = cache.cache_stats().await;
//! println!("Cache usage: {} of {}", stats.total_size, stats.max_size);
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod estimator;
pub mod manager;
pub mod stats;

// Re-export commonly used types
pub use config::{CacheConfig, DEFAULT_MAX_CACHE_SIZE_BYTES, DEFAULT_MAX_LESSONS};
pub use entry::{CacheMetadata, CachePriority, CachedLesson, LessonRecord};
pub use error::{CacheError, Result};
pub use estimator::{estimate_lesson_size, LESSON_BASE_OVERHEAD_BYTES};
pub use manager::OfflineCacheManager;
pub use stats::{format_bytes, CacheStats};
