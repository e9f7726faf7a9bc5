//! Cache entry and metadata models
//!
//! The wire format (camelCase JSON, priorities as lowercase strings) is shared
//! with the mobile hosts that read the same durable store, so the serde
//! attributes here are load-bearing.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Payload contract for cacheable records.
///
/// The cache never looks inside a payload beyond this trait: it needs a stable
/// identifier to key the entry and a storage-cost estimate to drive admission
/// and eviction. Everything else is stored and returned verbatim.
pub trait LessonRecord:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Stable identifier, unique within the cache namespace.
    fn lesson_id(&self) -> &str;

    /// Approximate storage cost in bytes.
    ///
    /// This is a relative signal for eviction decisions, not a true
    /// serialized-byte count.
    fn estimated_size(&self) -> u64;
}

/// Caller-assigned importance tier governing eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePriority {
    High,
    Medium,
    Low,
}

impl CachePriority {
    /// Importance rank used for listing order: high > medium > low.
    pub fn rank(self) -> u8 {
        match self {
            CachePriority::High => 3,
            CachePriority::Medium => 2,
            CachePriority::Low => 1,
        }
    }

    /// Eviction weight: low-priority entries accumulate removal score three
    /// times as fast as high-priority ones. High is listed for completeness;
    /// high-priority entries are never auto-evicted.
    pub fn removal_weight(self) -> i64 {
        match self {
            CachePriority::Low => 3,
            CachePriority::Medium => 2,
            CachePriority::High => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CachePriority::High => "high",
            CachePriority::Medium => "medium",
            CachePriority::Low => "low",
        }
    }
}

impl Default for CachePriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// A lesson record augmented with cache bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedLesson<L> {
    /// The payload, stored whole and never interpreted.
    #[serde(flatten)]
    pub lesson: L,

    /// When the entry was written. Set fresh on every (re-)insertion.
    pub cached_at: DateTime<Utc>,

    /// When the entry was last read. Refreshed on every successful read.
    pub last_accessed: DateTime<Utc>,

    /// Estimated size recorded at insertion time.
    pub download_size: u64,

    pub priority: CachePriority,
}

impl<L> CachedLesson<L> {
    /// Composite removal-priority score: eviction weight times staleness.
    ///
    /// Two entries of different priority can out-rank each other purely on
    /// age; the metric is deliberately joint, not a two-key sort.
    pub fn removal_score(&self, now: DateTime<Utc>) -> i64 {
        let age_ms = (now - self.last_accessed).num_milliseconds().max(0);
        self.priority.removal_weight() * age_ms
    }
}

/// Aggregate cache state, stored under one fixed key.
///
/// Derivative state: it must equal the sum over live entries, but is updated
/// incrementally for O(1) admission checks instead of rescanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    /// Sum of `download_size` over all live entries.
    pub total_size: u64,

    /// Count of live entries.
    pub lesson_count: u64,

    /// Configured capacity ceiling in bytes.
    pub max_size: u64,

    /// When the most recent eviction pass completed, if one ever ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cleanup: Option<DateTime<Utc>>,
}

impl CacheMetadata {
    /// Fresh metadata for an empty cache.
    pub fn empty(max_size: u64) -> Self {
        Self {
            total_size: 0,
            lesson_count: 0,
            max_size,
            last_cleanup: None,
        }
    }

    /// Apply incremental deltas, clamping both counters at zero.
    ///
    /// Clamping tolerates drift from partial failures: a decrement that would
    /// underflow means the aggregate already lost an update, and pinning at
    /// zero keeps it recoverable.
    pub fn apply(&mut self, size_delta: i64, count_delta: i64) {
        self.total_size = apply_delta(self.total_size, size_delta);
        self.lesson_count = apply_delta(self.lesson_count, count_delta);
    }
}

fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta < 0 {
        value.saturating_sub(delta.unsigned_abs())
    } else {
        value.saturating_add(delta as u64)
    }
}
