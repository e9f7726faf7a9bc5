//! Integration tests for the offline cache manager
//!
//! Exercise the full read/write/evict lifecycle against an in-memory store and
//! a manually advanced clock, plus storage-failure behavior with mocks.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use mockall::mock;

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::storage::{DurableStore, MemoryDurableStore};
use bridge_traits::time::{Clock, ManualClock};
use core_cache::{CacheConfig, CachePriority, OfflineCacheManager};
use core_lessons::{Answer, Difficulty, Lesson, Question, QuestionKind};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};

struct TestCache {
    cache: OfflineCacheManager<Lesson>,
    clock: Arc<ManualClock>,
    store: Arc<MemoryDurableStore>,
}

fn build_cache(config: CacheConfig) -> TestCache {
    let store = Arc::new(MemoryDurableStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    let cache = OfflineCacheManager::new(
        config,
        store.clone() as Arc<dyn DurableStore>,
        clock.clone() as Arc<dyn Clock>,
    )
    .unwrap();

    TestCache {
        cache,
        clock,
        store,
    }
}

fn lesson(id: &str) -> Lesson {
    Lesson::new(id, format!("Lesson {}", id))
}

/// A lesson whose estimated size is `1024 + 2 * description_chars`.
fn sized_lesson(id: &str, description_chars: usize) -> Lesson {
    let mut lesson = lesson(id);
    lesson.description = "x".repeat(description_chars);
    lesson
}

fn question(id: &str) -> Question {
    Question {
        id: id.to_string(),
        kind: QuestionKind::MultipleChoice,
        question: "Which tradition is this lesson from?".to_string(),
        options: vec!["a".to_string(), "b".to_string()],
        correct_answer: Answer::One("a".to_string()),
        explanation: None,
        difficulty: Difficulty::Medium,
    }
}

// ============================================================================
// Admission and read paths
// ============================================================================

#[tokio::test]
async fn caches_a_lesson_and_reports_it_in_stats() {
    let t = build_cache(CacheConfig::default());

    let cached = t
        .cache
        .cache_lesson(lesson("l1"), CachePriority::High)
        .await;
    assert!(cached);

    let stats = t.cache.cache_stats().await;
    assert_eq!(stats.total_lessons, 1);
    assert_eq!(stats.total_size_bytes, 1024);
    assert_eq!(stats.max_size, "50 MB");

    let entry = t.cache.cached_lesson("l1").await.unwrap();
    assert_eq!(entry.download_size, 1024);
    assert_eq!(entry.priority, CachePriority::High);
    assert_eq!(entry.lesson.id, "l1");
}

#[tokio::test]
async fn recorded_size_covers_description_and_questions() {
    let t = build_cache(CacheConfig::default());

    let mut rich = sized_lesson("l1", 100);
    rich.content.questions.push(question("q1"));
    rich.content.questions.push(question("q2"));

    assert!(t.cache.cache_lesson(rich, CachePriority::Medium).await);

    let entry = t.cache.cached_lesson("l1").await.unwrap();
    assert_eq!(entry.download_size, 2224); // 1024 + 200 + 1000

    let stats = t.cache.cache_stats().await;
    assert_eq!(stats.total_size_bytes, 2224);
    assert_eq!(stats.total_size, "2.17 KB");
}

#[tokio::test]
async fn refuses_lessons_with_empty_ids() {
    let t = build_cache(CacheConfig::default());

    assert!(!t.cache.cache_lesson(lesson(""), CachePriority::High).await);
    assert_eq!(t.cache.cache_stats().await.total_lessons, 0);
}

#[tokio::test]
async fn missing_lesson_reads_as_absent() {
    let t = build_cache(CacheConfig::default());

    assert!(t.cache.cached_lesson("missing").await.is_none());
    assert!(!t.cache.is_lesson_cached("missing").await);
}

#[tokio::test]
async fn reads_refresh_last_accessed_but_not_metadata() {
    let t = build_cache(CacheConfig::default());
    assert!(t.cache.cache_lesson(lesson("l1"), CachePriority::Low).await);

    let stats_before = t.cache.cache_stats().await;

    t.clock.advance(Duration::minutes(5));
    let first = t.cache.cached_lesson("l1").await.unwrap();

    t.clock.advance(Duration::minutes(5));
    let second = t.cache.cached_lesson("l1").await.unwrap();

    assert!(second.last_accessed > first.last_accessed);
    assert!(first.last_accessed > first.cached_at);

    let stats_after = t.cache.cache_stats().await;
    assert_eq!(stats_before.total_size_bytes, stats_after.total_size_bytes);
    assert_eq!(stats_before.total_lessons, stats_after.total_lessons);
}

#[tokio::test]
async fn existence_check_does_not_refresh_last_accessed() {
    let t = build_cache(CacheConfig::default());
    assert!(t.cache.cache_lesson(lesson("l1"), CachePriority::Low).await);

    t.clock.advance(Duration::hours(1));
    assert!(t.cache.is_lesson_cached("l1").await);

    let entry = t.cache.cached_lesson("l1").await.unwrap();
    // Only the explicit read above moved the timestamp
    assert_eq!(entry.last_accessed - entry.cached_at, Duration::hours(1));
}

// ============================================================================
// Remove, re-cache, clear
// ============================================================================

#[tokio::test]
async fn removing_a_missing_lesson_leaves_metadata_untouched() {
    let t = build_cache(CacheConfig::default());
    assert!(t.cache.cache_lesson(lesson("l1"), CachePriority::Low).await);

    let stats_before = t.cache.cache_stats().await;
    assert!(!t.cache.remove_cached_lesson("nonexistent").await);

    let stats_after = t.cache.cache_stats().await;
    assert_eq!(stats_before, stats_after);
}

#[tokio::test]
async fn remove_restores_pre_insert_metadata() {
    let t = build_cache(CacheConfig::default());
    assert!(t.cache.cache_lesson(lesson("keep"), CachePriority::High).await);

    let before = t.cache.cache_stats().await;

    assert!(
        t.cache
            .cache_lesson(sized_lesson("temp", 500), CachePriority::Low)
            .await
    );
    assert!(t.cache.remove_cached_lesson("temp").await);

    let after = t.cache.cache_stats().await;
    assert_eq!(before.total_size_bytes, after.total_size_bytes);
    assert_eq!(before.total_lessons, after.total_lessons);
}

#[tokio::test]
async fn recaching_replaces_the_size_contribution() {
    let t = build_cache(CacheConfig::default());

    assert!(t.cache.cache_lesson(lesson("l1"), CachePriority::Low).await);
    assert_eq!(t.cache.cache_stats().await.total_size_bytes, 1024);

    // Same id, bigger payload, higher priority
    assert!(
        t.cache
            .cache_lesson(sized_lesson("l1", 100), CachePriority::High)
            .await
    );

    let stats = t.cache.cache_stats().await;
    assert_eq!(stats.total_lessons, 1);
    assert_eq!(stats.total_size_bytes, 1224);

    let entry = t.cache.cached_lesson("l1").await.unwrap();
    assert_eq!(entry.download_size, 1224);
    assert_eq!(entry.priority, CachePriority::High);
}

#[tokio::test]
async fn clear_removes_everything_including_high_priority() {
    let t = build_cache(CacheConfig::default());

    assert!(t.cache.cache_lesson(lesson("h"), CachePriority::High).await);
    assert!(t.cache.cache_lesson(lesson("m"), CachePriority::Medium).await);
    assert!(t.cache.cache_lesson(lesson("l"), CachePriority::Low).await);

    t.cache.clear_all().await;

    assert!(t.cache.all_cached_lessons().await.is_empty());
    assert_eq!(t.cache.cache_stats().await.total_lessons, 0);
    assert_eq!(t.cache.cache_stats().await.total_size_bytes, 0);
    assert!(!t.cache.is_lesson_cached("h").await);
}

// ============================================================================
// Listing order
// ============================================================================

#[tokio::test]
async fn listing_orders_by_priority_then_recency() {
    let t = build_cache(CacheConfig::default());

    assert!(t.cache.cache_lesson(lesson("low"), CachePriority::Low).await);
    t.clock.advance(Duration::minutes(1));
    assert!(t.cache.cache_lesson(lesson("high-old"), CachePriority::High).await);
    t.clock.advance(Duration::minutes(1));
    assert!(t.cache.cache_lesson(lesson("medium"), CachePriority::Medium).await);
    t.clock.advance(Duration::minutes(1));
    assert!(t.cache.cache_lesson(lesson("high-new"), CachePriority::High).await);

    let ids: Vec<String> = t
        .cache
        .all_cached_lessons()
        .await
        .into_iter()
        .map(|entry| entry.lesson.id)
        .collect();

    assert_eq!(ids, vec!["high-new", "high-old", "medium", "low"]);

    // Reading an entry promotes it within its priority tier
    t.clock.advance(Duration::minutes(1));
    t.cache.cached_lesson("high-old").await.unwrap();

    let ids: Vec<String> = t
        .cache
        .all_cached_lessons()
        .await
        .into_iter()
        .map(|entry| entry.lesson.id)
        .collect();
    assert_eq!(ids, vec!["high-old", "high-new", "medium", "low"]);
}

#[tokio::test]
async fn stats_count_matches_listing_length() {
    let t = build_cache(CacheConfig::default());

    for i in 0..5 {
        assert!(
            t.cache
                .cache_lesson(lesson(&format!("l{}", i)), CachePriority::Medium)
                .await
        );
    }
    assert!(t.cache.remove_cached_lesson("l2").await);

    let stats = t.cache.cache_stats().await;
    assert_eq!(
        stats.total_lessons,
        t.cache.all_cached_lessons().await.len()
    );
}

// ============================================================================
// Eviction
// ============================================================================

#[tokio::test]
async fn admission_triggers_cleanup_and_evicts_stalest_low_value_entries() {
    let config = CacheConfig::default()
        .with_max_size_bytes(10_000)
        .with_max_lessons(3);
    let t = build_cache(config);

    // Four low-priority lessons of 1024 bytes each; count exceeds the bound
    // but admission only gates on size
    for id in ["l1", "l2", "l3", "l4"] {
        assert!(t.cache.cache_lesson(lesson(id), CachePriority::Low).await);
        t.clock.advance(Duration::minutes(1));
    }
    assert_eq!(t.cache.cache_stats().await.total_lessons, 4);

    // 1024 + 2 * 3000 = 7024 bytes; 4096 + 7024 exceeds the cap
    let big = sized_lesson("l5", 3000);
    assert!(t.cache.cache_lesson(big, CachePriority::Medium).await);

    // The two stalest entries were reclaimed, the rest survived
    assert!(!t.cache.is_lesson_cached("l1").await);
    assert!(!t.cache.is_lesson_cached("l2").await);
    assert!(t.cache.is_lesson_cached("l3").await);
    assert!(t.cache.is_lesson_cached("l4").await);
    assert!(t.cache.is_lesson_cached("l5").await);

    let stats = t.cache.cache_stats().await;
    assert_eq!(stats.total_lessons, 3);
    assert_eq!(stats.total_size_bytes, 2 * 1024 + 7024);
    assert!(stats.total_size_bytes <= 10_000);
    assert!(stats.last_cleanup.is_some());
}

#[tokio::test]
async fn eviction_is_a_joint_priority_age_metric() {
    let config = CacheConfig::default()
        .with_max_size_bytes(10_000)
        .with_max_lessons(3);
    let t = build_cache(config);

    // A very stale medium entry: score 2 * 100min
    assert!(t.cache.cache_lesson(lesson("stale-medium"), CachePriority::Medium).await);
    t.clock.advance(Duration::minutes(100));

    // Fresh low entries: score 3 * {2,1}min at eviction time
    assert!(t.cache.cache_lesson(lesson("fresh-low-1"), CachePriority::Low).await);
    t.clock.advance(Duration::minutes(1));
    assert!(t.cache.cache_lesson(lesson("fresh-low-2"), CachePriority::Low).await);
    t.clock.advance(Duration::minutes(1));
    assert!(t.cache.cache_lesson(lesson("fresh-low-3"), CachePriority::Low).await);
    t.clock.advance(Duration::minutes(1));

    // Trigger a pass: count (4) is over the bound, and this payload is over
    // the size cap too
    let big = sized_lesson("big", 3000);
    assert!(t.cache.cache_lesson(big, CachePriority::Medium).await);

    // The stale medium entry out-scored the fresher low ones
    assert!(!t.cache.is_lesson_cached("stale-medium").await);
    assert!(!t.cache.is_lesson_cached("fresh-low-1").await);
    assert!(t.cache.is_lesson_cached("fresh-low-2").await);
    assert!(t.cache.is_lesson_cached("fresh-low-3").await);
}

#[tokio::test]
async fn high_priority_entries_survive_cleanup_even_over_budget() {
    let config = CacheConfig::default()
        .with_max_size_bytes(10_000)
        .with_max_lessons(2);
    let t = build_cache(config);

    for id in ["h1", "h2", "h3"] {
        assert!(t.cache.cache_lesson(lesson(id), CachePriority::High).await);
        t.clock.advance(Duration::minutes(1));
    }

    // 1024 + 2 * 4000 = 9024 bytes cannot fit next to 3072 already cached
    let big = sized_lesson("big-low", 4000);
    assert!(!t.cache.cache_lesson(big, CachePriority::Low).await);

    // Nothing was evicted and nothing was partially written
    assert!(t.cache.is_lesson_cached("h1").await);
    assert!(t.cache.is_lesson_cached("h2").await);
    assert!(t.cache.is_lesson_cached("h3").await);
    assert!(!t.cache.is_lesson_cached("big-low").await);

    // The cache is allowed to exceed its count bound when everything left is
    // high priority, and the failed pass still stamps its liveness signal
    let stats = t.cache.cache_stats().await;
    assert_eq!(stats.total_lessons, 3);
    assert!(stats.last_cleanup.is_some());
}

#[tokio::test]
async fn cleanup_within_bounds_is_a_noop() {
    let t = build_cache(CacheConfig::default());
    assert!(t.cache.cache_lesson(lesson("l1"), CachePriority::Low).await);

    t.cache.cleanup().await;

    let stats = t.cache.cache_stats().await;
    assert_eq!(stats.total_lessons, 1);
    assert!(stats.last_cleanup.is_none());
}

#[tokio::test]
async fn explicit_cleanup_reclaims_an_over_count_cache() {
    let config = CacheConfig::default().with_max_lessons(4);
    let t = build_cache(config);

    for i in 0..6 {
        assert!(
            t.cache
                .cache_lesson(lesson(&format!("l{}", i)), CachePriority::Low)
                .await
        );
        t.clock.advance(Duration::minutes(1));
    }
    assert_eq!(t.cache.cache_stats().await.total_lessons, 6);

    t.cache.cleanup().await;

    let stats = t.cache.cache_stats().await;
    // Down to the 80% head-room target: floor(4 * 0.8) = 3
    assert_eq!(stats.total_lessons, 3);
    assert!(stats.last_cleanup.is_some());

    // The survivors are the most recently accessed ones
    assert!(t.cache.is_lesson_cached("l3").await);
    assert!(t.cache.is_lesson_cached("l4").await);
    assert!(t.cache.is_lesson_cached("l5").await);
}

// ============================================================================
// Corruption and concurrency
// ============================================================================

#[tokio::test]
async fn corrupt_entries_read_as_misses_but_still_exist() {
    let t = build_cache(CacheConfig::default());

    t.store
        .set("cachedLesson:bad", "{definitely not json")
        .await
        .unwrap();

    assert!(t.cache.cached_lesson("bad").await.is_none());
    assert!(!t.cache.remove_cached_lesson("bad").await);
    assert!(t.cache.all_cached_lessons().await.is_empty());

    // The existence probe is raw and does not parse
    assert!(t.cache.is_lesson_cached("bad").await);
}

#[tokio::test]
async fn concurrent_inserts_keep_the_aggregate_exact() {
    let t = build_cache(CacheConfig::default());

    // Mutations serialize on an internal lock, so racing inserts cannot lose
    // metadata updates
    let (a, b, c) = tokio::join!(
        t.cache.cache_lesson(sized_lesson("a", 10), CachePriority::Low),
        t.cache.cache_lesson(sized_lesson("b", 20), CachePriority::Medium),
        t.cache.cache_lesson(sized_lesson("c", 30), CachePriority::High),
    );
    assert!(a && b && c);

    let stats = t.cache.cache_stats().await;
    assert_eq!(stats.total_lessons, 3);
    assert_eq!(stats.total_size_bytes, (1024 + 20) + (1024 + 40) + (1024 + 60));
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn cache_operations_emit_observations() {
    let store = Arc::new(MemoryDurableStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let bus = Arc::new(EventBus::new(16));
    let mut rx = bus.subscribe();

    let cache: OfflineCacheManager<Lesson> = OfflineCacheManager::new(
        CacheConfig::default(),
        store as Arc<dyn DurableStore>,
        clock as Arc<dyn Clock>,
    )
    .unwrap()
    .with_event_bus(bus);

    assert!(cache.cache_lesson(lesson("l1"), CachePriority::High).await);
    assert_eq!(
        rx.recv().await.unwrap(),
        CoreEvent::Cache(CacheEvent::LessonCached {
            lesson_id: "l1".to_string(),
            size_bytes: 1024,
            priority: "high".to_string(),
        })
    );

    cache.clear_all().await;
    assert_eq!(
        rx.recv().await.unwrap(),
        CoreEvent::Cache(CacheEvent::CacheCleared { lessons_removed: 1 })
    );
}

// ============================================================================
// Storage failures degrade, never propagate
// ============================================================================

mock! {
    Store {}

    #[async_trait]
    impl DurableStore for Store {
        async fn get(&self, key: &str) -> BridgeResult<Option<String>>;
        async fn set(&self, key: &str, value: &str) -> BridgeResult<()>;
        async fn remove(&self, key: &str) -> BridgeResult<()>;
        async fn contains(&self, key: &str) -> BridgeResult<bool>;
        async fn list_keys(&self) -> BridgeResult<Vec<String>>;
    }
}

fn failing_store() -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_get()
        .returning(|_| Err(BridgeError::OperationFailed("store offline".to_string())));
    store
        .expect_set()
        .returning(|_, _| Err(BridgeError::OperationFailed("store offline".to_string())));
    store
        .expect_remove()
        .returning(|_| Err(BridgeError::OperationFailed("store offline".to_string())));
    store
        .expect_contains()
        .returning(|_| Err(BridgeError::OperationFailed("store offline".to_string())));
    store
        .expect_list_keys()
        .returning(|| Err(BridgeError::OperationFailed("store offline".to_string())));
    store
}

fn broken_cache() -> OfflineCacheManager<Lesson> {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    OfflineCacheManager::new(
        CacheConfig::default(),
        Arc::new(failing_store()) as Arc<dyn DurableStore>,
        clock as Arc<dyn Clock>,
    )
    .unwrap()
}

#[tokio::test]
async fn store_failures_surface_as_falsy_results() {
    let cache = broken_cache();

    assert!(!cache.cache_lesson(lesson("l1"), CachePriority::High).await);
    assert!(cache.cached_lesson("l1").await.is_none());
    assert!(!cache.is_lesson_cached("l1").await);
    assert!(!cache.remove_cached_lesson("l1").await);
    assert!(cache.all_cached_lessons().await.is_empty());

    // clear_all and cleanup complete without panicking
    cache.clear_all().await;
    cache.cleanup().await;
}

#[tokio::test]
async fn stats_fall_back_to_an_empty_snapshot_on_read_failure() {
    let cache = broken_cache();

    let stats = cache.cache_stats().await;
    assert_eq!(stats.total_lessons, 0);
    assert_eq!(stats.total_size_bytes, 0);
    assert_eq!(stats.total_size, "0 B");
    assert_eq!(stats.max_size, "50 MB");
    assert_eq!(stats.usage_percentage, 0);
    assert!(stats.last_cleanup.is_none());
}

#[tokio::test]
async fn invalid_configuration_is_rejected_at_construction() {
    let store = Arc::new(MemoryDurableStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    let result: core_cache::Result<OfflineCacheManager<Lesson>> = OfflineCacheManager::new(
        CacheConfig::default().with_max_size_bytes(0),
        store as Arc<dyn DurableStore>,
        clock as Arc<dyn Clock>,
    );

    assert!(result.is_err());
}
