//! # Event Bus System
//!
//! Provides an event-driven architecture for the learning platform core using
//! `tokio::sync::broadcast`. This module enables decoupled communication
//! between core modules through typed events.
//!
//! The bus doubles as the analytics surface: the cache and service layers emit
//! observations (lesson cached, cleanup completed, network changed) that an
//! analytics subscriber can forward to whatever telemetry pipeline the host
//! ships with. Emission is fire-and-forget; a missing or slow subscriber never
//! affects the operation that produced the event.
//!
//! ## Usage
//!
//! ### Creating an Event Bus
//!
//! ```rust
//! use core_runtime::events::EventBus;
//!
//! let event_bus = EventBus::new(100); // Buffer size of 100 events
//! ```
//!
//! ### Publishing Events
//!
//! ```rust
//! use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
//!
//! # let event_bus = EventBus::new(100);
//! let event = CoreEvent::Cache(CacheEvent::LessonCached {
//!     lesson_id: "lesson-123".to_string(),
//!     size_bytes: 2224,
//!     priority: "medium".to_string(),
//! });
//!
//! event_bus.emit(event).ok();
//! ```
//!
//! ### Subscribing to Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent};
//! use tokio::sync::broadcast::error::RecvError;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! tokio::spawn(async move {
//!     loop {
//!         match stream.recv().await {
//!             Ok(event) => println!("Received: {:?}", event),
//!             Err(RecvError::Lagged(n)) => {
//!                 eprintln!("Missed {} events", n);
//!             }
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//! });
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The event bus uses `tokio::sync::broadcast`, which can produce two types of
//! errors on the receiving side:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall behind by more than this receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Offline cache events
    Cache(CacheEvent),
    /// Lesson access/download events
    Lesson(LessonEvent),
    /// Network connectivity events
    Network(NetworkEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Cache(e) => e.description(),
            CoreEvent::Lesson(e) => e.description(),
            CoreEvent::Network(e) => e.description(),
        }
    }
}

// ============================================================================
// Cache Events
// ============================================================================

/// Events emitted by the offline lesson cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CacheEvent {
    /// A lesson was admitted and written to the cache.
    LessonCached {
        /// The lesson identifier.
        lesson_id: String,
        /// Estimated storage cost recorded for the entry.
        size_bytes: u64,
        /// Caller-assigned priority tier ("high"/"medium"/"low").
        priority: String,
    },
    /// An eviction pass finished.
    CleanupCompleted {
        /// Number of entries removed by the pass.
        lessons_removed: usize,
        /// Number of entries still cached afterwards.
        lessons_remaining: usize,
    },
    /// The entire cache (including high-priority entries) was cleared.
    CacheCleared {
        /// Number of entries removed.
        lessons_removed: usize,
    },
}

impl CacheEvent {
    fn description(&self) -> &str {
        match self {
            CacheEvent::LessonCached { .. } => "Lesson cached for offline access",
            CacheEvent::CleanupCompleted { .. } => "Cache cleanup completed",
            CacheEvent::CacheCleared { .. } => "Cache cleared",
        }
    }
}

// ============================================================================
// Lesson Events
// ============================================================================

/// Events emitted by the lesson service facade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LessonEvent {
    /// A cached lesson was read.
    CachedLessonAccessed {
        /// The lesson identifier.
        lesson_id: String,
        /// Whether the device was offline at access time.
        offline: bool,
    },
    /// A cached lesson was removed at the caller's request.
    CachedLessonRemoved {
        /// The lesson identifier.
        lesson_id: String,
    },
    /// A background auto-download run finished.
    AutoDownloadCompleted {
        /// Number of lessons newly cached by the run.
        lessons_downloaded: usize,
    },
}

impl LessonEvent {
    fn description(&self) -> &str {
        match self {
            LessonEvent::CachedLessonAccessed { .. } => "Cached lesson accessed",
            LessonEvent::CachedLessonRemoved { .. } => "Cached lesson removed",
            LessonEvent::AutoDownloadCompleted { .. } => "Auto-download completed",
        }
    }
}

// ============================================================================
// Network Events
// ============================================================================

/// Events related to device connectivity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NetworkEvent {
    /// Connectivity changed between online and offline.
    StatusChanged {
        /// Whether the device is now online.
        online: bool,
        /// Connection type label ("wifi"/"cellular"/...), if known.
        connection_type: Option<String>,
    },
}

impl NetworkEvent {
    fn description(&self) -> &str {
        match self {
            NetworkEvent::StatusChanged { .. } => "Network status changed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for publishing [`CoreEvent`]s.
///
/// Fully thread-safe (`Send + Sync`); share across tasks with `Arc`.
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers. Callers that treat events as
    /// fire-and-forget observations should ignore the result.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}
