//! Remote Lesson Source Abstraction
//!
//! The backend that actually serves lesson content (Supabase in the shipping
//! app) stays behind this trait; the core only ever sees `Lesson` records.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Lesson;

/// Remote source of lesson content.
///
/// Implementations wrap whatever backend the host talks to. All methods are
/// read-only; the core never mutates remote state.
#[async_trait]
pub trait LessonSource: Send + Sync {
    /// Fetch a single lesson by id.
    ///
    /// Returns `Ok(None)` when the lesson does not exist.
    async fn fetch_lesson(&self, lesson_id: &str) -> Result<Option<Lesson>>;

    /// Lessons the user recently worked with, most recent first.
    ///
    /// Used to decide what is worth caching ahead of time. Implementations
    /// may return fewer than `limit` items.
    async fn recent_lessons(&self, limit: usize) -> Result<Vec<Lesson>>;
}
