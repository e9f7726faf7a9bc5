//! Lesson size estimation
//!
//! Deliberately crude: a fixed overhead plus flat per-character and
//! per-question costs. The estimate drives admission and eviction thresholds,
//! so what matters is that it is deterministic and monotone in content size,
//! not that it matches serialized bytes.

use core_lessons::Lesson;

use crate::entry::LessonRecord;

/// Fixed overhead charged to every lesson entry.
pub const LESSON_BASE_OVERHEAD_BYTES: u64 = 1024;

/// Flat cost per description character.
const DESCRIPTION_BYTES_PER_CHAR: u64 = 2;

/// Flat cost per embedded quiz question.
const PER_QUESTION_BYTES: u64 = 500;

/// Estimate the storage cost of a lesson in bytes.
///
/// Pure and infallible; never inspects anything beyond the description length
/// and question count.
pub fn estimate_lesson_size(lesson: &Lesson) -> u64 {
    LESSON_BASE_OVERHEAD_BYTES
        + DESCRIPTION_BYTES_PER_CHAR * lesson.description.chars().count() as u64
        + PER_QUESTION_BYTES * lesson.content.questions.len() as u64
}

impl LessonRecord for Lesson {
    fn lesson_id(&self) -> &str {
        &self.id
    }

    fn estimated_size(&self) -> u64 {
        estimate_lesson_size(self)
    }
}
