//! # Lesson Domain
//!
//! Domain models for lesson content plus the [`LessonSource`](source::LessonSource)
//! trait that abstracts the remote backend serving them.

pub mod error;
pub mod models;
pub mod source;

pub use error::{LessonsError, Result};
pub use models::{Answer, Difficulty, Lesson, LessonContent, LessonKind, Question, QuestionKind};
pub use source::LessonSource;
