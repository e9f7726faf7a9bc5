//! Domain models for lessons
//!
//! Lesson records arrive from the remote source as JSON and are stored
//! verbatim by the offline cache, so the wire format (camelCase field names)
//! is fixed here once and shared by every consumer.

use serde::{Deserialize, Serialize};

/// A single unit of learning content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Server-assigned identifier, unique across all learning paths.
    pub id: String,

    /// Learning path this lesson belongs to.
    #[serde(default)]
    pub path_id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Presentation kind (reading, quiz, reflection, ...).
    #[serde(rename = "type", default)]
    pub kind: LessonKind,

    #[serde(default)]
    pub content: LessonContent,

    /// Expected completion time in minutes.
    #[serde(default)]
    pub duration: u32,

    #[serde(default)]
    pub xp_reward: u32,

    /// Lesson ids that should be completed first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,

    /// Tradition the lesson belongs to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub religion: Option<String>,
}

impl Lesson {
    /// Convenience constructor for the common case.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Presentation kind of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Reading,
    Quiz,
    Matching,
    Audio,
    Video,
    Interactive,
    Reflection,
    Practice,
}

impl Default for LessonKind {
    fn default() -> Self {
        Self::Reading
    }
}

/// Body content of a lesson. All sections are optional; a lesson carries
/// whichever mix its kind calls for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
}

/// A quiz question embedded in lesson content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: QuestionKind,

    pub question: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    pub correct_answer: Answer,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    pub difficulty: Difficulty,
}

/// Question interaction style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    Matching,
    Ordering,
}

/// Correct answer: a single choice or, for matching/ordering questions,
/// an ordered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}
