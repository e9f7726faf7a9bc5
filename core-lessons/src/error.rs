use thiserror::Error;

#[derive(Error, Debug)]
pub enum LessonsError {
    #[error("Remote source error: {0}")]
    Remote(String),

    #[error("Lesson not found: {0}")]
    NotFound(String),

    #[error("Invalid lesson data: {field} - {message}")]
    InvalidData { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, LessonsError>;
