//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::{AttemptError, LessonId};
use lesson_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),
    #[error("lesson {0} has no quiz")]
    QuizNotFound(LessonId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the quiz workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("lesson {0} has no quiz")]
    QuizNotFound(LessonId),
    #[error("quiz is not finished")]
    NotFinished,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
