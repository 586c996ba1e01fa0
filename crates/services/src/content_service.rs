use std::sync::Arc;

use lesson_core::model::{Lesson, LessonId, LessonLevel, QuizDefinition};
use storage::repository::{LessonRepository, QuizRepository};

use crate::error::ContentServiceError;

/// Read-side facade over the lesson catalog and its quizzes.
#[derive(Clone)]
pub struct ContentService {
    lessons: Arc<dyn LessonRepository>,
    quizzes: Arc<dyn QuizRepository>,
}

impl ContentService {
    #[must_use]
    pub fn new(lessons: Arc<dyn LessonRepository>, quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { lessons, quizzes }
    }

    /// List lessons in catalog order, optionally filtered by level.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` on repository failures.
    pub async fn list_lessons(
        &self,
        level: Option<LessonLevel>,
    ) -> Result<Vec<Lesson>, ContentServiceError> {
        Ok(self.lessons.list_lessons(level).await?)
    }

    /// Fetch a single lesson.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::LessonNotFound` when the lesson does not
    /// exist.
    pub async fn get_lesson(&self, id: LessonId) -> Result<Lesson, ContentServiceError> {
        self.lessons
            .get_lesson(id)
            .await?
            .ok_or(ContentServiceError::LessonNotFound(id))
    }

    /// Load the quiz attached to a lesson.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::QuizNotFound` when the lesson has no
    /// quiz.
    pub async fn load_quiz(
        &self,
        lesson_id: LessonId,
    ) -> Result<QuizDefinition, ContentServiceError> {
        self.quizzes
            .load_quiz(lesson_id)
            .await?
            .ok_or(ContentServiceError::QuizNotFound(lesson_id))
    }

    /// Total number of lessons in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` on repository failures.
    pub async fn lesson_count(&self) -> Result<usize, ContentServiceError> {
        Ok(self.lessons.count_lessons().await?)
    }
}
