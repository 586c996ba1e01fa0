use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{LessonId, QuestionId};
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizDefinitionError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("duplicate question id {id} in quiz")]
    DuplicateQuestionId { id: QuestionId },
}

//
// ─── QUIZ DEFINITION ───────────────────────────────────────────────────────────
//

/// The fixed set of questions for one lesson's quiz.
///
/// Owned by the content layer and handed to a session for one attempt.
/// Question order is presentation order and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDefinition {
    lesson_id: LessonId,
    lesson_title: String,
    questions: Vec<Question>,
}

impl QuizDefinition {
    /// Create a validated quiz definition.
    ///
    /// # Errors
    ///
    /// Returns `QuizDefinitionError::NoQuestions` for an empty question
    /// list, `EmptyTitle` for a blank lesson title, and
    /// `DuplicateQuestionId` when two questions share an id.
    pub fn new(
        lesson_id: LessonId,
        lesson_title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizDefinitionError> {
        let lesson_title = lesson_title.into();
        if lesson_title.trim().is_empty() {
            return Err(QuizDefinitionError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(QuizDefinitionError::NoQuestions);
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(QuizDefinitionError::DuplicateQuestionId { id: question.id() });
            }
        }

        Ok(Self {
            lesson_id,
            lesson_title,
            questions,
        })
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn lesson_title(&self) -> &str {
        &self.lesson_title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Question at the given position, if any.
    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions in this quiz. Always at least one.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
