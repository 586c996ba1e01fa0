use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{LessonId, UserId};
use crate::session::{PASS_THRESHOLD, QuizOutcome};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score {score} is above 100")]
    ScoreOutOfRange { score: u8 },

    #[error("correct count ({correct}) exceeds total ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("attempt has no questions")]
    EmptyAttempt,
}

/// Persisted summary of one finished quiz attempt.
///
/// Whether the attempt passed is derived from the score, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttempt {
    user_id: UserId,
    lesson_id: LessonId,
    score: u8,
    correct: u32,
    total: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl QuizAttempt {
    /// Rehydrate an attempt from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` if the timestamps are inverted, the score is
    /// above 100, the counts do not align, or the attempt has zero questions.
    pub fn from_persisted(
        user_id: UserId,
        lesson_id: LessonId,
        score: u8,
        correct: u32,
        total: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if completed_at < started_at {
            return Err(AttemptError::InvalidTimeRange);
        }
        if score > 100 {
            return Err(AttemptError::ScoreOutOfRange { score });
        }
        if total == 0 {
            return Err(AttemptError::EmptyAttempt);
        }
        if correct > total {
            return Err(AttemptError::CountMismatch { correct, total });
        }

        Ok(Self {
            user_id,
            lesson_id,
            score,
            correct,
            total,
            started_at,
            completed_at,
        })
    }

    /// Build an attempt summary from a finished session outcome.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTimeRange` if `completed_at` is before
    /// `started_at`, or `AttemptError::EmptyAttempt` for a zero-question
    /// outcome (which a valid quiz can never produce).
    pub fn from_outcome(
        user_id: UserId,
        lesson_id: LessonId,
        outcome: &QuizOutcome,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        let correct = u32::try_from(outcome.correct()).unwrap_or(u32::MAX);
        let total = u32::try_from(outcome.total()).unwrap_or(u32::MAX);
        Self::from_persisted(
            user_id,
            lesson_id,
            outcome.score(),
            correct,
            total,
            started_at,
            completed_at,
        )
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Whether this attempt meets the pass threshold.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.score >= PASS_THRESHOLD
    }
}
