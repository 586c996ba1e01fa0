use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};

use lesson_core::model::{LessonId, QuizAttempt, UserId, UserProgress};
use lesson_core::session::QuizOutcome;
use storage::repository::{AttemptRepository, AttemptRow, LessonRepository, ProgressRepository};

use crate::error::ProgressServiceError;

/// What `record_outcome` wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedOutcome {
    /// Row id of the persisted attempt.
    pub attempt_id: i64,
    /// True when a passing outcome marked the lesson completed for the
    /// first time.
    pub newly_completed: bool,
}

/// A user's standing across the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverview {
    pub completed_lessons: Vec<LessonId>,
    pub total_lessons: usize,
    /// Percentage of the catalog completed, rounded to the nearest integer.
    pub percent: u8,
    /// Best attempt score per lesson, ascending by lesson id.
    pub best_scores: Vec<(LessonId, u8)>,
}

/// Read-side facade over completion state and attempt history.
#[derive(Clone)]
pub struct ProgressService {
    lessons: Arc<dyn LessonRepository>,
    attempts: Arc<dyn AttemptRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        lessons: Arc<dyn LessonRepository>,
        attempts: Arc<dyn AttemptRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            lessons,
            attempts,
            progress,
        }
    }

    /// Completion state for a user.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn get_progress(&self, user_id: UserId) -> Result<UserProgress, ProgressServiceError> {
        Ok(self.progress.get_progress(user_id).await?)
    }

    /// Whether a user has completed the given lesson.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn is_completed(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<bool, ProgressServiceError> {
        Ok(self.progress.get_progress(user_id).await?.is_completed(lesson_id))
    }

    /// A user's most recent attempts for one lesson.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn recent_attempts(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, ProgressServiceError> {
        Ok(self.attempts.list_attempts(user_id, lesson_id, limit).await?)
    }

    /// Persist a finished quiz outcome.
    ///
    /// Appends the attempt and, when the outcome passes, marks the lesson
    /// completed. Completion is idempotent; only the first pass reports
    /// `newly_completed`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Attempt` for an outcome that does not
    /// form a valid attempt and `ProgressServiceError::Storage` when a write
    /// fails. A failed completion mark still leaves the attempt row in
    /// place.
    pub async fn record_outcome(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        outcome: &QuizOutcome,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<RecordedOutcome, ProgressServiceError> {
        let attempt =
            QuizAttempt::from_outcome(user_id, lesson_id, outcome, started_at, completed_at)?;
        let attempt_id = self.attempts.append_attempt(&attempt).await?;
        info!(
            "user {user_id} finished quiz for lesson {lesson_id} with score {} ({})",
            outcome.score(),
            if outcome.passed() { "passed" } else { "failed" }
        );

        if !outcome.passed() {
            return Ok(RecordedOutcome {
                attempt_id,
                newly_completed: false,
            });
        }

        match self
            .progress
            .mark_completed(user_id, lesson_id, completed_at)
            .await
        {
            Ok(newly_completed) => {
                if newly_completed {
                    info!("marked lesson {lesson_id} completed for user {user_id}");
                }
                Ok(RecordedOutcome {
                    attempt_id,
                    newly_completed,
                })
            }
            Err(err) => {
                // The attempt row is already written; surface the failure
                // without losing it.
                warn!(
                    "failed to mark lesson {lesson_id} completed for user {user_id}: {err}"
                );
                Err(err.into())
            }
        }
    }

    /// Overall standing: completed lessons, percent of catalog, best scores.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn overview(&self, user_id: UserId) -> Result<ProgressOverview, ProgressServiceError> {
        let progress = self.progress.get_progress(user_id).await?;
        let total_lessons = self.lessons.count_lessons().await?;
        let best_scores = self.attempts.best_scores(user_id).await?;

        Ok(ProgressOverview {
            percent: progress.percent(total_lessons),
            completed_lessons: progress.completed_lessons(),
            total_lessons,
            best_scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{Lesson, LessonContent, LessonLevel, QuizAttempt};
    use lesson_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn build_lesson(id: u64) -> Lesson {
        Lesson::new(
            LessonId::new(id),
            format!("Lesson {id}"),
            "desc",
            30,
            LessonLevel::Beginner,
            LessonContent::default(),
        )
        .unwrap()
    }

    fn service_with(repo: &InMemoryRepository) -> ProgressService {
        ProgressService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    #[tokio::test]
    async fn overview_reports_percent_against_the_catalog() {
        let repo = InMemoryRepository::new();
        for id in 1..=6 {
            repo.upsert_lesson(&build_lesson(id)).await.unwrap();
        }

        let user = UserId::new(1);
        let now = fixed_now();
        repo.mark_completed(user, LessonId::new(1), now).await.unwrap();
        repo.mark_completed(user, LessonId::new(2), now).await.unwrap();

        let attempt =
            QuizAttempt::from_persisted(user, LessonId::new(1), 100, 3, 3, now, now).unwrap();
        repo.append_attempt(&attempt).await.unwrap();

        let svc = service_with(&repo);
        let overview = svc.overview(user).await.unwrap();

        assert_eq!(overview.total_lessons, 6);
        // round(2 / 6 * 100) = 33.
        assert_eq!(overview.percent, 33);
        assert_eq!(
            overview.completed_lessons,
            vec![LessonId::new(1), LessonId::new(2)]
        );
        assert_eq!(overview.best_scores, vec![(LessonId::new(1), 100)]);

        assert!(svc.is_completed(user, LessonId::new(1)).await.unwrap());
        assert!(!svc.is_completed(user, LessonId::new(3)).await.unwrap());
    }

    #[tokio::test]
    async fn record_outcome_marks_completion_only_on_pass() {
        use lesson_core::model::{Question, QuestionId, QuizDefinition};
        use lesson_core::session::{Advance, QuizSession};

        let question = Question::new(
            QuestionId::new(1),
            "Q",
            vec!["A".into(), "B".into()],
            1,
            "B.",
        )
        .unwrap();
        let quiz = QuizDefinition::new(LessonId::new(1), "Lesson", vec![question]).unwrap();
        let mut session = QuizSession::new(quiz);

        // Failing outcome first.
        session.submit_answer(0, 0).unwrap();
        let Advance::Finished(failed) = session.advance().unwrap() else {
            panic!("expected finished");
        };

        let repo = InMemoryRepository::new();
        repo.upsert_lesson(&build_lesson(1)).await.unwrap();
        let svc = service_with(&repo);
        let user = UserId::new(1);
        let now = fixed_now();

        let recorded = svc
            .record_outcome(user, LessonId::new(1), &failed, now, now)
            .await
            .unwrap();
        assert!(!recorded.newly_completed);
        assert!(!svc.is_completed(user, LessonId::new(1)).await.unwrap());

        // Passing outcome on a fresh attempt.
        session.reset();
        session.submit_answer(0, 1).unwrap();
        let Advance::Finished(passed) = session.advance().unwrap() else {
            panic!("expected finished");
        };

        let recorded = svc
            .record_outcome(user, LessonId::new(1), &passed, now, now)
            .await
            .unwrap();
        assert!(recorded.newly_completed);
        assert!(svc.is_completed(user, LessonId::new(1)).await.unwrap());

        // A second pass does not renew completion.
        let recorded = svc
            .record_outcome(user, LessonId::new(1), &passed, now, now)
            .await
            .unwrap();
        assert!(!recorded.newly_completed);

        let attempts = svc.recent_attempts(user, LessonId::new(1), 10).await.unwrap();
        assert_eq!(attempts.len(), 3);
    }

    #[tokio::test]
    async fn overview_for_a_new_user_is_empty() {
        let repo = InMemoryRepository::new();
        repo.upsert_lesson(&build_lesson(1)).await.unwrap();

        let svc = service_with(&repo);
        let overview = svc.overview(UserId::new(9)).await.unwrap();

        assert_eq!(overview.percent, 0);
        assert!(overview.completed_lessons.is_empty());
        assert!(overview.best_scores.is_empty());

        let attempts = svc
            .recent_attempts(UserId::new(9), LessonId::new(1), 5)
            .await
            .unwrap();
        assert!(attempts.is_empty());
    }
}
