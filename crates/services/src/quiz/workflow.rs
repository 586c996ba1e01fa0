use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;

use lesson_core::Clock;
use lesson_core::model::{LessonId, UserId};
use lesson_core::session::{Advance, QuizOutcome, QuizSession, SubmittedAnswer};
use storage::repository::QuizRepository;

use super::view::QuizView;
use crate::error::QuizFlowError;
use crate::progress_service::{ProgressService, RecordedOutcome};

/// One user's in-flight run through a lesson's quiz.
///
/// Owns the session state machine plus the bookkeeping the engine itself
/// stays agnostic of: who is taking the quiz, when they started, and the
/// storage row of the persisted attempt once finished.
#[derive(Debug)]
pub struct ActiveQuiz {
    user_id: UserId,
    session: QuizSession,
    started_at: DateTime<Utc>,
    attempt_id: Option<i64>,
}

impl ActiveQuiz {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.session.quiz().lesson_id()
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Row id of the persisted attempt, set once the quiz finishes.
    #[must_use]
    pub fn attempt_id(&self) -> Option<i64> {
        self.attempt_id
    }

    /// Snapshot of the current state for presentation.
    #[must_use]
    pub fn view(&self) -> QuizView {
        QuizView::from_session(&self.session)
    }
}

/// Result of advancing an active quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizAdvanceResult {
    pub advance: Advance,
    /// Set on the finishing step, once the attempt row is written.
    pub attempt_id: Option<i64>,
    /// True when the finishing step marked the lesson completed for the
    /// first time.
    pub newly_completed: bool,
}

/// Orchestrates quiz runs and persists their results.
///
/// The session engine stays pure; this service reacts to its finishing
/// transition by recording the outcome through [`ProgressService`].
#[derive(Clone)]
pub struct QuizWorkflow {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    progress: ProgressService,
}

impl QuizWorkflow {
    #[must_use]
    pub fn new(clock: Clock, quizzes: Arc<dyn QuizRepository>, progress: ProgressService) -> Self {
        Self {
            clock,
            quizzes,
            progress,
        }
    }

    /// Start a quiz run for a user on the given lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::QuizNotFound` when the lesson has no quiz,
    /// or `QuizFlowError::Storage` on repository failures.
    pub async fn start(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<ActiveQuiz, QuizFlowError> {
        let quiz = self
            .quizzes
            .load_quiz(lesson_id)
            .await?
            .ok_or(QuizFlowError::QuizNotFound(lesson_id))?;

        info!(
            "user {user_id} started quiz for lesson {lesson_id} ({} questions)",
            quiz.question_count()
        );

        Ok(ActiveQuiz {
            user_id,
            session: QuizSession::new(quiz),
            started_at: self.clock.now(),
            attempt_id: None,
        })
    }

    /// Lock in an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Session` when the engine rejects the answer.
    pub fn answer(
        &self,
        active: &mut ActiveQuiz,
        question: usize,
        option: usize,
    ) -> Result<SubmittedAnswer, QuizFlowError> {
        Ok(active.session.submit_answer(question, option)?)
    }

    /// Step back to the previous question for review.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Session` when already at the first question
    /// or after the quiz finished.
    pub fn go_back(&self, active: &mut ActiveQuiz) -> Result<usize, QuizFlowError> {
        Ok(active.session.go_back()?)
    }

    /// Advance to the next question, persisting the attempt on the
    /// finishing step.
    ///
    /// The attempt row is written once, at the single transition into the
    /// finished state. A passing score additionally marks the lesson
    /// completed for the user.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Session` when the engine rejects the step,
    /// and `QuizFlowError::Progress` when persistence fails. On a storage
    /// failure the session is already finished; `finalize_attempt` retries
    /// the write.
    pub async fn advance(
        &self,
        active: &mut ActiveQuiz,
    ) -> Result<QuizAdvanceResult, QuizFlowError> {
        let advance = active.session.advance()?;

        let Advance::Finished(outcome) = advance else {
            return Ok(QuizAdvanceResult {
                advance,
                attempt_id: None,
                newly_completed: false,
            });
        };

        let (attempt_id, newly_completed) = self.persist_outcome(active, &outcome).await?;
        Ok(QuizAdvanceResult {
            advance,
            attempt_id: Some(attempt_id),
            newly_completed,
        })
    }

    /// Retry attempt persistence after a finished quiz.
    ///
    /// Useful when the final write failed (e.g. transient storage error).
    /// Returns the existing row id when the attempt was already persisted.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NotFinished` if the quiz is still running and
    /// `QuizFlowError::Progress` when persistence fails again.
    pub async fn finalize_attempt(&self, active: &mut ActiveQuiz) -> Result<i64, QuizFlowError> {
        if let Some(id) = active.attempt_id {
            return Ok(id);
        }

        let outcome = active.session.outcome().ok_or(QuizFlowError::NotFinished)?;
        let (attempt_id, _) = self.persist_outcome(active, &outcome).await?;
        Ok(attempt_id)
    }

    /// Discard the run and start over on the same quiz.
    ///
    /// The next finish persists a new attempt row; an already persisted
    /// attempt from this run is kept.
    pub fn reset(&self, active: &mut ActiveQuiz) {
        active.session.reset();
        active.started_at = self.clock.now();
        active.attempt_id = None;
        info!(
            "user {} restarted quiz for lesson {}",
            active.user_id,
            active.lesson_id()
        );
    }

    async fn persist_outcome(
        &self,
        active: &mut ActiveQuiz,
        outcome: &QuizOutcome,
    ) -> Result<(i64, bool), QuizFlowError> {
        let RecordedOutcome {
            attempt_id,
            newly_completed,
        } = self
            .progress
            .record_outcome(
                active.user_id,
                active.lesson_id(),
                outcome,
                active.started_at,
                self.clock.now(),
            )
            .await?;
        active.attempt_id = Some(attempt_id);
        Ok((attempt_id, newly_completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{Question, QuestionId, QuizDefinition};
    use lesson_core::time::fixed_clock;
    use storage::repository::{AttemptRepository, InMemoryRepository, ProgressRepository};

    fn build_quiz(lesson_id: u64, questions: u32) -> QuizDefinition {
        let questions = (1..=questions)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Question {id}"),
                    vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    1,
                    "B.",
                )
                .unwrap()
            })
            .collect();
        QuizDefinition::new(LessonId::new(lesson_id), "Lesson", questions).unwrap()
    }

    fn workflow_with(repo: &InMemoryRepository) -> QuizWorkflow {
        let progress = ProgressService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        QuizWorkflow::new(fixed_clock(), Arc::new(repo.clone()), progress)
    }

    async fn seeded_workflow(questions: u32) -> (InMemoryRepository, QuizWorkflow) {
        let repo = InMemoryRepository::new();
        repo.upsert_quiz(&build_quiz(1, questions)).await.unwrap();
        let workflow = workflow_with(&repo);
        (repo, workflow)
    }

    #[tokio::test]
    async fn start_requires_an_existing_quiz() {
        let repo = InMemoryRepository::new();
        let workflow = workflow_with(&repo);

        let err = workflow
            .start(UserId::new(1), LessonId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizFlowError::QuizNotFound(_)));
    }

    #[tokio::test]
    async fn passing_run_persists_attempt_and_completion() {
        let (repo, workflow) = seeded_workflow(3).await;
        let user = UserId::new(7);
        let mut active = workflow.start(user, LessonId::new(1)).await.unwrap();

        for i in 0..3 {
            workflow.answer(&mut active, i, 1).unwrap();
            let result = workflow.advance(&mut active).await.unwrap();
            if i < 2 {
                assert_eq!(result.attempt_id, None);
                assert!(!result.newly_completed);
            } else {
                assert!(result.attempt_id.is_some());
                assert!(result.newly_completed);
            }
        }

        let attempt_id = active.attempt_id().expect("attempt persisted");
        let attempt = repo.get_attempt(attempt_id).await.unwrap();
        assert_eq!(attempt.score(), 100);
        assert!(attempt.passed());

        let progress = repo.get_progress(user).await.unwrap();
        assert!(progress.is_completed(LessonId::new(1)));
    }

    #[tokio::test]
    async fn failing_run_persists_attempt_but_not_completion() {
        let (repo, workflow) = seeded_workflow(3).await;
        let user = UserId::new(7);
        let mut active = workflow.start(user, LessonId::new(1)).await.unwrap();

        // One of three correct: 33, below the threshold.
        workflow.answer(&mut active, 0, 1).unwrap();
        workflow.advance(&mut active).await.unwrap();
        workflow.answer(&mut active, 1, 0).unwrap();
        workflow.advance(&mut active).await.unwrap();
        workflow.answer(&mut active, 2, 0).unwrap();
        let result = workflow.advance(&mut active).await.unwrap();

        let Advance::Finished(outcome) = result.advance else {
            panic!("expected finished");
        };
        assert_eq!(outcome.score(), 33);
        assert!(!result.newly_completed);

        let progress = repo.get_progress(user).await.unwrap();
        assert!(!progress.is_completed(LessonId::new(1)));

        let rows = repo.list_attempts(user, LessonId::new(1), 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attempt.score(), 33);
    }

    #[tokio::test]
    async fn reset_yields_a_separate_attempt() {
        let (repo, workflow) = seeded_workflow(1).await;
        let user = UserId::new(1);
        let mut active = workflow.start(user, LessonId::new(1)).await.unwrap();

        workflow.answer(&mut active, 0, 0).unwrap();
        workflow.advance(&mut active).await.unwrap();
        assert!(active.attempt_id().is_some());

        workflow.reset(&mut active);
        assert_eq!(active.attempt_id(), None);
        assert!(!active.session().is_complete());

        workflow.answer(&mut active, 0, 1).unwrap();
        let result = workflow.advance(&mut active).await.unwrap();
        assert!(result.newly_completed);

        let rows = repo.list_attempts(user, LessonId::new(1), 10).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn finalize_attempt_is_idempotent() {
        let (_repo, workflow) = seeded_workflow(1).await;
        let mut active = workflow
            .start(UserId::new(1), LessonId::new(1))
            .await
            .unwrap();

        let err = workflow.finalize_attempt(&mut active).await.unwrap_err();
        assert!(matches!(err, QuizFlowError::NotFinished));

        workflow.answer(&mut active, 0, 1).unwrap();
        let result = workflow.advance(&mut active).await.unwrap();
        let id = result.attempt_id.expect("attempt persisted");

        assert_eq!(workflow.finalize_attempt(&mut active).await.unwrap(), id);
    }

    #[tokio::test]
    async fn finalize_attempt_recovers_from_a_transient_write_failure() {
        use std::sync::atomic::{AtomicBool, Ordering};

        use lesson_core::model::QuizAttempt;
        use storage::repository::{AttemptRow, StorageError};

        /// Fails the first append, then behaves like the wrapped repository.
        struct FlakyAttempts {
            inner: InMemoryRepository,
            fail_next: AtomicBool,
        }

        #[async_trait::async_trait]
        impl AttemptRepository for FlakyAttempts {
            async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError> {
                if self.fail_next.swap(false, Ordering::SeqCst) {
                    return Err(StorageError::Connection("connection reset".into()));
                }
                self.inner.append_attempt(attempt).await
            }

            async fn get_attempt(&self, id: i64) -> Result<QuizAttempt, StorageError> {
                self.inner.get_attempt(id).await
            }

            async fn list_attempts(
                &self,
                user_id: UserId,
                lesson_id: LessonId,
                limit: u32,
            ) -> Result<Vec<AttemptRow>, StorageError> {
                self.inner.list_attempts(user_id, lesson_id, limit).await
            }

            async fn best_scores(
                &self,
                user_id: UserId,
            ) -> Result<Vec<(LessonId, u8)>, StorageError> {
                self.inner.best_scores(user_id).await
            }
        }

        let repo = InMemoryRepository::new();
        repo.upsert_quiz(&build_quiz(1, 1)).await.unwrap();
        let progress = ProgressService::new(
            Arc::new(repo.clone()),
            Arc::new(FlakyAttempts {
                inner: repo.clone(),
                fail_next: AtomicBool::new(true),
            }),
            Arc::new(repo.clone()),
        );
        let workflow = QuizWorkflow::new(fixed_clock(), Arc::new(repo.clone()), progress);

        let user = UserId::new(1);
        let mut active = workflow.start(user, LessonId::new(1)).await.unwrap();
        workflow.answer(&mut active, 0, 1).unwrap();

        // The finishing write fails but the session is already finished.
        let err = workflow.advance(&mut active).await.unwrap_err();
        assert!(matches!(err, QuizFlowError::Progress(_)));
        assert!(active.session().is_complete());
        assert_eq!(active.attempt_id(), None);

        let id = workflow.finalize_attempt(&mut active).await.unwrap();
        assert_eq!(active.attempt_id(), Some(id));
        assert!(repo.get_attempt(id).await.unwrap().passed());
        assert!(
            repo.get_progress(user)
                .await
                .unwrap()
                .is_completed(LessonId::new(1))
        );
    }

    #[tokio::test]
    async fn completion_is_not_renewed_on_a_second_pass() {
        let (_repo, workflow) = seeded_workflow(1).await;
        let user = UserId::new(1);

        let mut first = workflow.start(user, LessonId::new(1)).await.unwrap();
        workflow.answer(&mut first, 0, 1).unwrap();
        assert!(workflow.advance(&mut first).await.unwrap().newly_completed);

        let mut second = workflow.start(user, LessonId::new(1)).await.unwrap();
        workflow.answer(&mut second, 0, 1).unwrap();
        assert!(!workflow.advance(&mut second).await.unwrap().newly_completed);
    }
}
