use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::model::{
    Lesson, LessonId, LessonLevel, QuizAttempt, QuizDefinition, UserId, UserProgress,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// An attempt paired with its storage row id.
#[derive(Debug, Clone)]
pub struct AttemptRow {
    pub id: i64,
    pub attempt: QuizAttempt,
}

impl AttemptRow {
    #[must_use]
    pub fn new(id: i64, attempt: QuizAttempt) -> Self {
        Self { id, attempt }
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Repository contract for the lesson catalog.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Persist or update a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Fetch a lesson by ID. Returns `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError>;

    /// List lessons in catalog order, optionally filtered by level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_lessons(&self, level: Option<LessonLevel>) -> Result<Vec<Lesson>, StorageError>;

    /// Total number of lessons in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn count_lessons(&self) -> Result<usize, StorageError>;
}

/// Repository contract for quiz definitions, keyed by lesson.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist or replace the quiz for a lesson, including question order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &QuizDefinition) -> Result<(), StorageError>;

    /// Load the quiz for a lesson. Returns `Ok(None)` when the lesson has
    /// no quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures, including a persisted
    /// quiz that no longer validates.
    async fn load_quiz(&self, lesson_id: LessonId) -> Result<Option<QuizDefinition>, StorageError>;
}

/// Repository contract for finished attempt summaries.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append a finished attempt and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError>;

    /// Fetch an attempt by row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when missing.
    async fn get_attempt(&self, id: i64) -> Result<QuizAttempt, StorageError>;

    /// List a user's attempts for a lesson, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_attempts(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError>;

    /// Best score per lesson for a user, ascending by lesson id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn best_scores(&self, user_id: UserId) -> Result<Vec<(LessonId, u8)>, StorageError>;
}

/// Repository contract for lesson completion.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Mark a lesson complete for a user. Idempotent; returns true when the
    /// lesson was newly marked.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the mark cannot be stored.
    async fn mark_completed(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Completion state for a user. A user with no rows has empty progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_progress(&self, user_id: UserId) -> Result<UserProgress, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    lessons: Arc<Mutex<BTreeMap<LessonId, Lesson>>>,
    quizzes: Arc<Mutex<HashMap<LessonId, QuizDefinition>>>,
    attempts: Arc<Mutex<Vec<QuizAttempt>>>,
    progress: Arc<Mutex<HashMap<(UserId, LessonId), DateTime<Utc>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lessons.lock().map_err(poisoned)?;
        guard.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_lessons(&self, level: Option<LessonLevel>) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        Ok(guard
            .values()
            .filter(|lesson| level.is_none_or(|l| lesson.level() == l))
            .cloned()
            .collect())
    }

    async fn count_lessons(&self) -> Result<usize, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        Ok(guard.len())
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn upsert_quiz(&self, quiz: &QuizDefinition) -> Result<(), StorageError> {
        let mut guard = self.quizzes.lock().map_err(poisoned)?;
        guard.insert(quiz.lesson_id(), quiz.clone());
        Ok(())
    }

    async fn load_quiz(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<QuizDefinition>, StorageError> {
        let guard = self.quizzes.lock().map_err(poisoned)?;
        Ok(guard.get(&lesson_id).cloned())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError> {
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        guard.push(attempt.clone());
        i64::try_from(guard.len()).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn get_attempt(&self, id: i64) -> Result<QuizAttempt, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        let index = usize::try_from(id.checked_sub(1).ok_or(StorageError::NotFound)?)
            .map_err(|_| StorageError::NotFound)?;
        guard.get(index).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_attempts(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        let mut rows: Vec<AttemptRow> = guard
            .iter()
            .enumerate()
            .filter(|(_, a)| a.user_id() == user_id && a.lesson_id() == lesson_id)
            .map(|(i, a)| AttemptRow::new(i as i64 + 1, a.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.attempt
                .completed_at()
                .cmp(&a.attempt.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn best_scores(&self, user_id: UserId) -> Result<Vec<(LessonId, u8)>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        let mut best: BTreeMap<LessonId, u8> = BTreeMap::new();
        for attempt in guard.iter().filter(|a| a.user_id() == user_id) {
            let entry = best.entry(attempt.lesson_id()).or_insert(0);
            *entry = (*entry).max(attempt.score());
        }
        Ok(best.into_iter().collect())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn mark_completed(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        // First completion wins; re-marking keeps the original timestamp.
        let newly = !guard.contains_key(&(user_id, lesson_id));
        if newly {
            guard.insert((user_id, lesson_id), completed_at);
        }
        Ok(newly)
    }

    async fn get_progress(&self, user_id: UserId) -> Result<UserProgress, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        let lessons = guard
            .keys()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, lesson)| *lesson);
        Ok(UserProgress::from_completed(user_id, lessons))
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub lessons: Arc<dyn LessonRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            lessons: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}
