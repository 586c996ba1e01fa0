use std::collections::BTreeSet;

use crate::model::{LessonId, UserId};

/// Lessons a user has completed.
///
/// Completion is a set, so marking the same lesson twice is idempotent.
/// The overall percentage is derived against the catalog size, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgress {
    user_id: UserId,
    completed: BTreeSet<LessonId>,
}

impl UserProgress {
    /// Progress for a user who has completed nothing yet.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            completed: BTreeSet::new(),
        }
    }

    /// Rehydrate from persisted completion rows. Duplicates collapse.
    #[must_use]
    pub fn from_completed(user_id: UserId, lessons: impl IntoIterator<Item = LessonId>) -> Self {
        Self {
            user_id,
            completed: lessons.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Mark a lesson complete. Returns true when it was newly added.
    pub fn complete(&mut self, lesson_id: LessonId) -> bool {
        self.completed.insert(lesson_id)
    }

    #[must_use]
    pub fn is_completed(&self, lesson_id: LessonId) -> bool {
        self.completed.contains(&lesson_id)
    }

    /// Completed lessons in ascending id order.
    #[must_use]
    pub fn completed_lessons(&self) -> Vec<LessonId> {
        self.completed.iter().copied().collect()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Completion percentage against the catalog size, rounded to the
    /// nearest integer. Zero when the catalog is empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self, total_lessons: usize) -> u8 {
        if total_lessons == 0 {
            return 0;
        }
        let completed = self.completed.len().min(total_lessons);
        ((completed as f64) * 100.0 / (total_lessons as f64)).round() as u8
    }
}
