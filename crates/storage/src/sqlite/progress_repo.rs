use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::model::{LessonId, UserId, UserProgress};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{id_i64, lesson_id_from_i64, ser};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn mark_completed(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        // The primary key makes completion idempotent; the first timestamp
        // is kept.
        let res = sqlx::query(
            r"
                INSERT INTO lesson_progress (user_id, lesson_id, completed_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, lesson_id) DO NOTHING
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .bind(id_i64("lesson_id", lesson_id.value())?)
        .bind(completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected() > 0)
    }

    async fn get_progress(&self, user_id: UserId) -> Result<UserProgress, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT lesson_id
                FROM lesson_progress
                WHERE user_id = ?1
                ORDER BY lesson_id ASC
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut lessons = Vec::with_capacity(rows.len());
        for row in &rows {
            lessons.push(lesson_id_from_i64(
                row.try_get::<i64, _>("lesson_id").map_err(ser)?,
            )?);
        }

        Ok(UserProgress::from_completed(user_id, lessons))
    }
}
