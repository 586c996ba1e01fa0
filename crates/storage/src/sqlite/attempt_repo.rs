use async_trait::async_trait;
use lesson_core::model::{LessonId, QuizAttempt, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{id_i64, lesson_id_from_i64, ser, u8_from_i64, u32_from_i64, user_id_from_i64};
use crate::repository::{AttemptRepository, AttemptRow, StorageError};

fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizAttempt, StorageError> {
    let user_id = user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?;
    let lesson_id = lesson_id_from_i64(row.try_get::<i64, _>("lesson_id").map_err(ser)?)?;
    let score = u8_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    QuizAttempt::from_persisted(user_id, lesson_id, score, correct, total, started_at, completed_at)
        .map_err(ser)
}

#[async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError> {
        let user_id = id_i64("user_id", attempt.user_id().value())?;
        let lesson_id = id_i64("lesson_id", attempt.lesson_id().value())?;

        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (
                    user_id, lesson_id, score, correct, total,
                    started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(i64::from(attempt.score()))
        .bind(i64::from(attempt.correct()))
        .bind(i64::from(attempt.total()))
        .bind(attempt.started_at())
        .bind(attempt.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_attempt(&self, id: i64) -> Result<QuizAttempt, StorageError> {
        let row = sqlx::query(
            r"
                SELECT user_id, lesson_id, score, correct, total,
                       started_at, completed_at
                FROM quiz_attempts
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }

    async fn list_attempts(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, lesson_id, score, correct, total,
                       started_at, completed_at
                FROM quiz_attempts
                WHERE user_id = ?1 AND lesson_id = ?2
                ORDER BY completed_at DESC, id DESC
                LIMIT ?3
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .bind(id_i64("lesson_id", lesson_id.value())?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            out.push(AttemptRow::new(id, map_attempt_row(row)?));
        }
        Ok(out)
    }

    async fn best_scores(&self, user_id: UserId) -> Result<Vec<(LessonId, u8)>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT lesson_id, MAX(score) AS best
                FROM quiz_attempts
                WHERE user_id = ?1
                GROUP BY lesson_id
                ORDER BY lesson_id ASC
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let lesson_id = lesson_id_from_i64(row.try_get::<i64, _>("lesson_id").map_err(ser)?)?;
            let best = u8_from_i64("best score", row.try_get::<i64, _>("best").map_err(ser)?)?;
            out.push((lesson_id, best));
        }
        Ok(out)
    }
}
