use async_trait::async_trait;
use lesson_core::model::{Lesson, LessonContent, LessonId, LessonLevel};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{id_i64, lesson_id_from_i64, level_from_str, ser, u32_from_i64, usize_from_i64, vec_from_json, vec_to_json};
use crate::repository::{LessonRepository, StorageError};

fn map_lesson_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lesson, StorageError> {
    let id = lesson_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let description: String = row.try_get("description").map_err(ser)?;
    let duration_minutes = u32_from_i64(
        "duration_minutes",
        row.try_get::<i64, _>("duration_minutes").map_err(ser)?,
    )?;
    let level = level_from_str(row.try_get::<&str, _>("level").map_err(ser)?)?;

    let content = LessonContent {
        introduction: row.try_get("introduction").map_err(ser)?,
        topics: vec_from_json(row.try_get::<&str, _>("topics").map_err(ser)?)?,
        examples: vec_from_json(row.try_get::<&str, _>("examples").map_err(ser)?)?,
        conclusion: row.try_get("conclusion").map_err(ser)?,
    };

    Lesson::new(id, title, description, duration_minutes, level, content).map_err(ser)
}

#[async_trait]
impl LessonRepository for SqliteRepository {
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let id = id_i64("lesson_id", lesson.id().value())?;
        let topics = vec_to_json(&lesson.content().topics)?;
        let examples = vec_to_json(&lesson.content().examples)?;

        sqlx::query(
            r"
                INSERT INTO lessons (
                    id, title, description, duration_minutes, level,
                    introduction, topics, examples, conclusion
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    duration_minutes = excluded.duration_minutes,
                    level = excluded.level,
                    introduction = excluded.introduction,
                    topics = excluded.topics,
                    examples = excluded.examples,
                    conclusion = excluded.conclusion
            ",
        )
        .bind(id)
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(i64::from(lesson.duration_minutes()))
        .bind(lesson.level().as_str())
        .bind(&lesson.content().introduction)
        .bind(topics)
        .bind(examples)
        .bind(&lesson.content().conclusion)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, title, description, duration_minutes, level,
                       introduction, topics, examples, conclusion
                FROM lessons
                WHERE id = ?1
            ",
        )
        .bind(id_i64("lesson_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn list_lessons(&self, level: Option<LessonLevel>) -> Result<Vec<Lesson>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT id, title, description, duration_minutes, level,
                       introduction, topics, examples, conclusion
                FROM lessons
            ",
        );
        if level.is_some() {
            sql.push_str(" WHERE level = ?1");
        }
        sql.push_str(" ORDER BY id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(level) = level {
            query = query.bind(level.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(map_lesson_row(row)?);
        }
        Ok(out)
    }

    async fn count_lessons(&self) -> Result<usize, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM lessons")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        usize_from_i64("lesson count", row.try_get::<i64, _>("n").map_err(ser)?)
    }
}
