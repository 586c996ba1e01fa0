use async_trait::async_trait;
use lesson_core::model::{LessonId, Question, QuizDefinition};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{id_i64, question_id_from_i64, ser, usize_from_i64, vec_from_json, vec_to_json};
use crate::repository::{QuizRepository, StorageError};

fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_i64(row.try_get::<i64, _>("question_id").map_err(ser)?)?;
    let prompt: String = row.try_get("prompt").map_err(ser)?;
    let options = vec_from_json(row.try_get::<&str, _>("options").map_err(ser)?)?;
    let correct_option = usize_from_i64(
        "correct_option",
        row.try_get::<i64, _>("correct_option").map_err(ser)?,
    )?;
    let explanation: String = row.try_get("explanation").map_err(ser)?;

    Question::new(id, prompt, options, correct_option, explanation).map_err(ser)
}

#[async_trait]
impl QuizRepository for SqliteRepository {
    async fn upsert_quiz(&self, quiz: &QuizDefinition) -> Result<(), StorageError> {
        let lesson_id = id_i64("lesson_id", quiz.lesson_id().value())?;

        // Replace the whole question set so stale questions never linger.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM quiz_questions WHERE lesson_id = ?1")
            .bind(lesson_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (position, question) in quiz.questions().iter().enumerate() {
            let options = vec_to_json(question.options())?;
            let position = i64::try_from(position).map_err(ser)?;
            let correct = i64::try_from(question.correct_option()).map_err(ser)?;

            sqlx::query(
                r"
                    INSERT INTO quiz_questions (
                        lesson_id, question_id, position, prompt,
                        options, correct_option, explanation
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(lesson_id)
            .bind(i64::from(question.id().value()))
            .bind(position)
            .bind(question.prompt())
            .bind(options)
            .bind(correct)
            .bind(question.explanation())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn load_quiz(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<QuizDefinition>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT l.title AS lesson_title,
                       q.question_id, q.prompt, q.options, q.correct_option, q.explanation
                FROM quiz_questions q
                JOIN lessons l ON l.id = q.lesson_id
                WHERE q.lesson_id = ?1
                ORDER BY q.position ASC
            ",
        )
        .bind(id_i64("lesson_id", lesson_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let lesson_title: String = first.try_get("lesson_title").map_err(ser)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in &rows {
            questions.push(map_question_row(row)?);
        }

        QuizDefinition::new(lesson_id, lesson_title, questions)
            .map(Some)
            .map_err(ser)
    }
}
