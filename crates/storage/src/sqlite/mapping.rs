use lesson_core::model::{LessonId, LessonLevel, QuestionId, UserId};

use crate::repository::StorageError;

pub fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub fn lesson_id_from_i64(v: i64) -> Result<LessonId, StorageError> {
    u64::try_from(v)
        .map(LessonId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid lesson_id: {v}")))
}

pub fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    u64::try_from(v)
        .map(UserId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid user_id: {v}")))
}

pub fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    u32::try_from(v)
        .map(QuestionId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid question_id: {v}")))
}

pub fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub fn usize_from_i64(field: &'static str, v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub fn level_from_str(raw: &str) -> Result<LessonLevel, StorageError> {
    raw.parse().map_err(ser)
}

/// String lists (topics, examples, answer options) are stored as JSON arrays
/// in a TEXT column.
pub fn vec_to_json(values: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(values).map_err(ser)
}

pub fn vec_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}
