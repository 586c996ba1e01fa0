use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::LessonId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("lesson duration must be > 0 minutes")]
    InvalidDuration,

    #[error("unknown lesson level: {raw}")]
    UnknownLevel { raw: String },
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Difficulty tier a lesson is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LessonLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl LessonLevel {
    /// Stable string form used in storage and filters.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonLevel::Beginner => "beginner",
            LessonLevel::Intermediate => "intermediate",
            LessonLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for LessonLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonLevel {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(LessonLevel::Beginner),
            "intermediate" => Ok(LessonLevel::Intermediate),
            "advanced" => Ok(LessonLevel::Advanced),
            other => Err(LessonError::UnknownLevel {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Structured body of a lesson page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LessonContent {
    pub introduction: String,
    pub topics: Vec<String>,
    pub examples: Vec<String>,
    pub conclusion: String,
}

/// A lesson in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: String,
    duration_minutes: u32,
    level: LessonLevel,
    content: LessonContent,
}

impl Lesson {
    /// Create a validated lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` for a blank title and
    /// `LessonError::InvalidDuration` for a zero duration.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        description: impl Into<String>,
        duration_minutes: u32,
        level: LessonLevel,
        content: LessonContent,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        if duration_minutes == 0 {
            return Err(LessonError::InvalidDuration);
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            duration_minutes,
            level,
            content,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn level(&self) -> LessonLevel {
        self.level
    }

    #[must_use]
    pub fn content(&self) -> &LessonContent {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_rejects_blank_title_and_zero_duration() {
        let err = Lesson::new(
            LessonId::new(1),
            "  ",
            "desc",
            30,
            LessonLevel::Beginner,
            LessonContent::default(),
        )
        .unwrap_err();
        assert_eq!(err, LessonError::EmptyTitle);

        let err = Lesson::new(
            LessonId::new(1),
            "Intro",
            "desc",
            0,
            LessonLevel::Beginner,
            LessonContent::default(),
        )
        .unwrap_err();
        assert_eq!(err, LessonError::InvalidDuration);
    }

    #[test]
    fn level_roundtrips_through_string_form() {
        for level in [
            LessonLevel::Beginner,
            LessonLevel::Intermediate,
            LessonLevel::Advanced,
        ] {
            let parsed: LessonLevel = level.as_str().parse().unwrap();
            assert_eq!(parsed, level);
        }
        assert!("expert".parse::<LessonLevel>().is_err());
    }
}
