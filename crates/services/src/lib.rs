#![forbid(unsafe_code)]

pub mod content_service;
pub mod error;
pub mod progress_service;
pub mod quiz;

pub use lesson_core::Clock;

pub use content_service::ContentService;
pub use error::{ContentServiceError, ProgressServiceError, QuizFlowError};
pub use progress_service::{ProgressOverview, ProgressService, RecordedOutcome};
pub use quiz::{ActiveQuiz, QuizAdvanceResult, QuizView, QuizWorkflow};
