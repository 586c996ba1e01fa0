mod attempt;
mod ids;
mod lesson;
mod progress;
mod question;
mod quiz;

pub use ids::{LessonId, ParseIdError, QuestionId, UserId};

pub use attempt::{AttemptError, QuizAttempt};
pub use lesson::{Lesson, LessonContent, LessonError, LessonLevel};
pub use progress::UserProgress;
pub use question::{Question, QuestionError};
pub use quiz::{QuizDefinition, QuizDefinitionError};
