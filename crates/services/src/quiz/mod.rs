//! Quiz runs: the session engine wired to persistence and presentation.

pub mod view;
pub mod workflow;

pub use view::{
    ExplanationView, QuestionResult, QuestionView, QuizProgress, QuizView, ResultView,
};
pub use workflow::{ActiveQuiz, QuizAdvanceResult, QuizWorkflow};
