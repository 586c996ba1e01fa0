#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod session;
pub mod time;

pub use error::Error;
pub use session::{
    Advance, PASS_THRESHOLD, QuizOutcome, QuizSession, QuizState, SessionError, SubmittedAnswer,
};
pub use time::Clock;
