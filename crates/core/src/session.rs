use std::fmt;
use thiserror::Error;

use crate::model::QuizDefinition;

/// Minimum score (inclusive) that counts as passing a quiz.
pub const PASS_THRESHOLD: u8 = 70;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Invalid operations on a quiz session.
///
/// None of these mutate the session; a caller may ignore them to get the
/// "silently rejected" behavior of a UI that simply disables the control.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question {submitted} is not the current question ({current})")]
    NotCurrentQuestion { submitted: usize, current: usize },

    #[error("question {index} is already answered")]
    AlreadyAnswered { index: usize },

    #[error("option {option} is out of range for {available} options")]
    OptionOutOfRange { option: usize, available: usize },

    #[error("current question has not been answered yet")]
    NotYetAnswered,

    #[error("already at the first question")]
    AtFirstQuestion,

    #[error("quiz is already finished")]
    Finished,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Observable state of a quiz session.
///
/// `Answering(i)` waits for an answer to question `i`; `Explaining(i)` shows
/// correctness and the explanation for the locked-in answer to question `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Answering(usize),
    Explaining(usize),
    Finished,
}

impl QuizState {
    /// Index of the question in focus, `None` once finished.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            QuizState::Answering(i) | QuizState::Explaining(i) => Some(*i),
            QuizState::Finished => None,
        }
    }
}

/// Result of locking in an answer for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedAnswer {
    pub question: usize,
    pub option: usize,
    pub correct: bool,
}

/// Where `advance()` landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at this index.
    Question(usize),
    /// Advanced past the last question; carries the outcome of the attempt.
    ///
    /// Produced exactly once per attempt, at the single transition into
    /// `Finished`.
    Finished(QuizOutcome),
}

/// Final result of one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    score: u8,
    correct: usize,
    total: usize,
}

impl QuizOutcome {
    /// Percentage score, 0 to 100.
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether the score meets [`PASS_THRESHOLD`].
    #[must_use]
    pub fn passed(&self) -> bool {
        self.score >= PASS_THRESHOLD
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One in-progress quiz attempt over a fixed [`QuizDefinition`].
///
/// Steps through the questions in order, records exactly one answer per
/// question, reveals the explanation after each answer, and yields the final
/// score when the last question is advanced past. Purely in-memory and
/// synchronous; persistence is the caller's concern. One instance serves one
/// attempt, and `reset()` starts a fresh attempt over the same definition.
pub struct QuizSession {
    quiz: QuizDefinition,
    state: QuizState,
    answers: Vec<Option<usize>>,
    outcome: Option<QuizOutcome>,
}

impl QuizSession {
    /// Start a session at the first question with nothing answered.
    ///
    /// `QuizDefinition` construction already guarantees a non-empty,
    /// well-formed question list, so this cannot fail.
    #[must_use]
    pub fn new(quiz: QuizDefinition) -> Self {
        let answers = vec![None; quiz.question_count()];
        Self {
            quiz,
            state: QuizState::Answering(0),
            answers,
            outcome: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    /// Index of the question currently in focus, `None` once finished.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.state.index()
    }

    /// Recorded answer per question, in question order. Length never changes.
    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    /// Number of questions answered so far.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, QuizState::Finished)
    }

    /// Outcome of the attempt, set once the session finishes.
    #[must_use]
    pub fn outcome(&self) -> Option<QuizOutcome> {
        self.outcome
    }

    /// Lock in an answer for the current question.
    ///
    /// Moves `Answering(i)` to `Explaining(i)` and reports whether the
    /// chosen option was correct. The answer cannot be changed afterwards.
    ///
    /// # Errors
    ///
    /// Rejected without any state change when `question` is not the current
    /// index, the question is already answered, `option` is out of range,
    /// or the session is finished.
    pub fn submit_answer(
        &mut self,
        question: usize,
        option: usize,
    ) -> Result<SubmittedAnswer, SessionError> {
        let current = match self.state {
            QuizState::Answering(i) | QuizState::Explaining(i) => i,
            QuizState::Finished => return Err(SessionError::Finished),
        };

        if question != current {
            return Err(SessionError::NotCurrentQuestion {
                submitted: question,
                current,
            });
        }
        if self.answers[current].is_some() {
            return Err(SessionError::AlreadyAnswered { index: current });
        }

        // Index is valid: answers has one slot per question.
        let q = &self.quiz.questions()[current];
        if option >= q.option_count() {
            return Err(SessionError::OptionOutOfRange {
                option,
                available: q.option_count(),
            });
        }

        self.answers[current] = Some(option);
        self.state = QuizState::Explaining(current);

        Ok(SubmittedAnswer {
            question: current,
            option,
            correct: q.is_correct(option),
        })
    }

    /// Move to the next question, or finish the attempt after the last one.
    ///
    /// Landing on a question that was already answered (possible after
    /// `go_back`) re-enters `Explaining` for it, since answers are locked.
    /// The finishing transition computes the score and returns
    /// [`Advance::Finished`] exactly once per attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotYetAnswered` if the current question has no
    /// recorded answer, or `SessionError::Finished` after the attempt ended.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let current = match self.state {
            QuizState::Answering(i) | QuizState::Explaining(i) => i,
            QuizState::Finished => return Err(SessionError::Finished),
        };
        if self.answers[current].is_none() {
            return Err(SessionError::NotYetAnswered);
        }

        let next = current + 1;
        if next < self.quiz.question_count() {
            self.state = if self.answers[next].is_some() {
                QuizState::Explaining(next)
            } else {
                QuizState::Answering(next)
            };
            return Ok(Advance::Question(next));
        }

        let outcome = self.compute_outcome();
        self.state = QuizState::Finished;
        self.outcome = Some(outcome);
        Ok(Advance::Finished(outcome))
    }

    /// Step back to the previous question for review.
    ///
    /// Never clears a recorded answer; a previously answered question is
    /// re-entered in `Explaining`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AtFirstQuestion` at index 0 and
    /// `SessionError::Finished` once the attempt ended.
    pub fn go_back(&mut self) -> Result<usize, SessionError> {
        let current = match self.state {
            QuizState::Answering(i) | QuizState::Explaining(i) => i,
            QuizState::Finished => return Err(SessionError::Finished),
        };
        if current == 0 {
            return Err(SessionError::AtFirstQuestion);
        }

        let prev = current - 1;
        self.state = if self.answers[prev].is_some() {
            QuizState::Explaining(prev)
        } else {
            QuizState::Answering(prev)
        };
        Ok(prev)
    }

    /// Current percentage score over all questions, answered or not.
    ///
    /// Pure function of the recorded answers; available at any time.
    #[must_use]
    pub fn score(&self) -> u8 {
        self.compute_outcome().score
    }

    /// Discard all answers and return to the first question.
    ///
    /// The resulting state is indistinguishable from a freshly constructed
    /// session over the same quiz; the engine keeps no memory of prior
    /// attempts.
    pub fn reset(&mut self) {
        self.answers.iter_mut().for_each(|a| *a = None);
        self.state = QuizState::Answering(0);
        self.outcome = None;
    }

    fn compute_outcome(&self) -> QuizOutcome {
        let total = self.quiz.question_count();
        let correct = self
            .quiz
            .questions()
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.is_some_and(|option| q.is_correct(option)))
            .count();

        QuizOutcome {
            score: round_percent(correct, total),
            correct,
            total,
        }
    }
}

/// Round `100 * part / total` to the nearest integer, halves up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // f64::round is half-away-from-zero, which is half-up for non-negatives.
    ((part as f64) * 100.0 / (total as f64)).round() as u8
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("lesson_id", &self.quiz.lesson_id())
            .field("questions", &self.quiz.question_count())
            .field("state", &self.state)
            .field("answered", &self.answered_count())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonId, Question, QuestionId};

    /// Quiz with `n` questions, each with four options and correct answer 1.
    fn build_quiz(n: u32) -> QuizDefinition {
        let questions = (1..=n)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Question {id}"),
                    vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    1,
                    "B is the answer.",
                )
                .unwrap()
            })
            .collect();
        QuizDefinition::new(LessonId::new(1), "Lesson", questions).unwrap()
    }

    #[test]
    fn fresh_session_starts_at_first_question() {
        let session = QuizSession::new(build_quiz(3));

        assert_eq!(session.state(), QuizState::Answering(0));
        assert_eq!(session.answers(), &[None, None, None]);
        assert_eq!(session.answered_count(), 0);
        assert!(!session.is_complete());
        assert!(session.outcome().is_none());
    }

    #[test]
    fn submit_moves_to_explaining_and_locks_answer() {
        let mut session = QuizSession::new(build_quiz(3));

        let submitted = session.submit_answer(0, 1).unwrap();
        assert!(submitted.correct);
        assert_eq!(session.state(), QuizState::Explaining(0));

        // Re-answering the same question is rejected with no state change.
        let err = session.submit_answer(0, 2).unwrap_err();
        assert_eq!(err, SessionError::AlreadyAnswered { index: 0 });
        assert_eq!(session.answers()[0], Some(1));
        assert_eq!(session.state(), QuizState::Explaining(0));
    }

    #[test]
    fn submit_rejects_wrong_index_and_out_of_range_option() {
        let mut session = QuizSession::new(build_quiz(3));

        let err = session.submit_answer(1, 0).unwrap_err();
        assert_eq!(
            err,
            SessionError::NotCurrentQuestion {
                submitted: 1,
                current: 0
            }
        );

        // Option 99 on a four-option question.
        let err = session.submit_answer(0, 99).unwrap_err();
        assert_eq!(
            err,
            SessionError::OptionOutOfRange {
                option: 99,
                available: 4
            }
        );
        assert_eq!(session.state(), QuizState::Answering(0));
        assert_eq!(session.answers()[0], None);
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut session = QuizSession::new(build_quiz(2));
        assert_eq!(session.advance().unwrap_err(), SessionError::NotYetAnswered);
        assert_eq!(session.state(), QuizState::Answering(0));
    }

    #[test]
    fn all_correct_scores_100_and_passes() {
        let mut session = QuizSession::new(build_quiz(3));
        for i in 0..3 {
            session.submit_answer(i, 1).unwrap();
            let advance = session.advance().unwrap();
            if i < 2 {
                assert_eq!(advance, Advance::Question(i + 1));
            } else {
                let Advance::Finished(outcome) = advance else {
                    panic!("expected finished, got {advance:?}");
                };
                assert_eq!(outcome.score(), 100);
                assert!(outcome.passed());
            }
        }
        assert!(session.is_complete());
        assert_eq!(session.outcome().unwrap().correct(), 3);
    }

    #[test]
    fn two_of_three_scores_67_and_fails() {
        // round(200/3) = 67, below the 70 threshold.
        let mut session = QuizSession::new(build_quiz(3));
        session.submit_answer(0, 0).unwrap();
        session.advance().unwrap();
        session.submit_answer(1, 1).unwrap();
        session.advance().unwrap();
        session.submit_answer(2, 1).unwrap();

        let Advance::Finished(outcome) = session.advance().unwrap() else {
            panic!("expected finished");
        };
        assert_eq!(outcome.score(), 67);
        assert_eq!(outcome.correct(), 2);
        assert!(!outcome.passed());
    }

    #[test]
    fn go_back_rejected_at_first_question() {
        let mut session = QuizSession::new(build_quiz(3));
        assert_eq!(session.go_back().unwrap_err(), SessionError::AtFirstQuestion);
        assert_eq!(session.state(), QuizState::Answering(0));

        session.submit_answer(0, 1).unwrap();
        assert_eq!(session.go_back().unwrap_err(), SessionError::AtFirstQuestion);
    }

    #[test]
    fn go_back_reenters_explaining_for_answered_questions() {
        let mut session = QuizSession::new(build_quiz(3));
        session.submit_answer(0, 2).unwrap();
        session.advance().unwrap();
        session.submit_answer(1, 1).unwrap();

        assert_eq!(session.go_back().unwrap(), 0);
        assert_eq!(session.state(), QuizState::Explaining(0));
        // The earlier answer stays locked.
        assert_eq!(
            session.submit_answer(0, 1).unwrap_err(),
            SessionError::AlreadyAnswered { index: 0 }
        );

        // Coming forward again re-enters Explaining for the answered question.
        assert_eq!(session.advance().unwrap(), Advance::Question(1));
        assert_eq!(session.state(), QuizState::Explaining(1));
    }

    #[test]
    fn finish_after_review_detour_yields_outcome_once() {
        let mut session = QuizSession::new(build_quiz(2));
        session.submit_answer(0, 1).unwrap();
        session.advance().unwrap();
        session.submit_answer(1, 1).unwrap();

        // Review the first question, then walk forward to the end.
        session.go_back().unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Question(1));

        let Advance::Finished(outcome) = session.advance().unwrap() else {
            panic!("expected finished");
        };
        assert_eq!(outcome.score(), 100);

        // Every operation after Finished is rejected; no second outcome.
        assert_eq!(session.advance().unwrap_err(), SessionError::Finished);
        assert_eq!(session.go_back().unwrap_err(), SessionError::Finished);
        assert_eq!(session.submit_answer(0, 1).unwrap_err(), SessionError::Finished);
    }

    #[test]
    fn single_question_quiz_runs_full_cycle() {
        let mut session = QuizSession::new(build_quiz(1));
        assert_eq!(session.go_back().unwrap_err(), SessionError::AtFirstQuestion);

        session.submit_answer(0, 1).unwrap();
        assert_eq!(session.state(), QuizState::Explaining(0));

        let Advance::Finished(outcome) = session.advance().unwrap() else {
            panic!("expected finished");
        };
        assert_eq!(outcome.score(), 100);
        assert_eq!(outcome.total(), 1);
    }

    #[test]
    fn reset_matches_fresh_session() {
        let mut session = QuizSession::new(build_quiz(3));
        for i in 0..3 {
            session.submit_answer(i, 1).unwrap();
            session.advance().unwrap();
        }
        assert!(session.is_complete());

        session.reset();

        let fresh = QuizSession::new(build_quiz(3));
        assert_eq!(session.state(), fresh.state());
        assert_eq!(session.answers(), fresh.answers());
        assert_eq!(session.outcome(), fresh.outcome());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn score_is_available_mid_attempt() {
        let mut session = QuizSession::new(build_quiz(3));
        assert_eq!(session.score(), 0);

        session.submit_answer(0, 1).unwrap();
        // round(100/3) = 33.
        assert_eq!(session.score(), 33);
    }

    #[test]
    fn round_percent_rounds_halves_up() {
        assert_eq!(round_percent(1, 8), 13); // 12.5
        assert_eq!(round_percent(2, 3), 67); // 66.67
        assert_eq!(round_percent(1, 3), 33); // 33.33
        assert_eq!(round_percent(0, 3), 0);
        assert_eq!(round_percent(3, 3), 100);
        assert_eq!(round_percent(0, 0), 0);
    }
}
