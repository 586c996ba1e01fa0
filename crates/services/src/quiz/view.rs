use lesson_core::session::{QuizSession, QuizState};

/// Presentation-agnostic snapshot of a quiz session.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The correct option is only revealed once the answer is locked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizView {
    Question(QuestionView),
    Explanation(ExplanationView),
    Result(ResultView),
}

/// A question awaiting an answer. Does not expose the correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub can_go_back: bool,
}

/// The explanation shown after an answer is locked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationView {
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub chosen_option: usize,
    pub correct_option: usize,
    pub correct: bool,
    pub explanation: String,
    pub can_go_back: bool,
    pub is_last: bool,
}

/// Per-question line on the result screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub index: usize,
    pub prompt: String,
    pub chosen_option: Option<usize>,
    pub correct_option: usize,
    pub correct: bool,
}

/// The finished-quiz screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub score: u8,
    pub correct: usize,
    pub total: usize,
    pub passed: bool,
    pub questions: Vec<QuestionResult>,
}

/// Position within a running quiz, for progress indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// Index of the question in focus, `None` once finished.
    pub current: Option<usize>,
    pub answered: usize,
    pub total: usize,
}

impl QuizProgress {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        Self {
            current: session.current_index(),
            answered: session.answered_count(),
            total: session.quiz().question_count(),
        }
    }
}

impl QuizView {
    /// Project the session's current state into a view.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        let quiz = session.quiz();
        let total = quiz.question_count();

        match session.state() {
            QuizState::Answering(index) => {
                // The state machine guarantees the index is in range.
                let question = &quiz.questions()[index];
                QuizView::Question(QuestionView {
                    index,
                    total,
                    prompt: question.prompt().to_string(),
                    options: question.options().to_vec(),
                    can_go_back: index > 0,
                })
            }
            QuizState::Explaining(index) => {
                let question = &quiz.questions()[index];
                let chosen_option = session.answers()[index].unwrap_or_default();
                QuizView::Explanation(ExplanationView {
                    index,
                    total,
                    prompt: question.prompt().to_string(),
                    options: question.options().to_vec(),
                    chosen_option,
                    correct_option: question.correct_option(),
                    correct: question.is_correct(chosen_option),
                    explanation: question.explanation().to_string(),
                    can_go_back: index > 0,
                    is_last: index + 1 == total,
                })
            }
            QuizState::Finished => {
                let questions = quiz
                    .questions()
                    .iter()
                    .zip(session.answers())
                    .enumerate()
                    .map(|(index, (question, answer))| QuestionResult {
                        index,
                        prompt: question.prompt().to_string(),
                        chosen_option: *answer,
                        correct_option: question.correct_option(),
                        correct: answer.is_some_and(|option| question.is_correct(option)),
                    })
                    .collect();

                let score = session.score();
                let correct = session
                    .outcome()
                    .map_or(0, |outcome| outcome.correct());
                QuizView::Result(ResultView {
                    score,
                    correct,
                    total,
                    passed: session.outcome().is_some_and(|outcome| outcome.passed()),
                    questions,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{LessonId, Question, QuestionId, QuizDefinition};

    fn build_session() -> QuizSession {
        let questions = vec![
            Question::new(
                QuestionId::new(1),
                "First?",
                vec!["no".into(), "yes".into()],
                1,
                "Yes it is.",
            )
            .unwrap(),
            Question::new(
                QuestionId::new(2),
                "Second?",
                vec!["a".into(), "b".into(), "c".into()],
                2,
                "C.",
            )
            .unwrap(),
        ];
        QuizSession::new(QuizDefinition::new(LessonId::new(1), "Lesson", questions).unwrap())
    }

    #[test]
    fn progress_tracks_position_and_answered_count() {
        let mut session = build_session();
        let progress = QuizProgress::from_session(&session);
        assert_eq!(progress.current, Some(0));
        assert_eq!(progress.answered, 0);
        assert_eq!(progress.total, 2);

        session.submit_answer(0, 1).unwrap();
        session.advance().unwrap();
        let progress = QuizProgress::from_session(&session);
        assert_eq!(progress.current, Some(1));
        assert_eq!(progress.answered, 1);
    }

    #[test]
    fn question_view_hides_the_correct_option() {
        let session = build_session();
        let QuizView::Question(view) = QuizView::from_session(&session) else {
            panic!("expected question view");
        };

        assert_eq!(view.index, 0);
        assert_eq!(view.total, 2);
        assert_eq!(view.options, vec!["no".to_string(), "yes".to_string()]);
        assert!(!view.can_go_back);
    }

    #[test]
    fn explanation_view_reveals_correctness() {
        let mut session = build_session();
        session.submit_answer(0, 0).unwrap();

        let QuizView::Explanation(view) = QuizView::from_session(&session) else {
            panic!("expected explanation view");
        };
        assert_eq!(view.chosen_option, 0);
        assert_eq!(view.correct_option, 1);
        assert!(!view.correct);
        assert_eq!(view.explanation, "Yes it is.");
        assert!(!view.is_last);
    }

    #[test]
    fn result_view_summarizes_the_attempt() {
        let mut session = build_session();
        session.submit_answer(0, 1).unwrap();
        session.advance().unwrap();
        session.submit_answer(1, 0).unwrap();
        session.advance().unwrap();

        let QuizView::Result(view) = QuizView::from_session(&session) else {
            panic!("expected result view");
        };
        assert_eq!(view.score, 50);
        assert_eq!(view.correct, 1);
        assert_eq!(view.total, 2);
        assert!(!view.passed);
        assert_eq!(view.questions.len(), 2);
        assert!(view.questions[0].correct);
        assert_eq!(view.questions[1].chosen_option, Some(0));
    }
}
