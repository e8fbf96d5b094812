use std::collections::BTreeMap;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{Quiz, QuizResult};
use crate::models::dto::AnswerSubmission;

/// Where the active quiz attempt stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No quiz loaded.
    Idle,
    /// Quiz loaded, answering in progress.
    Composing,
    /// Evaluation request in flight; answers frozen.
    Submitting,
    /// Result available; answers locked for review.
    Reviewed,
}

/// The in-progress quiz attempt. Pure local state: the only mutations are the
/// explicit transitions below, and none of them touch the network.
///
/// Invariant: the answer map's keys are always a subset of the loaded quiz's
/// question ids, enforced at `select_answer`.
pub struct QuizSession {
    phase: Phase,
    quiz: Option<Quiz>,
    answers: BTreeMap<String, String>,
    result: Option<QuizResult>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            quiz: None,
            answers: BTreeMap::new(),
            result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn unanswered_count(&self) -> usize {
        match &self.quiz {
            Some(quiz) => quiz
                .questions
                .iter()
                .filter(|q| !self.answers.contains_key(&q.id))
                .count(),
            None => 0,
        }
    }

    /// Installs a freshly generated quiz. Any prior quiz, answers and result
    /// are discarded. Rejected while a submission is in flight.
    pub fn load_quiz(&mut self, quiz: Quiz) -> AppResult<()> {
        if self.phase == Phase::Submitting {
            return Err(AppError::InvalidTransition(
                "cannot load a quiz while a submission is in flight".to_string(),
            ));
        }

        self.quiz = Some(quiz);
        self.answers.clear();
        self.result = None;
        self.phase = Phase::Composing;
        Ok(())
    }

    /// Records the selected option label for one question, overwriting any
    /// prior selection for that question and touching no other entry.
    pub fn select_answer(&mut self, question_id: &str, label: &str) -> AppResult<()> {
        match self.phase {
            Phase::Composing => {}
            Phase::Reviewed => {
                return Err(AppError::InvalidTransition(
                    "answers are locked after submission".to_string(),
                ))
            }
            _ => {
                return Err(AppError::InvalidTransition(
                    "no quiz is open for answering".to_string(),
                ))
            }
        }

        let quiz = self
            .quiz
            .as_ref()
            .ok_or_else(|| AppError::InternalError("composing without a quiz".to_string()))?;
        if !quiz.contains_question(question_id) {
            return Err(AppError::ValidationError(format!(
                "Unknown question id '{}'",
                question_id
            )));
        }

        self.answers
            .insert(question_id.to_string(), label.to_string());
        Ok(())
    }

    /// Starts a submission. Accepted only when every question is answered;
    /// otherwise the rejection carries the exact unanswered count. Re-entrant
    /// submission is rejected, not queued.
    pub fn begin_submission(&mut self) -> AppResult<Vec<AnswerSubmission>> {
        match self.phase {
            Phase::Composing => {}
            Phase::Submitting => {
                return Err(AppError::InvalidTransition(
                    "a submission is already in flight".to_string(),
                ))
            }
            _ => {
                return Err(AppError::InvalidTransition(
                    "nothing to submit".to_string(),
                ))
            }
        }

        let remaining = self.unanswered_count();
        if remaining > 0 {
            return Err(AppError::IncompleteAnswers { remaining });
        }

        let quiz = self
            .quiz
            .as_ref()
            .ok_or_else(|| AppError::InternalError("composing without a quiz".to_string()))?;

        // Answers travel in question order; the map's own order is irrelevant.
        let submissions = quiz
            .questions
            .iter()
            .map(|q| AnswerSubmission {
                question_id: q.id.clone(),
                selected_answer: self.answers[&q.id].clone(),
            })
            .collect();

        self.phase = Phase::Submitting;
        Ok(submissions)
    }

    /// Stores the evaluation result and locks the attempt for review.
    pub fn complete_submission(&mut self, result: QuizResult) -> AppResult<()> {
        if self.phase != Phase::Submitting {
            return Err(AppError::InvalidTransition(
                "no submission in flight".to_string(),
            ));
        }
        self.result = Some(result);
        self.phase = Phase::Reviewed;
        Ok(())
    }

    /// Reverts a failed submission; answers are untouched so the learner can
    /// resubmit.
    pub fn fail_submission(&mut self) -> AppResult<()> {
        if self.phase != Phase::Submitting {
            return Err(AppError::InvalidTransition(
                "no submission in flight".to_string(),
            ));
        }
        self.phase = Phase::Composing;
        Ok(())
    }

    /// Clears quiz, answers and result. The session is indistinguishable from
    /// a fresh one afterwards.
    pub fn retake(&mut self) -> AppResult<()> {
        if self.phase == Phase::Submitting {
            return Err(AppError::InvalidTransition(
                "cannot retake while a submission is in flight".to_string(),
            ));
        }
        self.quiz = None;
        self.answers.clear();
        self.result = None;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Review-mode correctness for one question, recomputed on demand by
    /// comparing the stored answer with the question's correct label. `None`
    /// outside review or for unknown question ids.
    pub fn is_correct(&self, question_id: &str) -> Option<bool> {
        if self.phase != Phase::Reviewed {
            return None;
        }
        let question = self.quiz.as_ref()?.question(question_id)?;
        let selected = self.answers.get(question_id)?;
        Some(*selected == question.correct_answer)
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::Question;

    fn two_question_quiz() -> Quiz {
        Quiz::test_quiz(
            "quiz-1",
            vec![
                Question::test_question("q1", "B"),
                Question::test_question("q2", "A"),
            ],
        )
    }

    fn composing_session() -> QuizSession {
        let mut session = QuizSession::new();
        session.load_quiz(two_question_quiz()).unwrap();
        session
    }

    #[test]
    fn fresh_session_is_idle_and_empty() {
        let session = QuizSession::new();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.quiz().is_none());
        assert!(session.result().is_none());
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn load_quiz_enters_composing_with_empty_answers() {
        let session = composing_session();
        assert_eq!(session.phase(), Phase::Composing);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.unanswered_count(), 2);
    }

    #[test]
    fn select_answer_only_touches_its_own_question() {
        let mut session = composing_session();
        session.select_answer("q1", "A").unwrap();
        session.select_answer("q2", "C").unwrap();
        session.select_answer("q1", "B").unwrap(); // reselect overwrites

        assert_eq!(session.answer("q1"), Some("B"));
        assert_eq!(session.answer("q2"), Some("C"));
    }

    #[test]
    fn select_answer_rejects_unknown_question() {
        let mut session = composing_session();
        let result = session.select_answer("q9", "A");
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn select_answer_rejected_when_idle() {
        let mut session = QuizSession::new();
        assert!(session.select_answer("q1", "A").is_err());
    }

    #[test]
    fn submission_rejected_with_exact_unanswered_count() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();

        match session.begin_submission() {
            Err(AppError::IncompleteAnswers { remaining }) => assert_eq!(remaining, 1),
            other => panic!("expected IncompleteAnswers, got {:?}", other.map(|_| ())),
        }
        // Rejection leaves the session composing.
        assert_eq!(session.phase(), Phase::Composing);
    }

    #[test]
    fn submission_accepted_when_all_answered() {
        let mut session = composing_session();
        session.select_answer("q2", "C").unwrap();
        session.select_answer("q1", "B").unwrap();

        let answers = session.begin_submission().unwrap();
        assert_eq!(session.phase(), Phase::Submitting);

        // Question order, regardless of selection order.
        assert_eq!(answers[0].question_id, "q1");
        assert_eq!(answers[0].selected_answer, "B");
        assert_eq!(answers[1].question_id, "q2");
        assert_eq!(answers[1].selected_answer, "C");
    }

    #[test]
    fn reentrant_submission_is_rejected_not_queued() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        session.select_answer("q2", "A").unwrap();
        session.begin_submission().unwrap();

        let second = session.begin_submission();
        assert!(matches!(second, Err(AppError::InvalidTransition(_))));
        assert_eq!(session.phase(), Phase::Submitting);
    }

    #[test]
    fn failed_submission_reverts_to_composing_with_answers_intact() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        session.select_answer("q2", "A").unwrap();
        session.begin_submission().unwrap();

        session.fail_submission().unwrap();
        assert_eq!(session.phase(), Phase::Composing);
        assert_eq!(session.answer("q1"), Some("B"));
        assert_eq!(session.answer("q2"), Some("A"));

        // Resubmission is allowed.
        assert!(session.begin_submission().is_ok());
    }

    #[test]
    fn completed_submission_locks_answers_for_review() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        session.select_answer("q2", "C").unwrap();
        session.begin_submission().unwrap();
        session
            .complete_submission(QuizResult::test_result("quiz-1", 50.0, 2, 1))
            .unwrap();

        assert_eq!(session.phase(), Phase::Reviewed);
        assert!(session.result().is_some());
        assert!(matches!(
            session.select_answer("q1", "A"),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn correctness_is_derived_from_stored_answers() {
        // Q1 correct="B" answered "B"; Q2 correct="A" answered "C".
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        session.select_answer("q2", "C").unwrap();
        session.begin_submission().unwrap();
        session
            .complete_submission(QuizResult::test_result("quiz-1", 50.0, 2, 1))
            .unwrap();

        assert_eq!(session.is_correct("q1"), Some(true));
        assert_eq!(session.is_correct("q2"), Some(false));
        assert_eq!(session.is_correct("q9"), None);
    }

    #[test]
    fn correctness_is_unavailable_outside_review() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        assert_eq!(session.is_correct("q1"), None);
    }

    #[test]
    fn loading_a_new_quiz_resets_answers_and_result() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        session.select_answer("q2", "A").unwrap();
        session.begin_submission().unwrap();
        session
            .complete_submission(QuizResult::test_result("quiz-1", 100.0, 2, 2))
            .unwrap();

        let next = Quiz::test_quiz("quiz-2", vec![Question::test_question("q5", "D")]);
        session.load_quiz(next).unwrap();

        assert_eq!(session.phase(), Phase::Composing);
        assert_eq!(session.quiz().unwrap().quiz_id, "quiz-2");
        assert_eq!(session.answered_count(), 0);
        assert!(session.result().is_none());
    }

    #[test]
    fn load_quiz_rejected_while_submitting() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        session.select_answer("q2", "A").unwrap();
        session.begin_submission().unwrap();

        let result = session.load_quiz(two_question_quiz());
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn retake_is_equivalent_to_a_fresh_session() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        session.select_answer("q2", "A").unwrap();
        session.begin_submission().unwrap();
        session
            .complete_submission(QuizResult::test_result("quiz-1", 100.0, 2, 2))
            .unwrap();

        session.retake().unwrap();

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.quiz().is_none());
        assert!(session.result().is_none());
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn retake_rejected_while_submitting() {
        let mut session = composing_session();
        session.select_answer("q1", "B").unwrap();
        session.select_answer("q2", "A").unwrap();
        session.begin_submission().unwrap();

        assert!(session.retake().is_err());
    }
}
