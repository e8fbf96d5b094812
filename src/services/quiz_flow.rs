use std::sync::Arc;

use crate::api::QuizBackend;
use crate::errors::{AppError, AppResult};
use crate::models::domain::QuizResult;
use crate::models::dto::{EvaluateQuizRequest, GenerateQuizRequest};
use crate::stores::{Phase, QuizSession};

/// Drives the quiz session through its two network-bearing transitions:
/// generation (Idle → Composing) and submission (Composing → Submitting →
/// Reviewed/Composing). Everything else is a pure session update the caller
/// performs directly on the store.
pub struct QuizFlow {
    backend: Arc<dyn QuizBackend>,
}

impl QuizFlow {
    pub fn new(backend: Arc<dyn QuizBackend>) -> Self {
        Self { backend }
    }

    /// Requests a quiz for the donor email text and installs it in the
    /// session. Validation happens before any network call.
    pub async fn generate(
        &self,
        session: &mut QuizSession,
        donor_email: &str,
        num_questions: u8,
    ) -> AppResult<()> {
        let request = GenerateQuizRequest::new(donor_email, num_questions)?;

        if session.phase() == Phase::Submitting {
            return Err(AppError::InvalidTransition(
                "cannot start a new quiz while a submission is in flight".to_string(),
            ));
        }

        let quiz = self.backend.generate_quiz(&request).await?;
        log::info!(
            "Generated quiz {} with {} questions",
            quiz.quiz_id,
            quiz.question_count()
        );
        session.load_quiz(quiz)
    }

    /// Submits the completed answer set for evaluation. On failure the
    /// session reverts to composing with the answers intact; incomplete
    /// answer sets are rejected before any call is made.
    pub async fn submit(&self, session: &mut QuizSession) -> AppResult<QuizResult> {
        let answers = session.begin_submission()?;
        let quiz = session
            .quiz()
            .cloned()
            .ok_or_else(|| AppError::InternalError("submitting without a quiz".to_string()))?;

        let request = EvaluateQuizRequest { quiz, answers };
        match self.backend.evaluate_quiz(&request).await {
            Ok(result) => {
                session.complete_submission(result.clone())?;
                Ok(result)
            }
            Err(err) => {
                session.fail_submission()?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockQuizBackend;
    use crate::models::domain::{Question, Quiz};

    const EMAIL: &str = "Dear supporter, thank you for your generous gift of $50.";

    fn one_question_quiz() -> Quiz {
        Quiz::test_quiz("quiz-1", vec![Question::test_question("q1", "B")])
    }

    #[tokio::test]
    async fn generate_loads_the_quiz_into_the_session() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_generate_quiz()
            .returning(|_| Ok(one_question_quiz()));

        let flow = QuizFlow::new(Arc::new(backend));
        let mut session = QuizSession::new();

        flow.generate(&mut session, EMAIL, 5).await.unwrap();

        assert_eq!(session.phase(), Phase::Composing);
        assert_eq!(session.quiz().unwrap().quiz_id, "quiz-1");
    }

    #[tokio::test]
    async fn generate_rejects_invalid_count_before_any_call() {
        let mut backend = MockQuizBackend::new();
        backend.expect_generate_quiz().never();

        let flow = QuizFlow::new(Arc::new(backend));
        let mut session = QuizSession::new();

        let result = flow.generate(&mut session, EMAIL, 4).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn submit_rejects_incomplete_answers_before_any_call() {
        let mut backend = MockQuizBackend::new();
        backend.expect_evaluate_quiz().never();

        let flow = QuizFlow::new(Arc::new(backend));
        let mut session = QuizSession::new();
        session.load_quiz(one_question_quiz()).unwrap();

        let result = flow.submit(&mut session).await;
        assert!(matches!(
            result,
            Err(AppError::IncompleteAnswers { remaining: 1 })
        ));
    }

    #[tokio::test]
    async fn successful_submit_moves_to_reviewed() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_generate_quiz()
            .returning(|_| Ok(one_question_quiz()));
        backend
            .expect_evaluate_quiz()
            .returning(|_| Ok(QuizResult::test_result("quiz-1", 100.0, 1, 1)));

        let flow = QuizFlow::new(Arc::new(backend));
        let mut session = QuizSession::new();
        flow.generate(&mut session, EMAIL, 5).await.unwrap();
        session.select_answer("q1", "B").unwrap();

        let result = flow.submit(&mut session).await.unwrap();

        assert_eq!(result.score, 100.0);
        assert_eq!(session.phase(), Phase::Reviewed);
        assert_eq!(session.is_correct("q1"), Some(true));
    }

    #[tokio::test]
    async fn failed_submit_reverts_to_composing() {
        let mut backend = MockQuizBackend::new();
        backend.expect_evaluate_quiz().returning(|_| {
            Err(AppError::ApiError {
                status: 500,
                message: "evaluation failed".to_string(),
            })
        });

        let flow = QuizFlow::new(Arc::new(backend));
        let mut session = QuizSession::new();
        session.load_quiz(one_question_quiz()).unwrap();
        session.select_answer("q1", "B").unwrap();

        let result = flow.submit(&mut session).await;

        assert!(matches!(result, Err(AppError::ApiError { .. })));
        assert_eq!(session.phase(), Phase::Composing);
        assert_eq!(session.answer("q1"), Some("B"));
    }

    #[tokio::test]
    async fn evaluate_request_carries_quiz_and_ordered_answers() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_evaluate_quiz()
            .withf(|request| {
                request.quiz.quiz_id == "quiz-1"
                    && request.answers.len() == 1
                    && request.answers[0].question_id == "q1"
                    && request.answers[0].selected_answer == "C"
            })
            .returning(|_| Ok(QuizResult::test_result("quiz-1", 0.0, 1, 0)));

        let flow = QuizFlow::new(Arc::new(backend));
        let mut session = QuizSession::new();
        session.load_quiz(one_question_quiz()).unwrap();
        session.select_answer("q1", "C").unwrap();

        flow.submit(&mut session).await.unwrap();
    }
}
