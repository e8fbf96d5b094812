use serde::Serialize;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::Quiz;

/// Question counts the UI offers; the backend accepts nothing else.
pub const ALLOWED_QUESTION_COUNTS: [u8; 4] = [3, 5, 7, 10];

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Identity token must not be empty"))]
    pub id_token: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(length(min = 20, message = "Donor email text is too short to quiz on"))]
    pub donor_email: String,

    #[validate(range(min = 3, max = 10))]
    pub num_questions: u8,
}

impl GenerateQuizRequest {
    pub fn new(donor_email: &str, num_questions: u8) -> AppResult<Self> {
        let request = GenerateQuizRequest {
            donor_email: donor_email.to_string(),
            num_questions,
        };
        request.validate()?;

        if !ALLOWED_QUESTION_COUNTS.contains(&num_questions) {
            return Err(AppError::ValidationError(format!(
                "Question count must be one of {:?}, got {}",
                ALLOWED_QUESTION_COUNTS, num_questions
            )));
        }

        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerSubmission {
    pub question_id: String,
    pub selected_answer: String,
}

/// Uniform evaluate contract: the quiz and the answer list travel together in
/// one JSON body.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateQuizRequest {
    pub quiz: Quiz,
    pub answers: Vec<AnswerSubmission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "Dear supporter, thank you for your generous gift of $50.";

    #[test]
    fn generate_request_accepts_allowed_counts() {
        for count in ALLOWED_QUESTION_COUNTS {
            assert!(GenerateQuizRequest::new(EMAIL, count).is_ok());
        }
    }

    #[test]
    fn generate_request_rejects_counts_outside_whitelist() {
        // In range but not offered by the UI
        let result = GenerateQuizRequest::new(EMAIL, 4);
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        // Out of range entirely
        assert!(GenerateQuizRequest::new(EMAIL, 2).is_err());
        assert!(GenerateQuizRequest::new(EMAIL, 11).is_err());
    }

    #[test]
    fn generate_request_rejects_short_email_text() {
        let result = GenerateQuizRequest::new("too short", 5);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn evaluate_request_serializes_quiz_and_answers() {
        use crate::models::domain::Question;

        let quiz = Quiz::test_quiz("quiz-1", vec![Question::test_question("q1", "A")]);
        let request = EvaluateQuizRequest {
            quiz,
            answers: vec![AnswerSubmission {
                question_id: "q1".to_string(),
                selected_answer: "A".to_string(),
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["quiz"]["quiz_id"], "quiz-1");
        assert_eq!(json["answers"][0]["question_id"], "q1");
        assert_eq!(json["answers"][0]["selected_answer"], "A");
    }
}
