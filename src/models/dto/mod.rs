pub mod request;
pub mod response;

pub use request::{
    AnswerSubmission, EvaluateQuizRequest, GenerateQuizRequest, LoginRequest,
    ALLOWED_QUESTION_COUNTS,
};
pub use response::{ApiErrorBody, TokenResponse};
