pub mod http;

pub use http::HttpQuizBackend;

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::domain::{ProgressStats, Quiz, QuizHistoryEntry, QuizResult, SessionUser};
use crate::models::dto::{EvaluateQuizRequest, GenerateQuizRequest, LoginRequest, TokenResponse};

/// The remote quiz service. Everything the client cannot compute locally
/// crosses this boundary; callers own all failure handling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Exchanges an identity-provider credential for a backend session
    /// credential.
    async fn login(&self, request: &LoginRequest) -> AppResult<TokenResponse>;

    async fn current_user(&self) -> AppResult<SessionUser>;

    async fn generate_quiz(&self, request: &GenerateQuizRequest) -> AppResult<Quiz>;

    async fn evaluate_quiz(&self, request: &EvaluateQuizRequest) -> AppResult<QuizResult>;

    async fn history(&self) -> AppResult<Vec<QuizHistoryEntry>>;

    async fn progress(&self) -> AppResult<ProgressStats>;
}
