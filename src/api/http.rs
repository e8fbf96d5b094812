use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::api::QuizBackend;
use crate::auth::CredentialProvider;
use crate::errors::{AppError, AppResult};
use crate::models::domain::{ProgressStats, Quiz, QuizHistoryEntry, QuizResult, SessionUser};
use crate::models::dto::{
    ApiErrorBody, EvaluateQuizRequest, GenerateQuizRequest, LoginRequest, TokenResponse,
};

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// reqwest-backed `QuizBackend`. Attaches the current bearer credential to
/// every request and applies the 401 policy in one place: clear the stored
/// credential, fire the sign-in hook, surface `Unauthorized`.
pub struct HttpQuizBackend {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    on_unauthorized: RwLock<Option<UnauthorizedHook>>,
}

impl HttpQuizBackend {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            on_unauthorized: RwLock::new(None),
        }
    }

    /// Registers the view-layer reaction to an authorization failure (the
    /// sign-in redirect in the original client). At most one hook is active.
    pub fn set_unauthorized_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        let mut slot = self
            .on_unauthorized
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(Box::new(hook));
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let builder = self.http.get(self.url(path));
        self.dispatch(builder, path).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let builder = self.http.post(self.url(path)).json(body);
        self.dispatch(builder, path).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        path: &str,
    ) -> AppResult<T> {
        let request_id = Uuid::new_v4();
        let mut builder = builder.header("X-Request-Id", request_id.to_string());

        if let Some(token) = self.credentials.current_token(false).await? {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = builder.send().await?;
        let status = response.status();
        log::debug!("[{}] {} -> {}", request_id, path, status);

        if status == StatusCode::UNAUTHORIZED {
            self.credentials.clear();
            if let Some(hook) = self
                .on_unauthorized
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .as_ref()
            {
                hook();
            }
            return Err(AppError::Unauthorized(
                "Session expired, please sign in again".to_string(),
            ));
        }

        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.detail)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(AppError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl QuizBackend for HttpQuizBackend {
    async fn login(&self, request: &LoginRequest) -> AppResult<TokenResponse> {
        self.post_json("/api/auth/login", request).await
    }

    async fn current_user(&self) -> AppResult<SessionUser> {
        self.get_json("/api/auth/me").await
    }

    async fn generate_quiz(&self, request: &GenerateQuizRequest) -> AppResult<Quiz> {
        self.post_json("/api/quiz/generate", request).await
    }

    async fn evaluate_quiz(&self, request: &EvaluateQuizRequest) -> AppResult<QuizResult> {
        self.post_json("/api/quiz/evaluate", request).await
    }

    async fn history(&self) -> AppResult<Vec<QuizHistoryEntry>> {
        self.get_json("/api/analytics/history").await
    }

    async fn progress(&self) -> AppResult<ProgressStats> {
        self.get_json("/api/analytics/progress").await
    }
}
