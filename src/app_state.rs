use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::api::{HttpQuizBackend, QuizBackend};
use crate::auth::{IdentityProvider, RestIdentityProvider, TokenStore};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::services::{DashboardService, QuizFlow, SessionService};
use crate::stores::{QuizSession, SessionStore};

/// Composition root: every store and service is owned here and handed out by
/// reference, no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub token_store: Arc<TokenStore>,
    pub session: Arc<SessionStore>,
    pub quiz_session: Arc<Mutex<QuizSession>>,
    pub backend: Arc<HttpQuizBackend>,
    pub session_service: Arc<SessionService>,
    pub quiz_flow: Arc<QuizFlow>,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        let token_store = Arc::new(TokenStore::open(&config.state_dir)?);
        let session = SessionStore::open(&config.state_dir)?;

        let backend = Arc::new(HttpQuizBackend::new(
            http.clone(),
            &config.api_base_url,
            Arc::clone(&token_store) as Arc<dyn crate::auth::CredentialProvider>,
        ));
        let provider: Arc<dyn IdentityProvider> =
            Arc::new(RestIdentityProvider::new(http, &config));

        let dyn_backend: Arc<dyn QuizBackend> = Arc::clone(&backend) as Arc<dyn QuizBackend>;

        let session_service = Arc::new(SessionService::new(
            provider,
            Arc::clone(&dyn_backend),
            Arc::clone(&token_store),
            Arc::clone(&session),
        ));
        let quiz_flow = Arc::new(QuizFlow::new(Arc::clone(&dyn_backend)));
        let dashboard = Arc::new(DashboardService::new(dyn_backend));

        Ok(Self {
            config: Arc::new(config),
            token_store,
            session,
            quiz_session: Arc::new(Mutex::new(QuizSession::new())),
            backend,
            session_service,
            quiz_flow,
            dashboard,
        })
    }
}
