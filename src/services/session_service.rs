use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::api::QuizBackend;
use crate::auth::{IdentityProvider, ProviderIdentity, TokenStore};
use crate::errors::{AppError, AppResult};
use crate::models::domain::SessionUser;
use crate::models::dto::LoginRequest;
use crate::stores::{AuthState, SessionStore};

/// Orchestrates the session identity lifecycle: the one-time startup
/// resolution, sign-in/sign-up via the identity provider plus backend
/// exchange, explicit refresh, and best-effort sign-out.
pub struct SessionService {
    provider: Arc<dyn IdentityProvider>,
    backend: Arc<dyn QuizBackend>,
    token_store: Arc<TokenStore>,
    session: Arc<SessionStore>,
}

impl SessionService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        backend: Arc<dyn QuizBackend>,
        token_store: Arc<TokenStore>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            provider,
            backend,
            token_store,
            session,
        }
    }

    /// Resolves the session exactly once at startup: a persisted bearer
    /// credential is confirmed against the backend; anything else lands in
    /// `Anonymous`. Subsequent calls return the already-resolved state.
    pub async fn resolve_startup(&self) -> AuthState {
        if self.session.is_resolved() {
            return self.session.state();
        }

        if !self.token_store.is_present() {
            self.session.set_anonymous();
            return self.session.state();
        }

        match self.backend.current_user().await {
            Ok(user) => self.session.set_authenticated(user),
            Err(err) => {
                log::debug!("Startup identity confirmation failed: {}", err);
                self.session.set_anonymous();
            }
        }
        self.session.state()
    }

    /// Signs in with the identity provider and exchanges its credential for a
    /// backend session credential. A failure leaves the session untouched
    /// beyond remaining anonymous.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<SessionUser> {
        let identity = self.provider.sign_in(email, password).await?;
        self.exchange(identity).await
    }

    /// Creates the account at the identity provider, then performs the same
    /// exchange as `login`.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> AppResult<SessionUser> {
        let identity = self.provider.sign_up(email, password, full_name).await?;
        self.exchange(identity).await
    }

    /// Explicitly refreshes the provider credential and repeats the backend
    /// exchange. Callers invoke this deliberately; the HTTP client never
    /// refreshes behind their back.
    pub async fn refresh_credential(&self) -> AppResult<()> {
        let refresh_token = self.token_store.refresh_token().ok_or_else(|| {
            AppError::Unauthorized("No refresh credential held, sign in again".to_string())
        })?;

        let identity = self.provider.refresh(&refresh_token).await?;
        self.exchange(identity).await?;
        Ok(())
    }

    /// Best-effort provider sign-out followed by an unconditional local
    /// clear: whatever the provider says, this client ends up anonymous.
    pub async fn logout(&self) {
        if let Err(err) = self.provider.sign_out().await {
            log::warn!("Provider sign-out failed, clearing local state anyway: {}", err);
        }

        self.token_store.clear_all();
        self.session.set_anonymous();
    }

    async fn exchange(&self, identity: ProviderIdentity) -> AppResult<SessionUser> {
        let request = LoginRequest {
            id_token: identity.id_token.expose_secret().to_string(),
        };
        let response = self.backend.login(&request).await?;

        self.token_store.set(&response.access_token)?;
        self.token_store.set_refresh(&identity.refresh_token)?;

        // The backend's user record is authoritative; the provider profile
        // only fills in a missing display name.
        let mut user = response.user;
        if user.full_name.trim().is_empty() {
            user = SessionUser::from_profile(
                &user.uid,
                &user.email,
                identity.display_name.as_deref(),
            );
        }

        self.session.set_authenticated(user.clone());
        Ok(user)
    }
}
