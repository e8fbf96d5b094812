use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// What the identity provider knows about a signed-in user, plus the
/// credential the backend exchange wants.
#[derive(Clone, Debug)]
pub struct ProviderIdentity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub id_token: SecretString,
    pub refresh_token: String,
}

/// The external identity provider: issues and refreshes the credential the
/// backend exchange is built on. Sign-out is best-effort on the remote side;
/// local state is always cleared regardless.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<ProviderIdentity>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AppResult<ProviderIdentity>;

    async fn refresh(&self, refresh_token: &str) -> AppResult<ProviderIdentity>;

    async fn sign_out(&self) -> AppResult<()>;
}

/// REST adapter for the hosted identity service (Identity Toolkit wire
/// shapes).
pub struct RestIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct IdentityErrorBody {
    error: IdentityErrorDetail,
}

#[derive(Deserialize)]
struct IdentityErrorDetail {
    message: String,
}

impl RestIdentityProvider {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.identity_base_url.trim_end_matches('/').to_string(),
            api_key: config.identity_api_key.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}?key={}",
            self.base_url,
            action,
            self.api_key.expose_secret()
        )
    }

    async fn call<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self
            .http
            .post(self.endpoint(action))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::IdentityError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<IdentityErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("identity provider returned {}", status));
            return Err(AppError::IdentityError(message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::IdentityError(format!("malformed provider response: {}", e)))
    }
}

impl From<IdentityResponse> for ProviderIdentity {
    fn from(response: IdentityResponse) -> Self {
        ProviderIdentity {
            uid: response.local_id,
            email: response.email,
            display_name: response.display_name.filter(|n| !n.trim().is_empty()),
            id_token: SecretString::from(response.id_token),
            refresh_token: response.refresh_token,
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<ProviderIdentity> {
        let response: IdentityResponse = self
            .call(
                "accounts:signInWithPassword",
                &PasswordSignInRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        Ok(response.into())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AppResult<ProviderIdentity> {
        let response: IdentityResponse = self
            .call(
                "accounts:signUp",
                &SignUpRequest {
                    email,
                    password,
                    display_name,
                    return_secure_token: true,
                },
            )
            .await?;

        let mut identity = ProviderIdentity::from(response);
        // The sign-up response omits the profile name it just stored.
        if identity.display_name.is_none() && !display_name.trim().is_empty() {
            identity.display_name = Some(display_name.trim().to_string());
        }
        Ok(identity)
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<ProviderIdentity> {
        let response: RefreshResponse = self
            .call(
                "token",
                &RefreshRequest {
                    grant_type: "refresh_token",
                    refresh_token,
                },
            )
            .await?;

        Ok(ProviderIdentity {
            uid: response.user_id,
            email: String::new(),
            display_name: None,
            id_token: SecretString::from(response.id_token),
            refresh_token: response.refresh_token,
        })
    }

    async fn sign_out(&self) -> AppResult<()> {
        // The provider keeps no server-side session for password sign-in;
        // dropping the local credential is the whole operation.
        log::debug!("identity provider sign-out requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_response_maps_to_provider_identity() {
        let json = r#"{
            "localId": "u1",
            "email": "jane@example.com",
            "displayName": "Jane Doe",
            "idToken": "id-token",
            "refreshToken": "refresh-token"
        }"#;

        let response: IdentityResponse = serde_json::from_str(json).unwrap();
        let identity = ProviderIdentity::from(response);

        assert_eq!(identity.uid, "u1");
        assert_eq!(identity.display_name.as_deref(), Some("Jane Doe"));
        assert_eq!(identity.id_token.expose_secret(), "id-token");
    }

    #[test]
    fn blank_display_name_becomes_none() {
        let json = r#"{
            "localId": "u1",
            "email": "jane@example.com",
            "displayName": "  ",
            "idToken": "t",
            "refreshToken": "r"
        }"#;

        let response: IdentityResponse = serde_json::from_str(json).unwrap();
        let identity = ProviderIdentity::from(response);
        assert!(identity.display_name.is_none());
    }

    #[test]
    fn missing_display_name_is_accepted() {
        let json = r#"{
            "localId": "u1",
            "email": "jane@example.com",
            "idToken": "t",
            "refreshToken": "r"
        }"#;

        let response: IdentityResponse = serde_json::from_str(json).unwrap();
        assert!(response.display_name.is_none());
    }
}
