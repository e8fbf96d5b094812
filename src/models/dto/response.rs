use serde::Deserialize;

use crate::models::domain::SessionUser;

/// Backend reply to the credential exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: SessionUser,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_parses_backend_shape() {
        let json = r#"{
            "access_token": "abc.def.ghi",
            "token_type": "bearer",
            "user": {"uid": "u1", "email": "jane@example.com", "full_name": "Jane"}
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "abc.def.ghi");
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.user.full_name, "Jane");
    }

    #[test]
    fn error_body_parses_detail() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"detail": "Invalid token"}"#).unwrap();
        assert_eq!(body.detail, "Invalid token");
    }
}
