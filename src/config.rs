use std::env;
use std::path::PathBuf;

use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub identity_base_url: String,
    pub identity_api_key: SecretString,
    pub state_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub default_num_questions: u8,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("QUIZBOT_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            identity_base_url: env::var("QUIZBOT_IDENTITY_BASE_URL")
                .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string()),
            identity_api_key: SecretString::from(
                env::var("QUIZBOT_IDENTITY_API_KEY").unwrap_or_else(|_| "dev_api_key".to_string()),
            ),
            state_dir: env::var("QUIZBOT_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_state_dir()),
            request_timeout_secs: env::var("QUIZBOT_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            default_num_questions: env::var("QUIZBOT_DEFAULT_NUM_QUESTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            identity_base_url: "http://localhost:9099".to_string(),
            identity_api_key: SecretString::from("test_api_key".to_string()),
            state_dir: std::env::temp_dir().join("quizbot-client-test"),
            request_timeout_secs: 5,
            default_num_questions: 5,
        }
    }
}

fn default_state_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".quizbot")
}
