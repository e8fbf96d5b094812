use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::auth::CredentialProvider;
use crate::errors::{AppError, AppResult};

const TOKEN_FILE: &str = "token";
const REFRESH_FILE: &str = "refresh_token";

/// File-backed holder for the backend bearer credential and the provider
/// refresh credential. Both survive restarts; the in-memory copies are the
/// ones consulted on every request.
pub struct TokenStore {
    path: PathBuf,
    refresh_path: PathBuf,
    cached: RwLock<Option<SecretString>>,
    cached_refresh: RwLock<Option<String>>,
}

fn read_persisted(path: &std::path::Path) -> AppResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) if !raw.trim().is_empty() => Ok(Some(raw.trim().to_string())),
        Ok(_) => Ok(None),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(AppError::StorageError(err.to_string())),
    }
}

fn remove_persisted(path: &std::path::Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove persisted credential: {}", err);
        }
    }
}

impl TokenStore {
    /// Opens the store rooted at `state_dir`, loading any persisted tokens.
    pub fn open(state_dir: &std::path::Path) -> AppResult<Self> {
        fs::create_dir_all(state_dir)?;
        let path = state_dir.join(TOKEN_FILE);
        let refresh_path = state_dir.join(REFRESH_FILE);

        let cached = read_persisted(&path)?.map(SecretString::from);
        let cached_refresh = read_persisted(&refresh_path)?;

        Ok(Self {
            path,
            refresh_path,
            cached: RwLock::new(cached),
            cached_refresh: RwLock::new(cached_refresh),
        })
    }

    pub fn set(&self, token: &str) -> AppResult<()> {
        fs::write(&self.path, token)?;
        let mut cached = self
            .cached
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *cached = Some(SecretString::from(token.to_string()));
        Ok(())
    }

    pub fn current(&self) -> Option<SecretString> {
        self.cached
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn is_present(&self) -> bool {
        self.current().is_some()
    }

    pub fn set_refresh(&self, token: &str) -> AppResult<()> {
        fs::write(&self.refresh_path, token)?;
        let mut cached = self
            .cached_refresh
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *cached = Some(token.to_string());
        Ok(())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.cached_refresh
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Drops both credentials, memory and disk. Sign-out uses this; the 401
    /// policy calls `clear` instead so the refresh credential stays usable.
    pub fn clear_all(&self) {
        self.clear();
        let mut cached = self
            .cached_refresh
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *cached = None;
        remove_persisted(&self.refresh_path);
    }
}

#[async_trait]
impl CredentialProvider for TokenStore {
    async fn current_token(&self, _force_refresh: bool) -> AppResult<Option<SecretString>> {
        // A static store has nothing to refresh; it hands out what it holds.
        Ok(self.current())
    }

    fn clear(&self) {
        let mut cached = self
            .cached
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *cached = None;
        remove_persisted(&self.path);
    }
}
