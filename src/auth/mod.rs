pub mod provider;
pub mod token_store;

pub use provider::{IdentityProvider, ProviderIdentity, RestIdentityProvider};
pub use token_store::TokenStore;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::errors::AppResult;

/// Source of the bearer credential attached to backend calls.
///
/// Callers decide refresh policy through `force_refresh`; providers that hold
/// a static cached token treat it as a hint and return what they have.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn current_token(&self, force_refresh: bool) -> AppResult<Option<SecretString>>;

    /// Drops the locally cached credential. Invoked by the global 401 policy.
    fn clear(&self);
}
