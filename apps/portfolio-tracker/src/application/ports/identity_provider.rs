//! Identity Provider Port (Driven Port)
//!
//! Interface for the external auth provider: identity-change
//! notifications, anonymous-identity acquisition, and optional one-shot
//! token exchange.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::session::Identity;

/// Identity provider error.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The provider rejected the request.
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("identity provider unreachable: {0}")]
    Unreachable(String),

    /// The one-shot credential token was not accepted.
    #[error("one-shot token rejected: {0}")]
    InvalidToken(String),
}

/// Port for the external identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProviderPort: Send + Sync {
    /// Subscribe to identity-change notifications.
    ///
    /// The receiver starts at the provider's current identity (`None` when
    /// no session exists yet) and is updated on every change.
    fn identity_changes(&self) -> watch::Receiver<Option<Identity>>;

    /// Acquire a fresh anonymous identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if acquisition fails. The caller surfaces
    /// this as an auth fault; there is no automatic retry.
    async fn sign_in_anonymously(&self) -> Result<Identity, IdentityError>;

    /// Exchange a one-shot credential token for an identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the token is rejected or the provider
    /// is unreachable. Exchange failure falls back to anonymous
    /// acquisition.
    async fn exchange_token(&self, token: &str) -> Result<Identity, IdentityError>;
}
