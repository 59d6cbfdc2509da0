//! Local Identity Provider Adapter
//!
//! Implements [`IdentityProviderPort`] without a hosted auth backend:
//! identity changes flow through a watch channel, anonymous sign-in mints
//! a UUID-based identity, and one-shot tokens resolve against a seeded
//! table. A production deployment implements the same port against its
//! auth provider.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::watch;
use uuid::Uuid;

use crate::application::ports::{IdentityError, IdentityProviderPort};
use crate::domain::session::Identity;

/// Identity provider holding session state in process memory.
pub struct LocalIdentityProvider {
    current: watch::Sender<Option<Identity>>,
    tokens: RwLock<HashMap<String, Identity>>,
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalIdentityProvider {
    /// Create a provider with no active session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: watch::channel(None).0,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Create a provider with an already-established session.
    #[must_use]
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            current: watch::channel(Some(identity)).0,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a one-shot token that exchanges for `identity`.
    pub fn register_token(&self, token: impl Into<String>, identity: Identity) {
        self.tokens.write().insert(token.into(), identity);
    }
}

impl std::fmt::Debug for LocalIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdentityProvider")
            .field("current", &self.current.borrow().is_some())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl IdentityProviderPort for LocalIdentityProvider {
    fn identity_changes(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, IdentityError> {
        let identity = Identity::new(Uuid::new_v4().simple().to_string());
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn exchange_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let identity = self
            .tokens
            .read()
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidToken("unknown one-shot token".to_string()))?;
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn anonymous_sign_in_mints_a_fresh_identity() {
        let provider = LocalIdentityProvider::new();
        let mut changes = provider.identity_changes();
        assert!(changes.borrow_and_update().is_none());

        let identity = provider.sign_in_anonymously().await.unwrap();
        assert!(!identity.as_str().is_empty());

        changes.changed().await.unwrap();
        assert_eq!(changes.borrow().clone(), Some(identity));
    }

    #[tokio::test]
    async fn anonymous_identities_are_distinct() {
        let provider = LocalIdentityProvider::new();
        let first = provider.sign_in_anonymously().await.unwrap();
        let second = provider.sign_in_anonymously().await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn with_identity_reports_existing_session() {
        let provider = LocalIdentityProvider::with_identity(Identity::new("u1"));
        let changes = provider.identity_changes();
        assert_eq!(changes.borrow().clone(), Some(Identity::new("u1")));
    }

    #[tokio::test]
    async fn registered_token_exchanges() {
        let provider = LocalIdentityProvider::new();
        provider.register_token("one-shot", Identity::new("token-user"));

        let identity = provider.exchange_token("one-shot").await.unwrap();
        assert_eq!(identity, Identity::new("token-user"));
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let provider = LocalIdentityProvider::new();
        let error = provider.exchange_token("bogus").await.unwrap_err();
        assert!(matches!(error, IdentityError::InvalidToken(_)));
    }
}
