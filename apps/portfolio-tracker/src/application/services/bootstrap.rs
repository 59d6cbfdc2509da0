//! Session Bootstrap
//!
//! Produces exactly one stable identity for the process, tolerating the
//! presence or absence of an externally supplied credential.
//!
//! # Resolution order
//!
//! 1. Absent or empty provider configuration terminates in the
//!    `Unconfigured` state. Terminal, never retried.
//! 2. An identity already reported by the provider is adopted as-is.
//! 3. A one-shot credential token, when present, is exchanged concurrently
//!    with the identity-change subscription; exchange success
//!    short-circuits, exchange failure falls back silently to anonymous
//!    acquisition.
//! 4. Anonymous acquisition failure surfaces an auth fault and leaves
//!    bootstrap pending indefinitely.
//!
//! `auth_ready` transitions false to true exactly once, on the first
//! resolution (identity adopted or failure surfaced).

use std::sync::Arc;

use crate::application::ports::IdentityProviderPort;
use crate::domain::session::{Fault, Identity, StateHandle};

/// Bootstrap inputs supplied by configuration.
#[derive(Debug, Clone, Default)]
pub struct BootstrapSettings {
    /// Opaque provider configuration blob. Absent or empty means the
    /// tracker is unconfigured and bootstrap terminates immediately.
    pub provider_config: Option<String>,
    /// Optional one-shot credential token to exchange for an identity.
    pub initial_token: Option<String>,
}

impl BootstrapSettings {
    /// Whether provider configuration is present and non-empty.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.provider_config
            .as_deref()
            .is_some_and(|blob| !blob.trim().is_empty())
    }
}

/// Establishes the process identity. Leaf component, no dependencies on
/// the other services.
pub struct SessionBootstrap {
    provider: Arc<dyn IdentityProviderPort>,
    state: StateHandle,
    settings: BootstrapSettings,
}

impl SessionBootstrap {
    /// Create a bootstrap over an identity provider.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProviderPort>,
        state: StateHandle,
        settings: BootstrapSettings,
    ) -> Self {
        Self {
            provider,
            state,
            settings,
        }
    }

    /// Run bootstrap to its first resolution.
    ///
    /// Returns the adopted identity, or `None` when no identity could be
    /// established (the corresponding fault has been surfaced).
    pub async fn run(&self) -> Option<Identity> {
        if !self.settings.is_configured() {
            tracing::error!("provider configuration absent, tracker cannot start");
            self.state.surface(Fault::Unconfigured);
            return None;
        }

        let mut changes = self.provider.identity_changes();

        // An existing session wins over everything else.
        if let Some(identity) = changes.borrow_and_update().clone() {
            return Some(self.adopt(identity));
        }

        if let Some(token) = self.settings.initial_token.as_deref() {
            tokio::select! {
                exchanged = self.provider.exchange_token(token) => match exchanged {
                    Ok(identity) => return Some(self.adopt(identity)),
                    Err(error) => {
                        tracing::warn!(
                            error = %error,
                            "one-shot token exchange failed, falling back to anonymous sign-in"
                        );
                    }
                },
                changed = changes.changed() => {
                    if changed.is_ok()
                        && let Some(identity) = changes.borrow_and_update().clone()
                    {
                        return Some(self.adopt(identity));
                    }
                }
            }
        }

        match self.provider.sign_in_anonymously().await {
            Ok(identity) => Some(self.adopt(identity)),
            Err(error) => {
                tracing::error!(error = %error, "anonymous sign-in failed");
                self.state.surface(Fault::Auth(error.to_string()));
                self.state.mark_auth_ready();
                None
            }
        }
    }

    fn adopt(&self, identity: Identity) -> Identity {
        tracing::info!(identity = %identity, "identity adopted");
        self.state.adopt_identity(identity.clone());
        identity
    }
}
