//! Port Interfaces
//!
//! Interfaces (ports) for the external collaborators, following the
//! Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`IdentityProviderPort`]: identity-change notifications, anonymous
//!   acquisition, and one-shot token exchange
//! - [`HoldingStorePort`]: the per-identity document collection with push
//!   subscriptions
//! - [`QuoteProviderPort`]: the external quote endpoint

mod holding_store;
mod identity_provider;
mod quote_provider;

pub use holding_store::{CollectionEvent, CollectionEvents, HoldingStorePort, StoreError};
pub use identity_provider::{IdentityError, IdentityProviderPort};
pub use quote_provider::{QuoteError, QuoteProviderPort};

#[cfg(test)]
pub use holding_store::MockHoldingStorePort;
#[cfg(test)]
pub use identity_provider::MockIdentityProviderPort;
#[cfg(test)]
pub use quote_provider::MockQuoteProviderPort;
