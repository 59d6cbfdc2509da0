//! Holding Store Port (Driven Port)
//!
//! Interface for the per-identity document collection. The collection
//! supports push subscriptions that deliver the full current contents on
//! subscribe and after every change, create-or-replace keyed by document
//! id, and delete-by-id. No schema enforcement is assumed from the store;
//! validation is the ingestion pipeline's responsibility.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::holding::HoldingDocument;
use crate::domain::session::Identity;

/// Holding store error.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("collection unavailable: {0}")]
    Unavailable(String),

    /// The store refused the operation.
    #[error("collection rejected the operation: {0}")]
    Rejected(String),
}

/// One notification from a collection subscription.
#[derive(Debug, Clone)]
pub enum CollectionEvent {
    /// The full current contents of the collection.
    Snapshot(Vec<HoldingDocument>),
    /// The subscription broke. The stream may still recover and deliver
    /// further snapshots.
    Error(StoreError),
}

/// The receiving side of a collection subscription.
///
/// Dropping the receiver releases the subscription.
pub type CollectionEvents = mpsc::UnboundedReceiver<CollectionEvent>;

/// Port for the per-identity document collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HoldingStorePort: Send + Sync {
    /// Open a push subscription to one identity's collection.
    ///
    /// The first event carries the full current contents; every subsequent
    /// change delivers a fresh full snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the subscription cannot be opened.
    async fn subscribe(&self, identity: &Identity) -> Result<CollectionEvents, StoreError>;

    /// Create or replace one document, keyed by `document.id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn put(&self, identity: &Identity, document: HoldingDocument) -> Result<(), StoreError>;

    /// Delete one document by id. Deleting an absent document is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    async fn delete(&self, identity: &Identity, id: &str) -> Result<(), StoreError>;
}
