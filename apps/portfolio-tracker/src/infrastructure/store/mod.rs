//! In-Memory Document Collection Adapter
//!
//! Implements [`HoldingStorePort`] with an in-process, namespaced document
//! map. Subscriptions receive the full current contents immediately and a
//! fresh full snapshot after every mutation, mirroring the push-subscribe
//! contract of a hosted document database. [`MemoryHoldingStore::interrupt`]
//! injects a subscription error to exercise the drop-then-recover path.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::application::ports::{CollectionEvent, CollectionEvents, HoldingStorePort, StoreError};
use crate::domain::holding::HoldingDocument;
use crate::domain::session::Identity;

/// One identity's scoped collection: its documents keyed by id, plus the
/// live subscribers to notify on every change.
#[derive(Default)]
struct ScopedCollection {
    documents: BTreeMap<String, HoldingDocument>,
    subscribers: Vec<mpsc::UnboundedSender<CollectionEvent>>,
}

impl ScopedCollection {
    fn snapshot(&self) -> Vec<HoldingDocument> {
        self.documents.values().cloned().collect()
    }

    /// Deliver an event to every live subscriber, pruning closed ones.
    fn publish(&mut self, event: &CollectionEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Namespaced in-memory document store.
pub struct MemoryHoldingStore {
    namespace: String,
    collections: RwLock<HashMap<String, ScopedCollection>>,
}

impl MemoryHoldingStore {
    /// Create an empty store under a collection namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// The scoped path of one identity's collection.
    fn scope(&self, identity: &Identity) -> String {
        format!("artifacts/{}/users/{}/stocks", self.namespace, identity)
    }

    /// Push a subscription error to one identity's subscribers.
    ///
    /// The subscription itself stays open; a later mutation delivers a
    /// fresh snapshot as usual.
    pub fn interrupt(&self, identity: &Identity, message: impl Into<String>) {
        let scope = self.scope(identity);
        let mut collections = self.collections.write();
        if let Some(collection) = collections.get_mut(&scope) {
            collection.publish(&CollectionEvent::Error(StoreError::Unavailable(
                message.into(),
            )));
        }
    }
}

impl std::fmt::Debug for MemoryHoldingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHoldingStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HoldingStorePort for MemoryHoldingStore {
    async fn subscribe(&self, identity: &Identity) -> Result<CollectionEvents, StoreError> {
        let scope = self.scope(identity);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut collections = self.collections.write();
        let collection = collections.entry(scope).or_default();
        // Initial notification: the full current contents.
        let _ = tx.send(CollectionEvent::Snapshot(collection.snapshot()));
        collection.subscribers.push(tx);

        Ok(rx)
    }

    async fn put(&self, identity: &Identity, document: HoldingDocument) -> Result<(), StoreError> {
        let scope = self.scope(identity);
        let mut collections = self.collections.write();
        let collection = collections.entry(scope).or_default();
        collection
            .documents
            .insert(document.id.clone(), document);
        let snapshot = collection.snapshot();
        collection.publish(&CollectionEvent::Snapshot(snapshot));
        Ok(())
    }

    async fn delete(&self, identity: &Identity, id: &str) -> Result<(), StoreError> {
        let scope = self.scope(identity);
        let mut collections = self.collections.write();
        let collection = collections.entry(scope).or_default();
        collection.documents.remove(id);
        let snapshot = collection.snapshot();
        collection.publish(&CollectionEvent::Snapshot(snapshot));
        Ok(())
    }
}
