//! Live Collection Sync
//!
//! Maintains the holdings snapshot as a faithful, always-current mirror of
//! one identity's remote collection.
//!
//! The sync never initiates writes. Each notification atomically replaces
//! the snapshot with the mapped, timestamp-defaulted, sorted projection of
//! the full collection contents; a subscription error surfaces a sync
//! fault while the last good snapshot stays visible. The subscription is
//! released exactly once on every exit path, including cancellation.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CollectionEvent, HoldingStorePort};
use crate::domain::holding::materialize;
use crate::domain::session::{Fault, Identity, StateHandle};

/// Mirrors one identity's collection into the observable state.
pub struct LiveCollectionSync {
    store: Arc<dyn HoldingStorePort>,
    state: StateHandle,
    shutdown: CancellationToken,
}

impl LiveCollectionSync {
    /// Create a sync over a holding store.
    ///
    /// Cancelling `shutdown` releases the subscription and ends the run.
    #[must_use]
    pub fn new(
        store: Arc<dyn HoldingStorePort>,
        state: StateHandle,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            state,
            shutdown,
        }
    }

    /// Run the mirror loop until cancellation or stream end.
    ///
    /// Activates only once bootstrap has resolved with an identity; called
    /// before that, it stays idle and returns immediately.
    pub async fn run(self, identity: Identity) {
        if !self.state.snapshot().auth_ready {
            tracing::debug!("bootstrap not resolved, collection sync stays idle");
            return;
        }

        let mut events = match self.store.subscribe(&identity).await {
            Ok(events) => events,
            Err(error) => {
                tracing::error!(error = %error, "failed to open collection subscription");
                self.state.surface(Fault::Sync(error.to_string()));
                return;
            }
        };
        tracing::info!(identity = %identity, "collection subscription opened");

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    tracing::info!(identity = %identity, "collection sync cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(CollectionEvent::Snapshot(documents)) => {
                        let holdings = materialize(documents, Utc::now());
                        tracing::debug!(count = holdings.len(), "holdings snapshot replaced");
                        self.state.replace_holdings(holdings);
                    }
                    Some(CollectionEvent::Error(error)) => {
                        // Stale-but-visible beats blanking the snapshot.
                        tracing::error!(error = %error, "collection subscription error");
                        self.state.surface(Fault::Sync(error.to_string()));
                    }
                    None => {
                        tracing::warn!(identity = %identity, "collection subscription closed by store");
                        break;
                    }
                }
            }
        }

        // Dropping the receiver releases the push subscription; no further
        // notifications are processed past this point.
        tracing::info!(identity = %identity, "collection subscription released");
    }
}
