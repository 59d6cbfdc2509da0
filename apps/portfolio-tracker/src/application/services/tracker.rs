//! Portfolio Tracker Façade
//!
//! Wires the three core services around one state handle. All external
//! collaborators are injected as ports; the façade owns the shutdown token
//! that tears the live subscription down exactly once.
//!
//! Control flow: bootstrap resolves, the collection sync is spawned for
//! the adopted identity, then submissions flow through the ingestion
//! pipeline and come back through the subscription.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{HoldingStorePort, IdentityProviderPort, QuoteProviderPort};
use crate::application::services::bootstrap::{BootstrapSettings, SessionBootstrap};
use crate::application::services::collection_sync::LiveCollectionSync;
use crate::application::services::ingestion::QuoteIngestionPipeline;
use crate::domain::holding::Symbol;
use crate::domain::session::{Fault, StateHandle, SyncState};

/// The composed synchronization core.
pub struct PortfolioTracker {
    state: StateHandle,
    bootstrap: SessionBootstrap,
    pipeline: QuoteIngestionPipeline,
    store: Arc<dyn HoldingStorePort>,
    shutdown: CancellationToken,
    sync_task: Mutex<Option<JoinHandle<()>>>,
}

impl PortfolioTracker {
    /// Compose the core from its injected collaborators.
    #[must_use]
    pub fn new(
        settings: BootstrapSettings,
        identity_provider: Arc<dyn IdentityProviderPort>,
        store: Arc<dyn HoldingStorePort>,
        quotes: Arc<dyn QuoteProviderPort>,
    ) -> Self {
        let state = StateHandle::new();
        let bootstrap = SessionBootstrap::new(identity_provider, state.clone(), settings);
        let pipeline = QuoteIngestionPipeline::new(quotes, Arc::clone(&store), state.clone());
        Self {
            state,
            bootstrap,
            pipeline,
            store,
            shutdown: CancellationToken::new(),
            sync_task: Mutex::new(None),
        }
    }

    /// Subscribe to state changes for rendering.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Get a copy of the current state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state.snapshot()
    }

    /// Run bootstrap and, once an identity is adopted, open the live
    /// collection sync for it.
    ///
    /// When bootstrap cannot produce an identity the corresponding fault
    /// is already surfaced and no subscription is opened.
    pub async fn start(&self) {
        let Some(identity) = self.bootstrap.run().await else {
            return;
        };

        let sync = LiveCollectionSync::new(
            Arc::clone(&self.store),
            self.state.clone(),
            self.shutdown.child_token(),
        );
        let handle = tokio::spawn(sync.run(identity));
        *self.sync_task.lock() = Some(handle);
    }

    /// Submit a symbol through the ingestion pipeline.
    ///
    /// # Errors
    ///
    /// Returns the fault that ended the submission.
    pub async fn add_symbol(&self, input: &str) -> Result<Symbol, Fault> {
        self.pipeline.submit(input).await
    }

    /// Remove one holding by id.
    ///
    /// # Errors
    ///
    /// Returns the fault that ended the removal.
    pub async fn remove(&self, id: &str) -> Result<(), Fault> {
        self.pipeline.delete(id).await
    }

    /// Tear down the live subscription. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait for the spawned sync task to finish after [`Self::shutdown`].
    pub async fn join(&self) {
        let handle = self.sync_task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
