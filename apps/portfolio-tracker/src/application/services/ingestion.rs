//! Quote Ingestion Pipeline
//!
//! Turns a user-supplied symbol into a validated holding and commits it to
//! the collection; also performs deletion.
//!
//! Each submission walks Validating, Fetching, Normalizing, Committing in
//! order; a fault in any step ends the invocation and is surfaced as state.
//! Committing performs no local mutation of the holdings snapshot: the live
//! subscription is the sole path by which readers learn of the write, so
//! the snapshot never diverges from the collection.
//!
//! Overlapping submissions are permitted. `pending` is held for the whole
//! span of each invocation, and the outcome of every invocation is its own
//! return value, so concurrent calls cannot cross-talk.

use std::sync::Arc;

use chrono::Utc;

use crate::application::ports::{HoldingStorePort, QuoteProviderPort};
use crate::domain::holding::{NormalizeError, Symbol, normalize};
use crate::domain::session::{Fault, Identity, StateHandle};

/// Validates, fetches, normalizes, and commits quote submissions.
pub struct QuoteIngestionPipeline {
    quotes: Arc<dyn QuoteProviderPort>,
    store: Arc<dyn HoldingStorePort>,
    state: StateHandle,
}

impl QuoteIngestionPipeline {
    /// Create a pipeline over a quote provider and a holding store.
    #[must_use]
    pub fn new(
        quotes: Arc<dyn QuoteProviderPort>,
        store: Arc<dyn HoldingStorePort>,
        state: StateHandle,
    ) -> Self {
        Self {
            quotes,
            store,
            state,
        }
    }

    /// Submit a symbol: validate, fetch, normalize, commit.
    ///
    /// Returns the committed symbol. The snapshot itself is updated only
    /// through the live subscription.
    ///
    /// # Errors
    ///
    /// Returns the fault that ended this invocation; the same fault has
    /// been surfaced as state.
    pub async fn submit(&self, input: &str) -> Result<Symbol, Fault> {
        let _pending = self.state.begin_operation();
        let outcome = self.ingest(input).await;
        if let Err(fault) = &outcome {
            tracing::warn!(fault = %fault, "quote submission failed");
            self.state.surface(fault.clone());
        }
        outcome
    }

    async fn ingest(&self, input: &str) -> Result<Symbol, Fault> {
        // Validating: no network call on bad input or incomplete bootstrap.
        let symbol = Symbol::parse(input).map_err(|error| Fault::Validation(error.to_string()))?;
        let identity = self.require_identity()?;

        // Fetching
        let payload = self
            .quotes
            .global_quote(&symbol)
            .await
            .map_err(|error| Fault::Fetch {
                status: error.status(),
                message: error.to_string(),
            })?;

        // Normalizing: a successful response with no payload means the
        // symbol has no data, which is distinct from a transport failure.
        let raw = payload.ok_or_else(|| Fault::InvalidSymbol {
            symbol: symbol.to_string(),
        })?;
        let document = normalize(&symbol, &raw, Utc::now()).map_err(|error| match error {
            NormalizeError::EmptyPayload => Fault::InvalidSymbol {
                symbol: symbol.to_string(),
            },
            NormalizeError::BadField { field, value } => Fault::Normalization { field, value },
        })?;

        // Committing: create-or-replace keyed by the uppercased symbol.
        self.store
            .put(&identity, document)
            .await
            .map_err(|error| Fault::Commit(error.to_string()))?;

        tracing::info!(symbol = %symbol, "holding committed");
        Ok(symbol)
    }

    /// Remove one holding by id.
    ///
    /// Success produces no local mutation; removal reaches readers through
    /// the live subscription.
    ///
    /// # Errors
    ///
    /// Returns a validation fault when no identity is present, or a commit
    /// fault when the delete fails. Either fault is also surfaced as state.
    pub async fn delete(&self, id: &str) -> Result<(), Fault> {
        let outcome = self.remove(id).await;
        if let Err(fault) = &outcome {
            tracing::warn!(fault = %fault, "holding removal failed");
            self.state.surface(fault.clone());
        }
        outcome
    }

    async fn remove(&self, id: &str) -> Result<(), Fault> {
        let identity = self.require_identity()?;
        self.store
            .delete(&identity, id)
            .await
            .map_err(|error| Fault::Commit(error.to_string()))?;
        tracing::info!(id, "holding removed");
        Ok(())
    }

    fn require_identity(&self) -> Result<Identity, Fault> {
        self.state
            .identity()
            .ok_or_else(|| Fault::Validation("no identity established yet".to_string()))
    }
}
