//! Session State and Fault Taxonomy
//!
//! Process-wide, lifecycle-scoped synchronization state. [`SyncState`] is
//! the single piece of shared state the three services cooperate around;
//! [`StateHandle`] makes it observable through a watch channel so rendering
//! is decoupled from the synchronization core.
//!
//! Every mutation goes through the handle as one atomic `send_modify`, so a
//! reader never observes a partially applied transition.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tokio::sync::watch;

use crate::domain::holding::Holding;

// =============================================================================
// Identity
// =============================================================================

/// An opaque, stable token identifying the current user session.
///
/// Produced once by session bootstrap and immutable for the process
/// lifetime. Never persisted by this core.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Create an identity from a provider-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Faults
// =============================================================================

/// A terminal, surfaced error for one operation.
///
/// Faults are never retried automatically. [`Fault::Unconfigured`] and an
/// unrecovered [`Fault::Auth`] block the entire system; every other variant
/// is scoped to the action that raised it and must not clear holdings or
/// interrupt an active subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Provider configuration is absent; no identity can ever be
    /// established. Fatal: bootstrap never completes.
    #[error("tracker is not configured: no identity provider settings")]
    Unconfigured,

    /// Identity acquisition failed during bootstrap.
    #[error("identity acquisition failed: {0}")]
    Auth(String),

    /// The live collection subscription broke. The last good snapshot is
    /// retained.
    #[error("live collection sync failed: {0}")]
    Sync(String),

    /// Bad user input; no network call was attempted.
    #[error("invalid submission: {0}")]
    Validation(String),

    /// Transport-level failure talking to the quote endpoint.
    #[error("quote fetch failed: {message}")]
    Fetch {
        /// Transport status, when one was received.
        status: Option<u16>,
        /// Error details.
        message: String,
    },

    /// The quote request succeeded but carried no data for the symbol.
    #[error("no quote data for symbol {symbol}")]
    InvalidSymbol {
        /// The symbol that has no data.
        symbol: String,
    },

    /// The quote response carried malformed numeric fields.
    #[error("malformed quote field {field:?}: {value:?}")]
    Normalization {
        /// The wire label of the offending field.
        field: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A write or delete against the collection failed.
    #[error("collection write failed: {0}")]
    Commit(String),
}

impl Fault {
    /// Whether this fault blocks the entire system (no identity means no
    /// sync and no writes) and must be rendered as a blocking error.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::Unconfigured | Self::Auth(_))
    }
}

// =============================================================================
// Sync State
// =============================================================================

/// The observable synchronization state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// The adopted identity, absent until bootstrap resolves.
    pub identity: Option<Identity>,
    /// True once bootstrap has resolved (identity adopted or failure
    /// surfaced). Transitions false to true exactly once.
    pub auth_ready: bool,
    /// The materialized holdings, always sorted by `last_updated`
    /// descending. A faithful mirror of the remote collection.
    pub holdings: Vec<Holding>,
    /// True while at least one quote submission is in flight.
    pub pending: bool,
    /// The most recently surfaced fault, if any.
    pub fault: Option<Fault>,
}

/// Handle for mutating and observing [`SyncState`].
///
/// Cloneable; all clones share one state cell. Mutations are atomic with
/// respect to readers.
#[derive(Debug, Clone)]
pub struct StateHandle {
    tx: watch::Sender<SyncState>,
    in_flight: Arc<AtomicUsize>,
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHandle {
    /// Create a handle around a fresh initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: watch::channel(SyncState::default()).0,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to state changes.
    ///
    /// The receiver starts at the current state; every mutation publishes
    /// the full new state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.tx.subscribe()
    }

    /// Get a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SyncState {
        self.tx.borrow().clone()
    }

    /// Get the current identity, if one has been adopted.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.tx.borrow().identity.clone()
    }

    /// Adopt an identity and mark bootstrap resolved.
    ///
    /// Identity transitions absent to present at most once per bootstrap;
    /// a second adoption is ignored.
    pub fn adopt_identity(&self, identity: Identity) {
        self.tx.send_modify(|state| {
            if state.identity.is_none() {
                state.identity = Some(identity);
            }
            state.auth_ready = true;
        });
    }

    /// Mark bootstrap resolved without an identity (failure surfaced).
    pub fn mark_auth_ready(&self) {
        self.tx.send_modify(|state| state.auth_ready = true);
    }

    /// Surface a fault as user-visible state.
    pub fn surface(&self, fault: Fault) {
        self.tx.send_modify(|state| state.fault = Some(fault));
    }

    /// Atomically replace the holdings snapshot.
    ///
    /// A good notification also recovers from a sync fault; faults scoped
    /// to other operations are left in place.
    pub fn replace_holdings(&self, holdings: Vec<Holding>) {
        self.tx.send_modify(|state| {
            state.holdings = holdings;
            if matches!(state.fault, Some(Fault::Sync(_))) {
                state.fault = None;
            }
        });
    }

    /// Begin a pipeline operation, raising `pending` until the returned
    /// guard is dropped. Overlapping operations each hold their own guard;
    /// `pending` stays true until the last one resolves.
    #[must_use]
    pub fn begin_operation(&self) -> PendingGuard {
        let count = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish_pending(count > 0);
        PendingGuard {
            handle: self.clone(),
        }
    }

    fn publish_pending(&self, pending: bool) {
        self.tx.send_if_modified(|state| {
            if state.pending == pending {
                false
            } else {
                state.pending = pending;
                true
            }
        });
    }
}

/// Guard marking one in-flight pipeline operation.
///
/// Dropping the guard lowers `pending` once no other operation remains in
/// flight.
#[derive(Debug)]
pub struct PendingGuard {
    handle: StateHandle,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let remaining = self.handle.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        self.handle.publish_pending(remaining > 0);
    }
}
