#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Portfolio Tracker - Holdings Synchronization Core
//!
//! Keeps a single user's stock holdings synchronized between a quote
//! endpoint and a push-based document store, exposing one observable
//! session state that a renderer consumes.
//!
//! # Layers (inside to outside)
//!
//! - **Domain**: Quote normalization and session state
//!   - `holding`: Symbols, raw quote payloads, holding documents
//!   - `session`: Observable sync state and fault taxonomy
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Interfaces for identity, document storage, quotes
//!   - `services`: Session bootstrap, live collection sync, quote ingestion
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `alphavantage`: GLOBAL_QUOTE HTTP adapter
//!   - `identity`: In-process identity provider
//!   - `store`: In-memory push-subscribe document store
//!   - `config`: Environment-variable configuration
//!   - `telemetry`: Tracing initialization
//!
//! # Data Flow
//!
//! ```text
//! Quote API ----> Ingestion ----> Document Store ----> Live Sync
//!                 (normalize)     (put/delete)         (snapshots)
//!                                                          |
//!                    Renderer <---- watch channel <---- SyncState
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - core types with no external integrations.
pub mod domain;

/// Application layer - services and port definitions.
pub mod application;

/// Infrastructure layer - adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::holding::{
    Holding, HoldingDocument, NormalizeError, RawQuote, Symbol, SymbolError, materialize,
    normalize,
};
pub use domain::session::{Fault, Identity, StateHandle, SyncState};

// Ports
pub use application::ports::{
    CollectionEvent, CollectionEvents, HoldingStorePort, IdentityError, IdentityProviderPort,
    QuoteError, QuoteProviderPort, StoreError,
};

// Services
pub use application::services::{
    BootstrapSettings, LiveCollectionSync, PortfolioTracker, QuoteIngestionPipeline,
    SessionBootstrap,
};

// Infrastructure adapters
pub use infrastructure::alphavantage::AlphaVantageClient;
pub use infrastructure::config::{ConfigError, QuoteSettings, TrackerConfig};
pub use infrastructure::identity::LocalIdentityProvider;
pub use infrastructure::store::MemoryHoldingStore;

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
