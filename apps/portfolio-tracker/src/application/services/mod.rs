//! Synchronization Core Services
//!
//! The three components of the core, composed around one [`StateHandle`]:
//!
//! - [`SessionBootstrap`]: establishes one stable identity per process
//! - [`LiveCollectionSync`]: mirrors the remote collection as an
//!   always-sorted snapshot
//! - [`QuoteIngestionPipeline`]: validates, fetches, normalizes, and
//!   commits user-submitted symbols
//!
//! [`PortfolioTracker`] wires them together behind one façade.
//!
//! [`StateHandle`]: crate::domain::session::StateHandle

mod bootstrap;
mod collection_sync;
mod ingestion;
mod tracker;

pub use bootstrap::{BootstrapSettings, SessionBootstrap};
pub use collection_sync::LiveCollectionSync;
pub use ingestion::QuoteIngestionPipeline;
pub use tracker::PortfolioTracker;
