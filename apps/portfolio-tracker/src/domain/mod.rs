//! Domain layer - core types with no I/O.

/// Symbols, holdings, quote payloads, and snapshot projection.
pub mod holding;

/// Identity, fault taxonomy, and observable session state.
pub mod session;
