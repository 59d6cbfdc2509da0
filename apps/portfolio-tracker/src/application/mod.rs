//! Application layer - services and port definitions.

/// Driven-port interfaces implemented by infrastructure adapters.
pub mod ports;

/// The synchronization core services.
pub mod services;
