//! Infrastructure layer - adapters and external integrations.

/// Alpha Vantage quote endpoint adapter.
pub mod alphavantage;

/// Configuration loaded from environment variables.
pub mod config;

/// Local identity provider adapter.
pub mod identity;

/// In-memory document collection adapter.
pub mod store;

/// Logging and tracing initialization.
pub mod telemetry;
