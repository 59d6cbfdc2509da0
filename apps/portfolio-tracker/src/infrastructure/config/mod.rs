//! Configuration loaded from environment variables.

mod settings;

pub use settings::{ConfigError, QuoteSettings, TrackerConfig};
