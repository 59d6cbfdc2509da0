//! Tracing Initialization
//!
//! Configures structured logging for the tracker binary.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter directives (default: `portfolio_tracker=info`)

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the tracing subscriber.
///
/// Repeated calls are no-ops, which keeps test binaries that initialize
/// logging from multiple entry points from panicking.
#[allow(clippy::expect_used)]
pub fn init() {
    let env_filter = EnvFilter::from_default_env().add_directive(
        "portfolio_tracker=info"
            .parse()
            .expect("static directive 'portfolio_tracker=info' is valid"),
    );

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
