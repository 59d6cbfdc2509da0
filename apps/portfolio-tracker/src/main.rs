//! Portfolio Tracker Binary
//!
//! Starts the holdings synchronization core with the in-process identity
//! provider and document store, then drives it from stdin commands while a
//! renderer task mirrors every state change to the terminal.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin portfolio-tracker
//! ```
//!
//! Commands: `add <symbol>`, `rm <symbol>`, `quit`.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ALPHAVANTAGE_KEY`: Alpha Vantage API key
//!
//! ## Optional
//! - `ALPHAVANTAGE_BASE_URL`: Quote endpoint base URL (default: <https://www.alphavantage.co>)
//! - `TRACKER_QUOTE_TIMEOUT_SECS`: Quote request timeout (default: 10)
//! - `TRACKER_NAMESPACE`: Collection namespace (default: default-app-id)
//! - `TRACKER_AUTH_CONFIG`: Identity provider configuration blob
//! - `TRACKER_AUTH_TOKEN`: One-shot credential token
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use portfolio_tracker::infrastructure::telemetry;
use portfolio_tracker::{
    AlphaVantageClient, LocalIdentityProvider, MemoryHoldingStore, PortfolioTracker, SyncState,
    TrackerConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    telemetry::init();

    tracing::info!("Starting portfolio tracker");

    let config = TrackerConfig::from_env()?;
    tracing::info!(
        namespace = %config.namespace,
        configured = config.provider_config.is_some(),
        has_token = config.initial_token.is_some(),
        "Configuration loaded"
    );

    let identity_provider = Arc::new(LocalIdentityProvider::new());
    if let Some(token) = &config.initial_token {
        // The local provider needs the seeded token to honor an exchange.
        identity_provider.register_token(
            token.clone(),
            portfolio_tracker::Identity::new("token-user"),
        );
    }

    let store = Arc::new(MemoryHoldingStore::new(config.namespace.clone()));
    let quotes = Arc::new(AlphaVantageClient::new(&config.quote)?);

    let tracker = Arc::new(PortfolioTracker::new(
        config.bootstrap_settings(),
        identity_provider,
        store,
        quotes,
    ));

    let renderer = tokio::spawn(render_states(tracker.subscribe()));

    tracker.start().await;

    run_command_loop(&tracker).await;

    tracker.shutdown();
    tracker.join().await;
    renderer.abort();

    tracing::info!("Portfolio tracker stopped");
    Ok(())
}

/// Mirror every state change to the terminal.
async fn render_states(mut states: watch::Receiver<SyncState>) {
    loop {
        render(&states.borrow_and_update().clone());
        if states.changed().await.is_err() {
            break;
        }
    }
}

/// Render one state snapshot.
fn render(state: &SyncState) {
    if let Some(fault) = &state.fault {
        if fault.is_blocking() {
            println!("!! {fault}");
            return;
        }
        println!("warning: {fault}");
    }

    if !state.auth_ready {
        println!("-- signing in...");
        return;
    }

    if state.pending {
        println!("-- fetching quote...");
    }

    if state.holdings.is_empty() {
        println!("(no holdings)");
        return;
    }

    println!(
        "{:<8} {:>10} {:>10} {:>10} {:>10} {:>12} {:>9}",
        "SYMBOL", "PRICE", "OPEN", "HIGH", "LOW", "VOLUME", "CHG%"
    );
    for holding in &state.holdings {
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>10} {:>12} {:>8}%",
            holding.symbol,
            holding.price,
            holding.open,
            holding.high,
            holding.low,
            holding.volume,
            holding.change_percent
        );
    }
}

/// Read commands from stdin until `quit`, EOF, or Ctrl+C.
async fn run_command_loop(tracker: &PortfolioTracker) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, initiating shutdown");
                return;
            }
        };

        let Ok(Some(line)) = line else {
            return;
        };

        match line.trim().split_once(' ') {
            Some(("add", symbol)) => match tracker.add_symbol(symbol).await {
                Ok(symbol) => tracing::info!(%symbol, "Holding committed"),
                Err(fault) => tracing::warn!(%fault, "Submission failed"),
            },
            Some(("rm", symbol)) => {
                let id = symbol.trim().to_uppercase();
                match tracker.remove(&id).await {
                    Ok(()) => tracing::info!(%id, "Holding removed"),
                    Err(fault) => tracing::warn!(%fault, "Removal failed"),
                }
            }
            _ if line.trim() == "quit" => return,
            _ if line.trim().is_empty() => {}
            _ => println!("commands: add <symbol> | rm <symbol> | quit"),
        }
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
