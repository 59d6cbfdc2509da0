//! Quote Provider Port (Driven Port)
//!
//! Interface for the external quote endpoint: one request per fetch,
//! parameterized by uppercased symbol.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::holding::{RawQuote, Symbol};

/// Quote endpoint error. All variants are transport-level; a successful
/// response with no data for the symbol is `Ok(None)`, not an error.
#[derive(Debug, Clone, Error)]
pub enum QuoteError {
    /// Non-success transport status.
    #[error("quote endpoint returned status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The endpoint could not be reached.
    #[error("quote endpoint unreachable: {0}")]
    Network(String),

    /// The response body did not parse.
    #[error("quote response body malformed: {0}")]
    MalformedBody(String),
}

impl QuoteError {
    /// The transport status carried by this error, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            Self::Network(_) | Self::MalformedBody(_) => None,
        }
    }
}

/// Port for the external quote endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProviderPort: Send + Sync {
    /// Fetch the current quote payload for a symbol.
    ///
    /// Returns `Ok(None)` when the request succeeded but the response
    /// carried no quote payload (unknown symbol).
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError`] for transport failures and malformed bodies.
    async fn global_quote(&self, symbol: &Symbol) -> Result<Option<RawQuote>, QuoteError>;
}
