//! Holdings and Quote Normalization
//!
//! Core value types for tracked positions:
//!
//! - [`Symbol`]: validated, uppercased ticker symbol
//! - [`RawQuote`]: the labeled-string quote payload as delivered by the feed
//! - [`HoldingDocument`]: the stored form of one holding (timestamp optional)
//! - [`Holding`]: the materialized form visible to readers
//!
//! Two pure functions connect them: [`normalize`] turns a raw quote into a
//! storable document, and [`materialize`] turns a full collection snapshot
//! into the sorted holdings sequence readers observe.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Symbol
// =============================================================================

/// Error raised when parsing a user-supplied symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// The input was empty or whitespace-only.
    #[error("symbol cannot be empty")]
    Empty,
}

/// A validated ticker symbol.
///
/// Always non-empty and uppercase. Doubles as the document id, which
/// enforces at most one holding per symbol per identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Parse a user-supplied symbol.
    ///
    /// Trims surrounding whitespace and uppercases the result.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::Empty`] if the input is empty or
    /// whitespace-only.
    pub fn parse(input: &str) -> Result<Self, SymbolError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Raw Quote Payload
// =============================================================================

/// The quote payload as delivered by the market-data feed.
///
/// Every field is a string in the wire format, keyed by the feed's numbered
/// labels. All fields are optional: an unknown symbol comes back as an empty
/// payload object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawQuote {
    /// Ticker symbol as reported by the feed.
    #[serde(rename = "01. symbol")]
    pub symbol: Option<String>,
    /// Opening price.
    #[serde(rename = "02. open")]
    pub open: Option<String>,
    /// Session high.
    #[serde(rename = "03. high")]
    pub high: Option<String>,
    /// Session low.
    #[serde(rename = "04. low")]
    pub low: Option<String>,
    /// Latest price.
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    /// Traded volume.
    #[serde(rename = "06. volume")]
    pub volume: Option<String>,
    /// Latest trading day, an opaque date string.
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: Option<String>,
    /// Previous session close.
    #[serde(rename = "08. previous close")]
    pub previous_close: Option<String>,
    /// Absolute price change.
    #[serde(rename = "09. change")]
    pub change: Option<String>,
    /// Percentage change, with a trailing `%` in the wire format.
    #[serde(rename = "10. change percent")]
    pub change_percent: Option<String>,
}

impl RawQuote {
    /// Check whether the payload carries no data at all.
    ///
    /// The feed signals an unknown symbol with an empty payload object
    /// rather than a transport error.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.price.is_none()
            && self.volume.is_none()
            && self.latest_trading_day.is_none()
            && self.previous_close.is_none()
            && self.change.is_none()
            && self.change_percent.is_none()
    }
}

// =============================================================================
// Documents and Holdings
// =============================================================================

/// The stored form of one holding, as written to and read from the
/// per-identity document collection.
///
/// `last_updated` is optional because a remote record may lack a timestamp;
/// materialization defaults it to the observation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingDocument {
    /// Document id: the uppercased symbol.
    pub id: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Opening price.
    pub open: Decimal,
    /// Session high.
    pub high: Decimal,
    /// Session low.
    pub low: Decimal,
    /// Latest price.
    pub price: Decimal,
    /// Previous session close.
    pub previous_close: Decimal,
    /// Absolute price change.
    pub change: Decimal,
    /// Percentage change (percentage units, not a fraction).
    pub change_percent: Decimal,
    /// Traded volume.
    pub volume: u64,
    /// Latest trading day, an opaque date string from the feed.
    pub last_trading_day: String,
    /// Timestamp of the last successful write, if recorded.
    pub last_updated: Option<DateTime<Utc>>,
}

/// One materialized tracked position, as visible to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    /// Document id: the uppercased symbol.
    pub id: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Opening price.
    pub open: Decimal,
    /// Session high.
    pub high: Decimal,
    /// Session low.
    pub low: Decimal,
    /// Latest price.
    pub price: Decimal,
    /// Previous session close.
    pub previous_close: Decimal,
    /// Absolute price change.
    pub change: Decimal,
    /// Percentage change (percentage units).
    pub change_percent: Decimal,
    /// Traded volume.
    pub volume: u64,
    /// Latest trading day, an opaque date string from the feed.
    pub last_trading_day: String,
    /// Timestamp of the last successful write.
    pub last_updated: DateTime<Utc>,
}

impl Holding {
    /// Materialize a stored document, defaulting a missing timestamp to
    /// `observed_at`.
    #[must_use]
    pub fn from_document(doc: HoldingDocument, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: doc.id,
            symbol: doc.symbol,
            open: doc.open,
            high: doc.high,
            low: doc.low,
            price: doc.price,
            previous_close: doc.previous_close,
            change: doc.change,
            change_percent: doc.change_percent,
            volume: doc.volume,
            last_trading_day: doc.last_trading_day,
            last_updated: doc.last_updated.unwrap_or(observed_at),
        }
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Error raised while normalizing a raw quote into a holding document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The payload carried no data (unknown symbol).
    #[error("quote payload is empty")]
    EmptyPayload,

    /// A numeric field failed to parse.
    #[error("quote field {field:?} does not parse as a finite number: {value:?}")]
    BadField {
        /// The wire label of the offending field.
        field: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },
}

/// Turn a raw quote payload into a storable holding document.
///
/// Numeric fields are parsed as decimals and integers; the percentage field
/// has a trailing `%` stripped before parsing. The `last_updated` timestamp
/// is stamped here from `now`, never taken from the feed. The document id is
/// the uppercased symbol, preferring the feed's reported symbol over the
/// requested one.
///
/// # Errors
///
/// Returns [`NormalizeError::EmptyPayload`] for an empty payload and
/// [`NormalizeError::BadField`] for any field that fails to parse.
pub fn normalize(
    requested: &Symbol,
    raw: &RawQuote,
    now: DateTime<Utc>,
) -> Result<HoldingDocument, NormalizeError> {
    if raw.is_empty() {
        return Err(NormalizeError::EmptyPayload);
    }

    let symbol = raw
        .symbol
        .as_deref()
        .map_or_else(|| requested.as_str().to_string(), str::to_uppercase);

    Ok(HoldingDocument {
        id: symbol.clone(),
        symbol,
        open: parse_decimal("02. open", raw.open.as_deref())?,
        high: parse_decimal("03. high", raw.high.as_deref())?,
        low: parse_decimal("04. low", raw.low.as_deref())?,
        price: parse_decimal("05. price", raw.price.as_deref())?,
        previous_close: parse_decimal("08. previous close", raw.previous_close.as_deref())?,
        change: parse_decimal("09. change", raw.change.as_deref())?,
        change_percent: parse_percent("10. change percent", raw.change_percent.as_deref())?,
        volume: parse_volume("06. volume", raw.volume.as_deref())?,
        last_trading_day: raw.latest_trading_day.clone().unwrap_or_default(),
        last_updated: Some(now),
    })
}

fn parse_decimal(field: &'static str, value: Option<&str>) -> Result<Decimal, NormalizeError> {
    let value = value.unwrap_or_default();
    value.trim().parse().map_err(|_| NormalizeError::BadField {
        field,
        value: value.to_string(),
    })
}

fn parse_percent(field: &'static str, value: Option<&str>) -> Result<Decimal, NormalizeError> {
    let value = value.unwrap_or_default();
    let stripped = value.trim().strip_suffix('%').unwrap_or_else(|| value.trim());
    stripped.parse().map_err(|_| NormalizeError::BadField {
        field,
        value: value.to_string(),
    })
}

fn parse_volume(field: &'static str, value: Option<&str>) -> Result<u64, NormalizeError> {
    let value = value.unwrap_or_default();
    value.trim().parse().map_err(|_| NormalizeError::BadField {
        field,
        value: value.to_string(),
    })
}

// =============================================================================
// Snapshot Projection
// =============================================================================

/// Project a full collection snapshot into the holdings sequence readers
/// observe: each document materialized (missing timestamps defaulted to
/// `observed_at`), sorted by `last_updated` descending.
///
/// The sort is stable, so ties keep their order within one notification.
#[must_use]
pub fn materialize(docs: Vec<HoldingDocument>, observed_at: DateTime<Utc>) -> Vec<Holding> {
    let mut holdings: Vec<Holding> = docs
        .into_iter()
        .map(|doc| Holding::from_document(doc, observed_at))
        .collect();
    holdings.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    holdings
}
