//! Alpha Vantage Quote Endpoint Adapter
//!
//! Implements [`QuoteProviderPort`] against the Alpha Vantage
//! `GLOBAL_QUOTE` API: one GET per fetch, parameterized by uppercased
//! symbol and API key. The quote payload arrives under the
//! `"Global Quote"` envelope key with labeled string fields; an unknown
//! symbol comes back as an empty payload object, which is reported as
//! `Ok(None)` rather than an error.

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{QuoteError, QuoteProviderPort};
use crate::domain::holding::{RawQuote, Symbol};
use crate::infrastructure::config::QuoteSettings;

/// Response envelope around the quote payload.
#[derive(Debug, Deserialize)]
struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote")]
    global_quote: Option<RawQuote>,
}

/// Quote endpoint adapter backed by `reqwest`.
#[derive(Debug)]
pub struct AlphaVantageClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    /// Create a new client from quote settings.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Network`] if the HTTP client cannot be built.
    pub fn new(settings: &QuoteSettings) -> Result<Self, QuoteError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl QuoteProviderPort for AlphaVantageClient {
    async fn global_quote(&self, symbol: &Symbol) -> Result<Option<RawQuote>, QuoteError> {
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol.as_str()),
                ("apikey", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status {
                status: status.as_u16(),
            });
        }

        let envelope: GlobalQuoteEnvelope = response
            .json()
            .await
            .map_err(|e| QuoteError::MalformedBody(e.to_string()))?;

        Ok(envelope.global_quote)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings(base_url: String) -> QuoteSettings {
        QuoteSettings {
            api_key: "demo-key".to_string(),
            base_url,
            timeout: Duration::from_secs(2),
        }
    }

    fn quote_body() -> serde_json::Value {
        json!({
            "Global Quote": {
                "01. symbol": "AAPL",
                "02. open": "149.50",
                "03. high": "151.20",
                "04. low": "148.90",
                "05. price": "150.00",
                "06. volume": "1234567",
                "07. latest trading day": "2025-01-17",
                "08. previous close": "148.00",
                "09. change": "2.00",
                "10. change percent": "1.3514%"
            }
        })
    }

    #[tokio::test]
    async fn fetches_and_parses_a_quote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "GLOBAL_QUOTE"))
            .and(query_param("symbol", "AAPL"))
            .and(query_param("apikey", "demo-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = AlphaVantageClient::new(&settings(server.uri())).unwrap();
        let symbol = Symbol::parse("aapl").unwrap();
        let payload = client.global_quote(&symbol).await.unwrap().unwrap();

        assert_eq!(payload.symbol.as_deref(), Some("AAPL"));
        assert_eq!(payload.price.as_deref(), Some("150.00"));
        assert_eq!(payload.change_percent.as_deref(), Some("1.3514%"));
    }

    #[tokio::test]
    async fn empty_payload_is_ok_none_or_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "Global Quote": {} })),
            )
            .mount(&server)
            .await;

        let client = AlphaVantageClient::new(&settings(server.uri())).unwrap();
        let symbol = Symbol::parse("zzzz").unwrap();
        let payload = client.global_quote(&symbol).await.unwrap();

        assert!(payload.is_some_and(|raw| raw.is_empty()));
    }

    #[tokio::test]
    async fn missing_envelope_key_is_ok_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = AlphaVantageClient::new(&settings(server.uri())).unwrap();
        let symbol = Symbol::parse("zzzz").unwrap();

        assert!(client.global_quote(&symbol).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = AlphaVantageClient::new(&settings(server.uri())).unwrap();
        let symbol = Symbol::parse("aapl").unwrap();
        let error = client.global_quote(&symbol).await.unwrap_err();

        assert!(matches!(error, QuoteError::Status { status: 503 }));
        assert_eq!(error.status(), Some(503));
    }

    #[tokio::test]
    async fn malformed_body_is_a_malformed_body_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = AlphaVantageClient::new(&settings(server.uri())).unwrap();
        let symbol = Symbol::parse("aapl").unwrap();
        let error = client.global_quote(&symbol).await.unwrap_err();

        assert!(matches!(error, QuoteError::MalformedBody(_)));
        assert_eq!(error.status(), None);
    }
}
