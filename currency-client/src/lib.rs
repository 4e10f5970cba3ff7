//! # Currency Client SDK
//!
//! A typed Rust client for the Currency API.

use std::collections::HashMap;

use currency_types::{
    Conversion, ConversionRequest, CreateCurrencyRequest, Currency, UpdateCurrencyRequest,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// True for a 404 from the API.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

/// Currency API client.
pub struct CurrencyClient {
    base_url: String,
    http: Client,
}

impl CurrencyClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Currencies
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates or replaces a currency.
    pub async fn create_currency(
        &self,
        code: &str,
        rate: f64,
        name: &str,
        symbol: &str,
    ) -> Result<Currency, ClientError> {
        let req = CreateCurrencyRequest {
            code: code.to_string(),
            rate,
            name: name.to_string(),
            symbol: symbol.to_string(),
        };
        self.send(self.http.post(self.url("/currency")).json(&req))
            .await
    }

    /// Gets a currency by code.
    pub async fn get_currency(&self, code: &str) -> Result<Currency, ClientError> {
        self.send(self.http.get(self.url(&format!("/currency/{}", code))))
            .await
    }

    /// Lists every currency keyed by code.
    pub async fn list_currencies(&self) -> Result<HashMap<String, Currency>, ClientError> {
        self.send(self.http.get(self.url("/currencies"))).await
    }

    /// Replaces an existing currency.
    pub async fn update_currency(
        &self,
        code: &str,
        rate: f64,
        name: &str,
        symbol: &str,
    ) -> Result<Currency, ClientError> {
        let req = UpdateCurrencyRequest {
            code: None,
            rate,
            name: name.to_string(),
            symbol: symbol.to_string(),
        };
        self.send(
            self.http
                .put(self.url(&format!("/currency/{}", code)))
                .json(&req),
        )
        .await
    }

    /// Deletes a currency.
    pub async fn delete_currency(&self, code: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/currency/{}", code)))
            .send()
            .await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(api_error(resp).await)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts an amount and records it server side.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion, ClientError> {
        let req = ConversionRequest {
            amount,
            from: from.to_string(),
            to: to.to_string(),
        };
        self.send(self.http.post(self.url("/conversion")).json(&req))
            .await
    }

    /// Lists recorded conversions, oldest first.
    pub async fn list_conversions(&self) -> Result<Vec<Conversion>, ClientError> {
        self.send(self.http.get(self.url("/conversions"))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        if resp.status().is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(api_error(resp).await)
        }
    }
}

/// Builds an `Api` error, preferring the `error` field of a JSON body.
async fn api_error(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body);
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CurrencyClient::new("http://localhost:8080");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CurrencyClient::new("http://localhost:8080/");
        assert_eq!(client.url("/currencies"), "http://localhost:8080/currencies");
    }

    #[test]
    fn test_not_found_detection() {
        let err = ClientError::Api {
            status: 404,
            message: "Currency not found: XYZ".into(),
        };
        assert!(err.is_not_found());
        assert!(
            !ClientError::Api {
                status: 503,
                message: String::new()
            }
            .is_not_found()
        );
    }
}
