//! Central Bank of Russia daily JSON feed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use currency_types::{FeedError, RateFeed};
use exchange_rates::RateSnapshot;

pub const DEFAULT_CBR_URL: &str = "https://www.cbr-xml-daily.ru/daily_json.js";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the CBR daily quotes document.
#[derive(Debug, Clone)]
pub struct CbrClient {
    url: String,
    http: Client,
}

impl CbrClient {
    pub fn new(url: impl Into<String>) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

/// Decodes a CBR daily document.
pub fn parse_snapshot(body: &[u8]) -> Result<RateSnapshot, FeedError> {
    serde_json::from_slice(body).map_err(|e| FeedError::Malformed(e.to_string()))
}

#[async_trait]
impl RateFeed for CbrClient {
    fn name(&self) -> &str {
        "cbr"
    }

    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FeedError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::BadStatus(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        let snapshot = parse_snapshot(&body)?;
        debug!(url = %self.url, quotes = snapshot.len(), "Fetched CBR snapshot");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;

    const SAMPLE: &str = r#"{
        "Date": "2024-05-01T11:30:00+03:00",
        "PreviousDate": "2024-04-27T11:30:00+03:00",
        "Timestamp": "2024-04-30T20:00:00+03:00",
        "Valute": {
            "USD": {"ID": "R01235", "NumCode": "840", "CharCode": "USD", "Nominal": 1, "Name": "US Dollar", "Value": 93.4409, "Previous": 92.0226},
            "JPY": {"ID": "R01820", "NumCode": "392", "CharCode": "JPY", "Nominal": 100, "Name": "Japanese Yen", "Value": 59.4585, "Previous": 59.0321}
        }
    }"#;

    /// Serves `SAMPLE` on `/ok`, a 503 on `/down` and garbage on `/junk`.
    async fn serve_fixture() -> String {
        let app = Router::new()
            .route("/ok", get(|| async { SAMPLE }))
            .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route("/junk", get(|| async { "<html>maintenance</html>" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_parse_sample_document() {
        let snapshot = parse_snapshot(SAMPLE.as_bytes()).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.date.is_some());
        let jpy = &snapshot.rates["JPY"];
        assert_eq!(jpy.nominal, 100.0);
        assert!((jpy.unit_rate().unwrap() - 0.594585).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fetch_snapshot() {
        let base = serve_fixture().await;
        let client = CbrClient::new(format!("{}/ok", base)).unwrap();

        let snapshot = client.fetch_snapshot().await.unwrap();

        assert_eq!(snapshot.rates["USD"].value, 93.4409);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let base = serve_fixture().await;
        let client = CbrClient::new(format!("{}/down", base)).unwrap();

        let result = client.fetch_snapshot().await;

        assert!(matches!(result, Err(FeedError::BadStatus(503))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let base = serve_fixture().await;
        let client = CbrClient::new(format!("{}/junk", base)).unwrap();

        let result = client.fetch_snapshot().await;

        assert!(matches!(result, Err(FeedError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = CbrClient::new(format!("http://{}/daily_json.js", addr)).unwrap();

        let result = client.fetch_snapshot().await;

        assert!(matches!(result, Err(FeedError::Unavailable(_))));
    }
}
