//! Rate feed port.
//!
//! This trait defines the interface to the external quote source.
//! Implementations can be HTTP clients, static reference tables, mocks, etc.

use exchange_rates::RateSnapshot;

/// Error type for rate feed operations.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Rate feed unavailable: {0}")]
    Unavailable(String),

    #[error("Rate feed returned status {0}")]
    BadStatus(u16),

    #[error("Malformed rate feed response: {0}")]
    Malformed(String),
}

/// Port trait for external rate feeds.
#[async_trait::async_trait]
pub trait RateFeed: Send + Sync + 'static {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Fetches the latest full quote snapshot.
    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FeedError>;
}
