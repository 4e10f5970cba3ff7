use async_trait::async_trait;

use currency_types::{FeedError, RateFeed};
use exchange_rates::{RateSnapshot, reference_snapshot};

/// Offline feed serving the built-in reference quotes.
///
/// A non-zero `variance_percent` jitters every value on each fetch so that
/// successive syncs produce visible rate changes.
#[derive(Debug, Clone, Default)]
pub struct StaticRateFeed {
    variance_percent: f64,
}

impl StaticRateFeed {
    pub fn new(variance_percent: f64) -> Self {
        Self {
            variance_percent: variance_percent.max(0.0),
        }
    }
}

#[async_trait]
impl RateFeed for StaticRateFeed {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FeedError> {
        Ok(reference_snapshot(self.variance_percent))
    }
}
