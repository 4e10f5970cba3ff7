//! Watches the store for currency codes that were not there before.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use currency_types::{Currency, CurrencyRepository};

pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_millis(200);

const EVENT_BUFFER: usize = 64;

/// Polls the store and reports each new code exactly once.
///
/// Codes are never removed from `seen`, so a deleted and recreated currency
/// is not reported again.
pub struct ChangeMonitor<R: CurrencyRepository> {
    repo: Arc<R>,
    seen: HashSet<String>,
    interval: Duration,
    events: broadcast::Sender<Currency>,
}

impl<R: CurrencyRepository> ChangeMonitor<R> {
    /// Takes the current code set as the baseline.
    pub async fn new(repo: Arc<R>, interval: Duration) -> Self {
        let seen: HashSet<String> = repo
            .list_currencies()
            .await
            .into_values()
            .map(|c| c.code)
            .collect();
        debug!(baseline = seen.len(), "Change monitor baseline taken");
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            repo,
            seen,
            interval,
            events,
        }
    }

    /// Receives every discovery made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Currency> {
        self.events.subscribe()
    }

    /// Handle for subscribing after the monitor has been moved into its task.
    pub fn events(&self) -> broadcast::Sender<Currency> {
        self.events.clone()
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    /// Compares one fresh snapshot against `seen`. Returns the new currencies
    /// sorted by code.
    pub async fn poll(&mut self) -> Vec<Currency> {
        let mut discovered: Vec<Currency> = self
            .repo
            .list_currencies()
            .await
            .into_values()
            .filter(|c| !self.seen.contains(&c.code))
            .collect();
        discovered.sort_by(|a, b| a.code.cmp(&b.code));

        for currency in &discovered {
            info!(
                code = %currency.code,
                name = %currency.name,
                rate = currency.rate,
                symbol = %currency.symbol,
                "New currency detected"
            );
            self.seen.insert(currency.code.clone());
            // No subscribers is fine.
            let _ = self.events.send(currency.clone());
        }

        discovered
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Change monitor started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll().await;
                }
            }
        }
        info!("Change monitor stopped");
    }
}
