//! Periodic exchange rate synchronization.
//!
//! Every tick fetches a full quote snapshot from the configured feed, turns it
//! into `Currency` records and pushes them through the ingestion queue. A
//! limiter bounds how many syncs may be in flight; a tick that finds no free
//! slot is dropped rather than queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use currency_types::{Currency, FeedError, RateFeed};
use exchange_rates::{BASE_CODE, BASE_NAME, BASE_RATE, BASE_SYMBOL, RateSnapshot, symbol_for};

use super::ingest::{IngestError, Ingestor};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_CONCURRENT_SYNCS: usize = 3;

/// Pause between attempts when the ingestion queue is full.
const SUBMIT_RETRY_DELAY: Duration = Duration::from_millis(10);
const SUBMIT_MAX_ATTEMPTS: u32 = 50;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("ingestion queue closed")]
    QueueClosed,

    #[error("sync cancelled")]
    Cancelled,
}

/// Builds the full currency set for a snapshot.
///
/// The base currency comes first and is always present, whatever the feed
/// says about it. Quotes that cannot yield a positive rate are skipped.
pub fn currencies_from_snapshot(snapshot: &RateSnapshot) -> Vec<Currency> {
    let mut currencies = Vec::with_capacity(snapshot.len() + 1);
    currencies.push(Currency {
        code: BASE_CODE.to_string(),
        rate: BASE_RATE,
        name: BASE_NAME.to_string(),
        symbol: BASE_SYMBOL.to_string(),
    });

    for (code, quote) in &snapshot.rates {
        if code.eq_ignore_ascii_case(BASE_CODE) {
            continue;
        }
        let Some(rate) = quote.unit_rate() else {
            warn!(
                code = %code,
                nominal = quote.nominal,
                value = quote.value,
                "Skipping quote with non-positive nominal or value"
            );
            continue;
        };
        match Currency::new(code, rate, quote.name.clone(), symbol_for(code)) {
            Ok(currency) => currencies.push(currency),
            Err(e) => warn!(code = %code, "Skipping invalid quote: {}", e),
        }
    }

    currencies
}

/// The rate sync loop.
pub struct RateSync {
    feed: Arc<dyn RateFeed>,
    ingestor: Ingestor,
    limiter: Arc<Semaphore>,
    interval: Duration,
}

impl RateSync {
    pub fn new(
        feed: Arc<dyn RateFeed>,
        ingestor: Ingestor,
        interval: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            feed,
            ingestor,
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            interval,
        }
    }

    /// Runs one sync immediately, then one per interval until `cancel` fires.
    ///
    /// In-flight syncs are awaited before returning; they see the same token
    /// and stop early.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!(
            feed = self.feed.name(),
            interval_secs = self.interval.as_secs_f64(),
            "Rate sync started"
        );

        let mut in_flight = JoinSet::new();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_join(joined);
                }
                // The first tick completes immediately.
                _ = ticker.tick() => {
                    self.dispatch(&mut in_flight, &cancel);
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
        info!("Rate sync stopped");
    }

    /// Starts a sync if the limiter has a free slot. Returns whether it did.
    fn dispatch(
        self: &Arc<Self>,
        in_flight: &mut JoinSet<Result<usize, SyncError>>,
        cancel: &CancellationToken,
    ) -> bool {
        let permit = match Arc::clone(&self.limiter).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(
                    feed = self.feed.name(),
                    "Skipping rate sync: too many syncs in flight"
                );
                return false;
            }
        };

        let this = Arc::clone(self);
        let cancel = cancel.clone();
        in_flight.spawn(async move {
            let _permit = permit;
            this.sync_once(&cancel).await
        });
        true
    }

    /// Fetches one snapshot and submits every resulting currency.
    ///
    /// Returns how many records were accepted by the queue.
    #[tracing::instrument(skip_all, fields(feed = %self.feed.name()))]
    pub async fn sync_once(&self, cancel: &CancellationToken) -> Result<usize, SyncError> {
        let snapshot = tokio::select! {
            _ = cancel.cancelled() => return Err(SyncError::Cancelled),
            fetched = self.feed.fetch_snapshot() => fetched?,
        };
        debug!(quotes = snapshot.len(), "Fetched rate snapshot");

        let mut accepted = 0usize;
        for currency in currencies_from_snapshot(&snapshot) {
            if self.submit_with_retry(currency, cancel).await? {
                accepted += 1;
            }
        }

        info!(accepted, "Exchange rates synchronized");
        Ok(accepted)
    }

    /// Submits one record, backing off while the queue is full.
    ///
    /// `Ok(false)` means the record was dropped after the last attempt.
    async fn submit_with_retry(
        &self,
        currency: Currency,
        cancel: &CancellationToken,
    ) -> Result<bool, SyncError> {
        for _ in 0..SUBMIT_MAX_ATTEMPTS {
            match self.ingestor.submit(currency.clone()) {
                Ok(()) => return Ok(true),
                Err(IngestError::Closed) => return Err(SyncError::QueueClosed),
                Err(IngestError::QueueFull) => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                        _ = tokio::time::sleep(SUBMIT_RETRY_DELAY) => {}
                    }
                }
            }
        }
        warn!(code = %currency.code, "Dropping rate update: ingestion queue stayed full");
        Ok(false)
    }
}

fn log_join(joined: Result<Result<usize, SyncError>, tokio::task::JoinError>) {
    match joined {
        Ok(Ok(_)) | Ok(Err(SyncError::Cancelled)) => {}
        Ok(Err(e)) => error!("Failed to sync exchange rates: {}", e),
        Err(e) if e.is_panic() => error!("Rate sync panicked: {}", e),
        Err(e) => error!("Rate sync task failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use currency_repo::FileStore;
    use currency_types::CurrencyRepository;
    use exchange_rates::QuotedRate;
    use tokio::sync::Notify;

    use super::*;
    use crate::workers::ingest::spawn_ingestor;

    fn snapshot() -> RateSnapshot {
        let mut snapshot = RateSnapshot::default();
        snapshot
            .rates
            .insert("USD".into(), QuotedRate::new(1.0, 90.0, "US Dollar"));
        snapshot
            .rates
            .insert("JPY".into(), QuotedRate::new(100.0, 60.0, "Japanese Yen"));
        snapshot
            .rates
            .insert("ZZZ".into(), QuotedRate::new(1.0, 2.0, "Unlisted"));
        snapshot
            .rates
            .insert("BAD".into(), QuotedRate::new(0.0, 5.0, "Broken"));
        snapshot
    }

    /// Feed returning `snapshot()`, panicking or failing on selected calls.
    struct ScriptedFeed {
        calls: AtomicUsize,
        panic_on_first: bool,
        fail: bool,
    }

    impl ScriptedFeed {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                panic_on_first: false,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl RateFeed for ScriptedFeed {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_snapshot(&self) -> Result<RateSnapshot, FeedError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic_on_first && call == 0 {
                panic!("feed exploded");
            }
            if self.fail {
                return Err(FeedError::BadStatus(502));
            }
            Ok(snapshot())
        }
    }

    /// Feed that never answers until released.
    struct StalledFeed {
        release: Notify,
    }

    #[async_trait]
    impl RateFeed for StalledFeed {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn fetch_snapshot(&self) -> Result<RateSnapshot, FeedError> {
            self.release.notified().await;
            Ok(RateSnapshot::default())
        }
    }

    async fn wait_for_codes(store: &FileStore, expected: usize) {
        for _ in 0..400 {
            if store.list_currencies().await.len() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("store never reached {} currencies", expected);
    }

    #[test]
    fn test_snapshot_mapping() {
        let currencies = currencies_from_snapshot(&snapshot());

        assert_eq!(currencies[0].code, "RUB");
        assert_eq!(currencies[0].rate, 1.0);
        assert_eq!(currencies[0].symbol, "₽");

        let jpy = currencies.iter().find(|c| c.code == "JPY").unwrap();
        assert!((jpy.rate - 0.6).abs() < 1e-12);
        assert_eq!(jpy.symbol, "¥");

        let zzz = currencies.iter().find(|c| c.code == "ZZZ").unwrap();
        assert_eq!(zzz.symbol, "ZZZ");

        assert!(currencies.iter().all(|c| c.code != "BAD"));
        assert_eq!(currencies.len(), 4);
    }

    #[test]
    fn test_feed_cannot_override_base_currency() {
        let mut snapshot = RateSnapshot::default();
        snapshot
            .rates
            .insert("RUB".into(), QuotedRate::new(1.0, 42.0, "Rouble"));

        let currencies = currencies_from_snapshot(&snapshot);

        assert_eq!(currencies.len(), 1);
        assert_eq!(currencies[0].rate, 1.0);
        assert_eq!(currencies[0].name, "Russian Ruble");
    }

    #[tokio::test]
    async fn test_sync_once_stores_every_currency() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let cancel = CancellationToken::new();
        // Smaller than the record count so the retry path is exercised.
        let (ingestor, consumer) = spawn_ingestor(Arc::clone(&store), 1, cancel.clone());
        let sync = RateSync::new(
            Arc::new(ScriptedFeed::ok()),
            ingestor,
            Duration::from_secs(3600),
            1,
        );

        let accepted = sync.sync_once(&cancel).await.unwrap();

        assert_eq!(accepted, 4);
        wait_for_codes(&store, 4).await;
        let usd = store.get("USD").unwrap();
        assert_eq!(usd.rate, 90.0);
        assert_eq!(usd.symbol, "$");

        cancel.cancel();
        consumer.await.unwrap();
    }

    #[tokio::test]
    async fn test_feed_failure_keeps_previous_rates() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        store.put(Currency::new("USD", 75.0, "US Dollar", "$").unwrap());
        let cancel = CancellationToken::new();
        let (ingestor, consumer) = spawn_ingestor(Arc::clone(&store), 10, cancel.clone());
        let feed = ScriptedFeed {
            fail: true,
            ..ScriptedFeed::ok()
        };
        let sync = RateSync::new(Arc::new(feed), ingestor, Duration::from_secs(3600), 1);

        let result = sync.sync_once(&cancel).await;

        assert!(matches!(result, Err(SyncError::Feed(FeedError::BadStatus(502)))));
        assert_eq!(store.get("USD").unwrap().rate, 75.0);

        cancel.cancel();
        consumer.await.unwrap();
    }

    #[tokio::test]
    async fn test_panicking_sync_does_not_stop_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let cancel = CancellationToken::new();
        let (ingestor, consumer) = spawn_ingestor(Arc::clone(&store), 10, cancel.clone());
        let feed = Arc::new(ScriptedFeed {
            panic_on_first: true,
            ..ScriptedFeed::ok()
        });
        let sync = Arc::new(RateSync::new(
            feed.clone(),
            ingestor,
            Duration::from_millis(20),
            3,
        ));

        let runner = tokio::spawn(sync.run(cancel.clone()));
        wait_for_codes(&store, 4).await;
        assert!(feed.calls.load(Ordering::SeqCst) >= 2);

        cancel.cancel();
        runner.await.unwrap();
        consumer.await.unwrap();
    }

    #[tokio::test]
    async fn test_tick_is_skipped_when_limiter_is_exhausted() {
        let cancel = CancellationToken::new();
        let (ingestor, _rx_guard) = {
            let dir = tempfile::tempdir().unwrap();
            let store = Arc::new(FileStore::new(dir.path()));
            spawn_ingestor(store, 10, cancel.clone())
        };
        let feed = Arc::new(StalledFeed {
            release: Notify::new(),
        });
        let sync = Arc::new(RateSync::new(feed, ingestor, Duration::from_secs(3600), 1));
        let mut in_flight = JoinSet::new();

        assert!(sync.dispatch(&mut in_flight, &cancel));
        assert!(!sync.dispatch(&mut in_flight, &cancel));
        assert_eq!(in_flight.len(), 1);

        cancel.cancel();
        let joined = in_flight.join_next().await.unwrap().unwrap();
        assert!(matches!(joined, Err(SyncError::Cancelled)));

        // The slot is free again once the sync has finished.
        let fresh = CancellationToken::new();
        assert!(sync.dispatch(&mut in_flight, &fresh));
        fresh.cancel();
    }

    #[tokio::test]
    async fn test_cancel_interrupts_stalled_sync() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let cancel = CancellationToken::new();
        let (ingestor, consumer) = spawn_ingestor(store, 10, cancel.clone());
        let sync = Arc::new(RateSync::new(
            Arc::new(StalledFeed {
                release: Notify::new(),
            }),
            ingestor,
            Duration::from_secs(3600),
            3,
        ));

        let runner = tokio::spawn(sync.run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), runner)
            .await
            .expect("sync loop did not stop")
            .unwrap();
        consumer.await.unwrap();
    }
}
