//! Background workers sharing the store and one cancellation token.
//!
//! - `ingest` - bounded queue and its single consumer
//! - `sync` - periodic exchange rate synchronization
//! - `monitor` - new-currency discovery

pub mod ingest;
pub mod monitor;
pub mod sync;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use currency_types::{Currency, CurrencyRepository, RateFeed};

pub use ingest::{DEFAULT_INGEST_CAPACITY, Entity, IngestError, Ingestor, spawn_ingestor};
pub use monitor::{ChangeMonitor, DEFAULT_MONITOR_INTERVAL};
pub use sync::{
    DEFAULT_MAX_CONCURRENT_SYNCS, DEFAULT_SYNC_INTERVAL, RateSync, SyncError,
    currencies_from_snapshot,
};

/// Tuning knobs for the background workers.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub ingest_capacity: usize,
    pub sync_interval: Duration,
    pub sync_max_concurrent: usize,
    pub monitor_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            ingest_capacity: DEFAULT_INGEST_CAPACITY,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            sync_max_concurrent: DEFAULT_MAX_CONCURRENT_SYNCS,
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
        }
    }
}

/// Handles to the running workers.
pub struct Workers {
    ingestor: Ingestor,
    discoveries: broadcast::Sender<Currency>,
    cancel: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Workers {
    /// Starts the ingestion consumer, the rate sync loop and the change
    /// monitor. The monitor baseline is the store content at this point.
    pub async fn spawn<R: CurrencyRepository>(
        repo: Arc<R>,
        feed: Arc<dyn RateFeed>,
        config: WorkerConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (ingestor, ingest_handle) =
            spawn_ingestor(Arc::clone(&repo), config.ingest_capacity, cancel.clone());

        let monitor = ChangeMonitor::new(Arc::clone(&repo), config.monitor_interval).await;
        let discoveries = monitor.events();
        let monitor_handle = tokio::spawn(monitor.run(cancel.clone()));

        let sync = Arc::new(RateSync::new(
            feed,
            ingestor.clone(),
            config.sync_interval,
            config.sync_max_concurrent,
        ));
        let sync_handle = tokio::spawn(sync.run(cancel.clone()));

        info!(
            ingest_capacity = ingestor.capacity(),
            "Background workers started"
        );

        Self {
            ingestor,
            discoveries,
            cancel,
            handles: vec![
                ("ingest", ingest_handle),
                ("monitor", monitor_handle),
                ("sync", sync_handle),
            ],
        }
    }

    /// Producer handle for the ingestion queue.
    pub fn ingestor(&self) -> Ingestor {
        self.ingestor.clone()
    }

    pub fn subscribe_discoveries(&self) -> broadcast::Receiver<Currency> {
        self.discoveries.subscribe()
    }

    /// Cancels every worker and waits for each to finish.
    ///
    /// The ingestion consumer stores whatever it had already accepted before
    /// it exits.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(worker = name, "Worker terminated abnormally: {}", e);
            }
        }
        info!("Background workers stopped");
    }
}

#[cfg(test)]
mod tests {
    use currency_repo::FileStore;

    use super::*;
    use crate::outbound::StaticRateFeed;

    fn fast_config() -> WorkerConfig {
        WorkerConfig {
            ingest_capacity: 4,
            sync_interval: Duration::from_secs(3600),
            sync_max_concurrent: 3,
            monitor_interval: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_initial_sync_populates_store_and_reports_discoveries() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let workers = Workers::spawn(
            Arc::clone(&store),
            Arc::new(StaticRateFeed::new(0.0)),
            fast_config(),
            CancellationToken::new(),
        )
        .await;
        let mut discoveries = workers.subscribe_discoveries();

        let first = tokio::time::timeout(Duration::from_secs(2), discoveries.recv())
            .await
            .expect("no discovery")
            .unwrap();
        assert!(store.get(&first.code).is_ok());

        for _ in 0..400 {
            let stored = store.currencies();
            if stored.contains_key("RUB") && stored.contains_key("USD") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        workers.shutdown().await;

        let stored = store.currencies();
        assert!(stored.contains_key("RUB"));
        assert!(stored.contains_key("USD"));
    }

    #[tokio::test]
    async fn test_shutdown_closes_ingestion_queue() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let workers = Workers::spawn(
            store,
            Arc::new(StaticRateFeed::new(0.0)),
            fast_config(),
            CancellationToken::new(),
        )
        .await;
        let ingestor = workers.ingestor();

        workers.shutdown().await;

        let late = Currency::new("XAU", 5000.0, "Gold", "Au").unwrap();
        assert_eq!(ingestor.submit(late), Err(IngestError::Closed));
    }
}
