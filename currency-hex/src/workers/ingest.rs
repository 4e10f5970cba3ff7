//! Ingestion pipeline: a bounded queue with a single consumer that forwards
//! entities into the store.
//!
//! Producers never wait. A full queue is reported as `IngestError::QueueFull`
//! and the producer decides whether to retry or give up.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use currency_types::{AppError, Conversion, Currency, CurrencyRepository};

/// Default number of entities the queue holds before rejecting producers.
pub const DEFAULT_INGEST_CAPACITY: usize = 10;

/// Anything the pipeline can store.
#[derive(Debug, Clone)]
pub enum Entity {
    Currency(Currency),
    Conversion(Conversion),
}

impl Entity {
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Currency(_) => "currency",
            Entity::Conversion(_) => "conversion",
        }
    }
}

impl From<Currency> for Entity {
    fn from(currency: Currency) -> Self {
        Entity::Currency(currency)
    }
}

impl From<Conversion> for Entity {
    fn from(conversion: Conversion) -> Self {
        Entity::Conversion(conversion)
    }
}

/// Errors returned to producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("ingestion queue is full")]
    QueueFull,

    #[error("ingestion queue is closed")]
    Closed,
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::Unavailable(format!("{}, try again later", err))
    }
}

/// Producer handle for the ingestion queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Ingestor {
    tx: mpsc::Sender<Entity>,
}

impl Ingestor {
    /// Enqueues an entity without waiting.
    pub fn submit(&self, entity: impl Into<Entity>) -> Result<(), IngestError> {
        self.tx.try_send(entity.into()).map_err(|e| match e {
            TrySendError::Full(_) => IngestError::QueueFull,
            TrySendError::Closed(_) => IngestError::Closed,
        })
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Creates the queue and spawns its consumer.
///
/// The consumer stops when `cancel` fires or every `Ingestor` is dropped.
/// On cancellation it closes the queue and still stores everything that was
/// accepted before the close.
pub fn spawn_ingestor<R: CurrencyRepository>(
    repo: Arc<R>,
    capacity: usize,
    cancel: CancellationToken,
) -> (Ingestor, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(consume(repo, rx, cancel));
    (Ingestor { tx }, handle)
}

async fn consume<R: CurrencyRepository>(
    repo: Arc<R>,
    mut rx: mpsc::Receiver<Entity>,
    cancel: CancellationToken,
) {
    info!("Entity processing started");
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Entity processing stopped: cancelled");
                break;
            }
            entity = rx.recv() => match entity {
                Some(entity) => apply(repo.as_ref(), entity).await,
                None => {
                    info!("Entity processing stopped: queue closed");
                    return;
                }
            }
        }
    }

    rx.close();
    let mut drained = 0usize;
    while let Some(entity) = rx.recv().await {
        apply(repo.as_ref(), entity).await;
        drained += 1;
    }
    if drained > 0 {
        info!(drained, "Stored queued entities after shutdown");
    }
}

async fn apply<R: CurrencyRepository>(repo: &R, entity: Entity) {
    debug!(kind = entity.kind(), "Storing entity");
    match entity {
        Entity::Currency(currency) => repo.put_currency(currency).await,
        Entity::Conversion(conversion) => repo.append_conversion(conversion).await,
    }
}
