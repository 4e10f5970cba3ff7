//! Thread-safe currency store mirrored to snapshot files.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{error, info, warn};

use currency_types::{Conversion, Currency, CurrencyRepository, RepoError, normalize_code};

use crate::persistence::{PersistenceError, SnapshotFiles};

#[derive(Default)]
struct StoreState {
    currencies: HashMap<String, Currency>,
    conversions: Vec<Conversion>,
}

/// In-memory currency registry and conversion history.
///
/// A single read/write lock guards both collections. Every mutation rewrites
/// the affected snapshot file while the write lock is still held, so files
/// are written in mutation order. A failed write is logged and the in-memory
/// change is kept; after such a failure the files may lag behind memory.
///
/// Flushes are blocking `std::fs` calls made on the caller's thread. Each
/// snapshot is a few kilobytes, so a rewrite per mutation stays well below a
/// scheduler tick even for a full rate sync.
pub struct FileStore {
    state: RwLock<StoreState>,
    files: SnapshotFiles,
}

impl FileStore {
    /// Creates an empty store backed by `data_dir`. Does not touch the disk.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            files: SnapshotFiles::new(data_dir),
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.files.dir()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Loading & Saving
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replaces the in-memory currencies with the currency file contents.
    ///
    /// Records are re-keyed by their normalized code; records that fail
    /// validation are skipped with a warning. A missing file leaves the store
    /// untouched and returns `Ok(0)`. On error the in-memory state is left as
    /// it was.
    pub fn load_currencies(&self) -> Result<usize, PersistenceError> {
        let Some(stored) = self.files.read_currencies()? else {
            return Ok(0);
        };

        let mut currencies = HashMap::with_capacity(stored.len());
        for (key, mut currency) in stored {
            currency.code = normalize_code(&currency.code);
            if let Err(e) = currency.validate() {
                warn!(key = %key, "Skipping invalid stored currency: {}", e);
                continue;
            }
            if key != currency.code {
                warn!(key = %key, code = %currency.code, "Stored currency key does not match its code, using the code");
            }
            currencies.insert(currency.code.clone(), currency);
        }

        let count = currencies.len();
        self.state.write().currencies = currencies;
        Ok(count)
    }

    /// Replaces the in-memory history with the conversion file contents.
    pub fn load_conversions(&self) -> Result<usize, PersistenceError> {
        let Some(conversions) = self.files.read_conversions()? else {
            return Ok(0);
        };
        let count = conversions.len();
        self.state.write().conversions = conversions;
        Ok(count)
    }

    /// Writes the current currency mapping to disk.
    pub fn save_currencies(&self) -> Result<(), PersistenceError> {
        let state = self.state.read();
        self.files.write_currencies(&state.currencies)
    }

    /// Writes the current conversion history to disk.
    pub fn save_conversions(&self) -> Result<(), PersistenceError> {
        let state = self.state.read();
        self.files.write_conversions(&state.conversions)
    }

    fn flush_currencies(&self, state: &StoreState) {
        if let Err(e) = self.files.write_currencies(&state.currencies) {
            error!("Failed to persist currencies: {}", e);
        }
    }

    fn flush_conversions(&self, state: &StoreState) {
        if let Err(e) = self.files.write_conversions(&state.conversions) {
            error!("Failed to persist conversions: {}", e);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Currency Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts or replaces a currency by code.
    pub fn put(&self, currency: Currency) {
        let mut state = self.state.write();
        state.currencies.insert(currency.code.clone(), currency);
        self.flush_currencies(&state);
    }

    pub fn get(&self, code: &str) -> Result<Currency, RepoError> {
        self.state
            .read()
            .currencies
            .get(code)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(code.to_string()))
    }

    /// Replaces an existing currency.
    pub fn update(&self, currency: Currency) -> Result<(), RepoError> {
        let mut state = self.state.write();
        match state.currencies.get_mut(&currency.code) {
            Some(slot) => *slot = currency,
            None => return Err(RepoError::NotFound(currency.code)),
        }
        self.flush_currencies(&state);
        Ok(())
    }

    pub fn delete(&self, code: &str) -> Result<(), RepoError> {
        let mut state = self.state.write();
        if state.currencies.remove(code).is_none() {
            return Err(RepoError::NotFound(code.to_string()));
        }
        self.flush_currencies(&state);
        Ok(())
    }

    /// Copy of every currency keyed by code.
    pub fn currencies(&self) -> HashMap<String, Currency> {
        self.state.read().currencies.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion History
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn append_conversion(&self, conversion: Conversion) {
        let mut state = self.state.write();
        state.conversions.push(conversion);
        self.flush_conversions(&state);
    }

    /// Copy of the history in creation order.
    pub fn conversions(&self) -> Vec<Conversion> {
        self.state.read().conversions.clone()
    }
}

/// Builds a store for `data_dir` and restores both snapshot files.
///
/// Load failures are logged, not returned: the store then starts with
/// whatever could be read (typically nothing).
pub fn open_store(data_dir: impl AsRef<Path>) -> FileStore {
    let store = FileStore::new(data_dir);

    match store.load_currencies() {
        Ok(count) => info!("Loaded {} currencies from {}", count, store.data_dir().display()),
        Err(e) => error!("Failed to load currency data: {}", e),
    }
    match store.load_conversions() {
        Ok(count) => info!("Loaded {} conversions from {}", count, store.data_dir().display()),
        Err(e) => error!("Failed to load conversion data: {}", e),
    }

    store
}

// ─────────────────────────────────────────────────────────────────────────────
// Implement CurrencyRepository for FileStore
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for FileStore {
    async fn put_currency(&self, currency: Currency) {
        self.put(currency)
    }

    async fn get_currency(&self, code: &str) -> Result<Currency, RepoError> {
        self.get(code)
    }

    async fn update_currency(&self, currency: Currency) -> Result<(), RepoError> {
        self.update(currency)
    }

    async fn delete_currency(&self, code: &str) -> Result<(), RepoError> {
        self.delete(code)
    }

    async fn list_currencies(&self) -> HashMap<String, Currency> {
        self.currencies()
    }

    async fn append_conversion(&self, conversion: Conversion) {
        self.append_conversion(conversion)
    }

    async fn list_conversions(&self) -> Vec<Conversion> {
        self.conversions()
    }
}
