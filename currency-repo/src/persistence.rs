//! Snapshot files backing the store.
//!
//! Each entity kind lives in its own pretty-printed JSON file that is
//! rewritten wholesale on every save. Writes go to a `.tmp` sibling first and
//! are then renamed over the target.
//!
//! # File Structure
//!
//! ```text
//! {data_dir}/
//!   ├── currency.json     (object: code -> currency)
//!   └── conversion.json   (array, creation order)
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use currency_types::{Conversion, Currency};

pub const CURRENCY_FILE: &str = "currency.json";
pub const CONVERSION_FILE: &str = "conversion.json";

/// Errors raised while reading or writing snapshot files.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Location of the two snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotFiles {
    dir: PathBuf,
}

impl SnapshotFiles {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn currencies_path(&self) -> PathBuf {
        self.dir.join(CURRENCY_FILE)
    }

    pub fn conversions_path(&self) -> PathBuf {
        self.dir.join(CONVERSION_FILE)
    }

    /// Overwrites the currency file with the full mapping.
    pub fn write_currencies(
        &self,
        currencies: &HashMap<String, Currency>,
    ) -> Result<(), PersistenceError> {
        // Sorted keys keep the file stable between writes.
        let ordered: BTreeMap<&String, &Currency> = currencies.iter().collect();
        self.write_json(&self.currencies_path(), &ordered)
    }

    /// Overwrites the conversion file with the full history.
    pub fn write_conversions(&self, conversions: &[Conversion]) -> Result<(), PersistenceError> {
        self.write_json(&self.conversions_path(), &conversions)
    }

    /// Reads the currency file. `Ok(None)` when it does not exist yet.
    pub fn read_currencies(&self) -> Result<Option<HashMap<String, Currency>>, PersistenceError> {
        self.read_json(&self.currencies_path())
    }

    /// Reads the conversion file. `Ok(None)` when it does not exist yet.
    pub fn read_conversions(&self) -> Result<Option<Vec<Conversion>>, PersistenceError> {
        self.read_json(&self.conversions_path())
    }

    fn ensure_dir(&self) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), PersistenceError> {
        self.ensure_dir()?;

        let bytes = serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, bytes).map_err(|source| PersistenceError::Io {
            path: temp_path.clone(),
            source,
        })?;

        // Atomic rename
        fs::rename(&temp_path, path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Saved snapshot to {}", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, PersistenceError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.ensure_dir()?;
                return Ok(None);
            }
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let value = serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Loaded snapshot from {}", path.display());
        Ok(Some(value))
    }
}
