//! # Currency Repository
//!
//! Concrete store implementation (adapter) for the currency service.
//! `FileStore` keeps the registry in memory behind a read/write lock and
//! mirrors every mutation to a JSON snapshot file per entity kind.

pub mod persistence;
pub mod store;


pub use persistence::{PersistenceError, SnapshotFiles};
pub use store::{FileStore, open_store};
