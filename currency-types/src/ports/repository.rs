//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! The file-backed store in `currency-repo` implements it; tests use
//! in-memory mocks.

use std::collections::HashMap;

use crate::domain::{Conversion, Currency};
use crate::error::RepoError;

/// The entity store port.
///
/// Every call is atomic with respect to every other call. Readers get owned
/// copies, never references into the store. Mutations that succeed in memory
/// report success even when mirroring them to durable storage fails.
#[async_trait::async_trait]
pub trait CurrencyRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Currency Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts or replaces a currency by code.
    async fn put_currency(&self, currency: Currency);

    /// Gets a currency by code.
    async fn get_currency(&self, code: &str) -> Result<Currency, RepoError>;

    /// Replaces an existing currency. Fails with `NotFound` if absent.
    async fn update_currency(&self, currency: Currency) -> Result<(), RepoError>;

    /// Deletes a currency. Fails with `NotFound` if absent.
    async fn delete_currency(&self, code: &str) -> Result<(), RepoError>;

    /// Snapshot of every currency keyed by code.
    async fn list_currencies(&self) -> HashMap<String, Currency>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion History (append-only)
    // ─────────────────────────────────────────────────────────────────────────────

    /// Appends a conversion to the history.
    async fn append_conversion(&self, conversion: Conversion);

    /// Snapshot of the history in creation order.
    async fn list_conversions(&self) -> Vec<Conversion>;
}
