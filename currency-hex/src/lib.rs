//! # Currency Hex
//!
//! Application service, background workers and adapters for the currency
//! service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (orchestrates domain operations)
//! - `workers/` - Ingestion queue, rate sync loop, change monitor
//! - `inbound/` - HTTP adapter (Axum server)
//! - `outbound/` - Rate feed adapters (CBR over HTTP, static reference quotes)
//!
//! The service is generic over `R: CurrencyRepository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod outbound;
pub mod service;
pub mod workers;


pub use service::{CurrencyService, WriteMode};
pub use workers::{WorkerConfig, Workers};
