//! # Currency Types
//!
//! Domain types and port traits for the currency registry service.
//! This crate has no IO of its own - only data structures, business rules,
//! and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - Currency and Conversion records, the conversion formula
//! - `ports/` - Traits the store and rate-feed adapters implement
//! - `dto/` - Request bodies for the API boundary
//! - `error/` - Domain, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{Conversion, ConversionId, Currency, convert_amount, normalize_code};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{CurrencyRepository, FeedError, RateFeed};
