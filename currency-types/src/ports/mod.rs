//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod rate_feed;
mod repository;

pub use rate_feed::{FeedError, RateFeed};
pub use repository::CurrencyRepository;
