//! Outbound adapters implementing the `RateFeed` port.

mod cbr;
mod reference;

pub use cbr::{CbrClient, DEFAULT_CBR_URL, parse_snapshot};
pub use reference::StaticRateFeed;
