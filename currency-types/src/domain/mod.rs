//! Domain models for the currency service.

pub mod conversion;
pub mod currency;

pub use conversion::{Conversion, ConversionId, convert_amount};
pub use currency::{Currency, normalize_code};
