//! Currency domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// Canonical form of a currency code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A currency known to the registry.
///
/// `rate` is the value of one unit expressed in the base unit, so the base
/// currency itself always has a rate of `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Currency {
    /// Unique currency code
    #[schema(example = "USD")]
    pub code: String,
    /// Value of one unit in the base currency
    #[schema(example = 81.53)]
    pub rate: f64,
    /// Human-readable name
    #[schema(example = "US Dollar")]
    pub name: String,
    /// Display symbol
    #[schema(example = "$")]
    pub symbol: String,
}

impl Currency {
    /// Creates a new currency record.
    ///
    /// # Validation
    /// - Code cannot be empty (it is normalized first)
    /// - Rate must be positive and finite
    pub fn new(
        code: impl AsRef<str>,
        rate: f64,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let currency = Self {
            code: normalize_code(code.as_ref()),
            rate,
            name: name.into(),
            symbol: symbol.into(),
        };
        currency.validate()?;
        Ok(currency)
    }

    /// Checks the record invariants: non-empty code, positive rate.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.code.is_empty() {
            return Err(DomainError::EmptyCode);
        }
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(DomainError::InvalidRate(self.rate));
        }
        Ok(())
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) @ {}", self.code, self.symbol, self.rate)
    }
}
