//! Conversion domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::currency::Currency;
use crate::error::DomainError;

/// Unique identifier for a Conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ConversionId(Uuid);

impl ConversionId {
    /// Creates a new random ConversionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converts `amount` units of the source currency into the target currency.
///
/// Both rates are values of one unit in the base currency, so the amount is
/// first expressed in base units and then divided by the target rate:
/// `amount * from_rate / to_rate`.
pub fn convert_amount(amount: f64, from_rate: f64, to_rate: f64) -> Result<f64, DomainError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DomainError::InvalidAmount(amount));
    }
    for rate in [from_rate, to_rate] {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DomainError::InvalidRate(rate));
        }
    }
    Ok(amount * from_rate / to_rate)
}

/// A completed conversion.
///
/// The source and target currencies are copies taken when the conversion was
/// computed, so later rate changes never alter recorded history. Fields are
/// read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Conversion {
    id: ConversionId,
    amount: f64,
    from: Currency,
    to: Currency,
    result: f64,
    created_at: DateTime<Utc>,
}

impl Conversion {
    /// Computes a conversion of `amount` from `from` into `to`.
    pub fn new(amount: f64, from: Currency, to: Currency) -> Result<Self, DomainError> {
        let result = convert_amount(amount, from.rate, to.rate)?;
        Ok(Self {
            id: ConversionId::new(),
            amount,
            from,
            to,
            result,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> ConversionId {
        self.id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Source currency as it was at conversion time.
    pub fn from(&self) -> &Currency {
        &self.from
    }

    /// Target currency as it was at conversion time.
    pub fn to(&self) -> &Currency {
        &self.to
    }

    pub fn result(&self) -> f64 {
        self.result
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl std::fmt::Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2} {} -> {:.2} {}",
            self.amount, self.from.code, self.result, self.to.code
        )
    }
}
