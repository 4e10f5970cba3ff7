//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─────────────────────────────────────────────────────────────────────────────
// Currency DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCurrencyRequest {
    /// Currency code, normalized to upper case
    #[schema(example = "USD")]
    pub code: String,
    /// Value of one unit in the base currency
    #[schema(example = 81.53)]
    pub rate: f64,
    #[schema(example = "US Dollar")]
    pub name: String,
    #[schema(example = "$")]
    pub symbol: String,
}

/// Request to replace an existing currency. The code comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCurrencyRequest {
    /// Ignored when present; the path code wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[schema(example = 82.1)]
    pub rate: f64,
    #[schema(example = "US Dollar")]
    pub name: String,
    #[schema(example = "$")]
    pub symbol: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to convert an amount between two currencies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionRequest {
    /// Amount in the source currency
    #[schema(example = 100.0)]
    pub amount: f64,
    /// Source currency code
    #[schema(example = "USD")]
    pub from: String,
    /// Target currency code
    #[schema(example = "EUR")]
    pub to: String,
}
