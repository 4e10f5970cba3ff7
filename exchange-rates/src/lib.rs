//! Exchange Rate Feed Types and Reference Data
//!
//! This library holds everything the currency service knows about the
//! external rate feed without doing any IO:
//!
//! - the wire shape of a daily quote snapshot (`RateSnapshot`, `QuotedRate`),
//!   matching the CBR daily JSON document,
//! - the synthetic base currency every rate is quoted against,
//! - a static symbol table generated by `define_symbols!`,
//! - a small set of hard-coded reference quotes for offline runs.
//!
//! # Adding a New Symbol
//! Add a line to the `define_symbols!` invocation:
//! ```ignore
//! define_symbols! {
//!     // ... existing symbols ...
//!     "ISK" => "kr",
//! }
//! ```
//!
//! # Example
//! ```
//! use exchange_rates::{reference_snapshot, symbol_for, BASE_CODE};
//!
//! assert_eq!(symbol_for("USD"), "$");
//! assert_eq!(symbol_for("XYZ"), "XYZ");
//!
//! let snapshot = reference_snapshot(0.0);
//! let usd = &snapshot.rates["USD"];
//! assert!(usd.unit_rate().unwrap() > 0.0);
//! assert_eq!(BASE_CODE, "RUB");
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Base Currency
// ─────────────────────────────────────────────────────────────────────────────

/// Code of the base unit all feed rates are quoted against.
pub const BASE_CODE: &str = "RUB";
/// Display name of the base unit.
pub const BASE_NAME: &str = "Russian Ruble";
/// Display symbol of the base unit.
pub const BASE_SYMBOL: &str = "₽";
/// Rate of the base unit against itself.
pub const BASE_RATE: f64 = 1.0;

// ─────────────────────────────────────────────────────────────────────────────
// Feed Wire Types
// ─────────────────────────────────────────────────────────────────────────────

/// A single quote from the feed.
///
/// The feed quotes `value` base units per `nominal` units of the currency,
/// so the price of one unit is `value / nominal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedRate {
    #[serde(rename = "Nominal")]
    pub nominal: f64,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Name")]
    pub name: String,
}

impl QuotedRate {
    pub fn new(nominal: f64, value: f64, name: impl Into<String>) -> Self {
        Self {
            nominal,
            value,
            name: name.into(),
        }
    }

    /// Value of one unit in the base currency.
    ///
    /// Returns `None` when the quote cannot produce a positive finite rate.
    pub fn unit_rate(&self) -> Option<f64> {
        if self.nominal <= 0.0 || self.value <= 0.0 {
            return None;
        }
        let rate = self.value / self.nominal;
        rate.is_finite().then_some(rate)
    }
}

/// A full quote snapshot as published by the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// Publication date, when the feed provides one.
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<FixedOffset>>,
    /// Quotes keyed by currency code.
    #[serde(rename = "Valute", default)]
    pub rates: BTreeMap<String, QuotedRate>,
}

impl RateSnapshot {
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the static symbol table
// ─────────────────────────────────────────────────────────────────────────────

/// Defines the static code -> symbol table.
///
/// Generates `symbol_for`, which falls back to the code itself for anything
/// not listed.
#[macro_export]
macro_rules! define_symbols {
    (
        $( $code:literal => $symbol:literal ),* $(,)?
    ) => {
        /// Display symbol for `code`, or the code itself when unknown.
        pub fn symbol_for(code: &str) -> &str {
            match code {
                $($code => $symbol,)*
                other => other,
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// SYMBOL DEFINITIONS - Add new symbols here!
// ─────────────────────────────────────────────────────────────────────────────

define_symbols! {
    "AUD" => "A$",
    "AZN" => "₼",
    "DZD" => "د.ج",
    "GBP" => "£",
    "AMD" => "֏",
    "BHD" => ".ب.د",
    "BYN" => "Br",
    "BGN" => "лв",
    "BOB" => "Bs.",
    "BRL" => "R$",
    "HUF" => "Ft",
    "VND" => "₫",
    "HKD" => "HK$",
    "GEL" => "₾",
    "DKK" => "kr",
    "AED" => "د.إ",
    "USD" => "$",
    "EUR" => "€",
    "EGP" => "ج.م",
    "INR" => "₹",
    "IDR" => "Rp",
    "IRR" => "﷼",
    "KZT" => "₸",
    "CAD" => "C$",
    "QAR" => "ر.ق",
    "KGS" => "сом",
    "CNY" => "¥",
    "CUP" => "C$",
    "MDL" => "lei",
    "MNT" => "₮",
    "NGN" => "₦",
    "NZD" => "NZ$",
    "NOK" => "kr",
    "OMR" => "ر.ع",
    "PLN" => "zł",
    "SAR" => "ر.س",
    "RON" => "lei",
    "XDR" => "XDR",
    "SGD" => "S$",
    "TJS" => "сомони",
    "THB" => "฿",
    "BDT" => "৳",
    "TRY" => "₺",
    "TMT" => "m",
    "UZS" => "so'm",
    "UAH" => "₴",
    "CZK" => "Kč",
    "SEK" => "kr",
    "CHF" => "CHF",
    "ETB" => "Br",
    "RSD" => "din",
    "ZAR" => "R",
    "KRW" => "₩",
    "JPY" => "¥",
    "MMK" => "K",
    "RUB" => "₽",
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference Quotes (offline development and tests)
// ─────────────────────────────────────────────────────────────────────────────

/// (code, nominal, value, name)
const REFERENCE_QUOTES: &[(&str, f64, f64, &str)] = &[
    ("USD", 1.0, 81.53, "US Dollar"),
    ("EUR", 1.0, 94.87, "Euro"),
    ("GBP", 1.0, 109.21, "Pound Sterling"),
    ("CNY", 1.0, 11.23, "Chinese Yuan"),
    ("CHF", 1.0, 101.64, "Swiss Franc"),
    ("JPY", 100.0, 54.62, "Japanese Yen"),
    ("INR", 100.0, 93.41, "Indian Rupee"),
    ("KZT", 100.0, 15.87, "Kazakhstani Tenge"),
];

/// Builds a snapshot from the hard-coded reference quotes.
///
/// With `max_variance_percent > 0` every value is moved by a random amount of
/// at most that percentage, which is enough to exercise rate updates without
/// a network connection.
pub fn reference_snapshot(max_variance_percent: f64) -> RateSnapshot {
    let mut rng = rand::rng();
    let rates = REFERENCE_QUOTES
        .iter()
        .map(|&(code, nominal, value, name)| {
            let value = if max_variance_percent > 0.0 {
                let factor: f64 = rng.random_range(-1.0..=1.0);
                value + value * (max_variance_percent / 100.0) * factor
            } else {
                value
            };
            (code.to_string(), QuotedRate::new(nominal, value, name))
        })
        .collect();

    RateSnapshot { date: None, rates }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_rate_divides_by_nominal() {
        let quote = QuotedRate::new(100.0, 54.62, "Japanese Yen");
        let rate = quote.unit_rate().unwrap();
        assert!((rate - 0.5462).abs() < 1e-12);
    }

    #[test]
    fn test_unit_rate_rejects_non_positive_inputs() {
        assert!(QuotedRate::new(0.0, 10.0, "x").unit_rate().is_none());
        assert!(QuotedRate::new(1.0, 0.0, "x").unit_rate().is_none());
        assert!(QuotedRate::new(-1.0, 10.0, "x").unit_rate().is_none());
        assert!(QuotedRate::new(f64::NAN, 10.0, "x").unit_rate().is_none());
    }

    #[test]
    fn test_symbol_lookup_and_fallback() {
        assert_eq!(symbol_for("EUR"), "€");
        assert_eq!(symbol_for("RUB"), BASE_SYMBOL);
        assert_eq!(symbol_for("ZZZ"), "ZZZ");
        assert_eq!(symbol_for("JPY"), "¥");
    }

    #[test]
    fn test_reference_snapshot_without_variance_is_stable() {
        let a = reference_snapshot(0.0);
        let b = reference_snapshot(0.0);
        assert_eq!(a, b);
        assert!(!a.is_empty());
        assert!(!a.rates.contains_key(BASE_CODE));
    }

    #[test]
    fn test_reference_snapshot_variance_is_bounded() {
        let base = reference_snapshot(0.0);
        let varied = reference_snapshot(1.0);
        for (code, quote) in &varied.rates {
            let original = base.rates[code].value;
            assert!((quote.value - original).abs() <= original * 0.01 + 1e-9);
        }
    }

    #[test]
    fn test_snapshot_parses_feed_document() {
        let doc = r#"{
            "Date": "2024-03-01T11:30:00+03:00",
            "PreviousDate": "2024-02-29T11:30:00+03:00",
            "Timestamp": "2024-02-29T20:00:00+03:00",
            "Valute": {
                "USD": {"ID": "R01235", "NumCode": "840", "CharCode": "USD",
                        "Nominal": 1, "Name": "US Dollar", "Value": 91.6, "Previous": 90.9},
                "AMD": {"ID": "R01060", "NumCode": "051", "CharCode": "AMD",
                        "Nominal": 100, "Name": "Armenian Dram", "Value": 22.6, "Previous": 22.4}
            }
        }"#;

        let snapshot: RateSnapshot = serde_json::from_str(doc).unwrap();

        assert!(snapshot.date.is_some());
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.rates["AMD"].nominal, 100.0);
        assert!((snapshot.rates["AMD"].unit_rate().unwrap() - 0.226).abs() < 1e-12);
    }
}
