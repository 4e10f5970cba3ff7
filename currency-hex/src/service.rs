//! Currency Application Service
//!
//! Orchestrates domain operations through the repository port and the
//! ingestion queue. Contains no transport logic.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use currency_types::{
    AppError, Conversion, ConversionRequest, CreateCurrencyRequest, Currency, CurrencyRepository,
    DomainError, UpdateCurrencyRequest, normalize_code,
};

use crate::workers::Ingestor;

/// How new records reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Through the ingestion queue. A full queue is reported to the caller.
    #[default]
    Queued,
    /// Straight into the store.
    Direct,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" | "queue" => Ok(WriteMode::Queued),
            "direct" => Ok(WriteMode::Direct),
            other => Err(format!("unknown write mode: {}", other)),
        }
    }
}

/// Application service for currency operations.
///
/// Generic over `R: CurrencyRepository` - the adapter is injected at compile time.
pub struct CurrencyService<R: CurrencyRepository> {
    repo: Arc<R>,
    ingestor: Ingestor,
    write_mode: WriteMode,
}

impl<R: CurrencyRepository> CurrencyService<R> {
    pub fn new(repo: Arc<R>, ingestor: Ingestor) -> Self {
        Self {
            repo,
            ingestor,
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Currency Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates or replaces a currency.
    ///
    /// In queued mode the record is acknowledged once the queue accepts it.
    pub async fn create_currency(&self, req: CreateCurrencyRequest) -> Result<Currency, AppError> {
        let currency = build_currency(&req.code, req.rate, req.name, req.symbol)?;

        match self.write_mode {
            WriteMode::Queued => self.ingestor.submit(currency.clone())?,
            WriteMode::Direct => self.repo.put_currency(currency.clone()).await,
        }

        info!(code = %currency.code, rate = currency.rate, "Currency accepted");
        Ok(currency)
    }

    /// Gets a currency by code.
    pub async fn get_currency(&self, code: &str) -> Result<Currency, AppError> {
        let code = require_code(code)?;
        self.repo.get_currency(&code).await.map_err(Into::into)
    }

    /// Lists every currency keyed by code.
    pub async fn list_currencies(&self) -> Result<HashMap<String, Currency>, AppError> {
        Ok(self.repo.list_currencies().await)
    }

    /// Replaces an existing currency. The path code wins over any body code.
    pub async fn update_currency(
        &self,
        code: &str,
        req: UpdateCurrencyRequest,
    ) -> Result<Currency, AppError> {
        let currency = build_currency(code, req.rate, req.name, req.symbol)?;
        self.repo.update_currency(currency.clone()).await?;
        info!(code = %currency.code, rate = currency.rate, "Currency updated");
        Ok(currency)
    }

    /// Deletes a currency by code.
    pub async fn delete_currency(&self, code: &str) -> Result<(), AppError> {
        let code = require_code(code)?;
        self.repo.delete_currency(&code).await?;
        info!(code = %code, "Currency deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts an amount between two currencies and records the result.
    pub async fn convert(&self, req: ConversionRequest) -> Result<Conversion, AppError> {
        if !req.amount.is_finite() || req.amount <= 0.0 {
            return Err(DomainError::InvalidAmount(req.amount).into());
        }
        let from_code = require_code(&req.from)?;
        let to_code = require_code(&req.to)?;

        let from = self.repo.get_currency(&from_code).await?;
        let to = self.repo.get_currency(&to_code).await?;
        let conversion = Conversion::new(req.amount, from, to)?;

        match self.write_mode {
            WriteMode::Queued => self.ingestor.submit(conversion.clone())?,
            WriteMode::Direct => self.repo.append_conversion(conversion.clone()).await,
        }

        info!(
            amount = conversion.amount(),
            from = %from_code,
            to = %to_code,
            result = conversion.result(),
            "Conversion recorded"
        );
        Ok(conversion)
    }

    /// Lists conversions in creation order.
    pub async fn list_conversions(&self) -> Result<Vec<Conversion>, AppError> {
        Ok(self.repo.list_conversions().await)
    }
}

fn require_code(code: &str) -> Result<String, AppError> {
    let code = normalize_code(code);
    if code.is_empty() {
        return Err(DomainError::EmptyCode.into());
    }
    Ok(code)
}

/// Validates all four currency fields.
fn build_currency(
    code: &str,
    rate: f64,
    name: String,
    symbol: String,
) -> Result<Currency, AppError> {
    if name.trim().is_empty() {
        return Err(DomainError::ValidationError("Currency name cannot be empty".into()).into());
    }
    if symbol.trim().is_empty() {
        return Err(
            DomainError::ValidationError("Currency symbol cannot be empty".into()).into(),
        );
    }
    Currency::new(code, rate, name, symbol).map_err(Into::into)
}
