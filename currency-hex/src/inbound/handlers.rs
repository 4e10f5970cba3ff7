//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use currency_types::{
    AppError, ConversionRequest, CreateCurrencyRequest, CurrencyRepository, UpdateCurrencyRequest,
};

use crate::CurrencyService;

/// Application state shared across handlers.
pub struct AppState<R: CurrencyRepository> {
    pub service: CurrencyService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "Request failed: {}", message);
        }

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Currencies
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state), fields(code = %req.code))]
pub async fn create_currency<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.create_currency(req).await?;
    Ok((StatusCode::CREATED, Json(currency)))
}

/// List all currencies keyed by code.
#[tracing::instrument(skip(state))]
pub async fn list_currencies<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let currencies = state.service.list_currencies().await?;
    Ok(Json(currencies))
}

#[tracing::instrument(skip(state))]
pub async fn get_currency<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.get_currency(&code).await?;
    Ok(Json(currency))
}

/// Replace a currency. The path code wins over any code in the body.
#[tracing::instrument(skip(state, req))]
pub async fn update_currency<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
    Json(req): Json<UpdateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.update_currency(&code, req).await?;
    Ok(Json(currency))
}

#[tracing::instrument(skip(state))]
pub async fn delete_currency<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_currency(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert an amount and record the result.
#[tracing::instrument(skip(state), fields(from = %req.from, to = %req.to, amount = req.amount))]
pub async fn create_conversion<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<ConversionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let conversion = state.service.convert(req).await?;
    Ok((StatusCode::CREATED, Json(conversion)))
}

/// List recorded conversions, oldest first.
#[tracing::instrument(skip(state))]
pub async fn list_conversions<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let conversions = state.service.list_conversions().await?;
    Ok(Json(conversions))
}
