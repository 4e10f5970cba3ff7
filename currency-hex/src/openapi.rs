//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use currency_types::domain::{Conversion, ConversionId, Currency};
use currency_types::dto::{ConversionRequest, CreateCurrencyRequest, UpdateCurrencyRequest};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Create or replace a currency
#[utoipa::path(
    post,
    path = "/currency",
    tag = "currencies",
    request_body = CreateCurrencyRequest,
    responses(
        (status = 201, description = "Currency accepted", body = Currency),
        (status = 400, description = "Invalid code, rate, name or symbol"),
        (status = 503, description = "Ingestion queue is full")
    )
)]
async fn create_currency() {}

/// List all currencies keyed by code
#[utoipa::path(
    get,
    path = "/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "Map of code to currency", body = std::collections::HashMap<String, Currency>)
    )
)]
async fn list_currencies() {}

/// Get a currency by code
#[utoipa::path(
    get,
    path = "/currency/{code}",
    tag = "currencies",
    params(
        ("code" = String, Path, description = "Currency code, case-insensitive")
    ),
    responses(
        (status = 200, description = "Currency details", body = Currency),
        (status = 404, description = "Currency not found")
    )
)]
async fn get_currency() {}

/// Replace an existing currency
#[utoipa::path(
    put,
    path = "/currency/{code}",
    tag = "currencies",
    request_body = UpdateCurrencyRequest,
    params(
        ("code" = String, Path, description = "Currency code; overrides any code in the body")
    ),
    responses(
        (status = 200, description = "Currency updated", body = Currency),
        (status = 400, description = "Invalid rate, name or symbol"),
        (status = 404, description = "Currency not found")
    )
)]
async fn update_currency() {}

/// Delete a currency
#[utoipa::path(
    delete,
    path = "/currency/{code}",
    tag = "currencies",
    params(
        ("code" = String, Path, description = "Currency code")
    ),
    responses(
        (status = 204, description = "Currency deleted"),
        (status = 404, description = "Currency not found")
    )
)]
async fn delete_currency() {}

/// Convert an amount between two currencies
#[utoipa::path(
    post,
    path = "/conversion",
    tag = "conversions",
    request_body = ConversionRequest,
    responses(
        (status = 201, description = "Conversion recorded", body = Conversion),
        (status = 400, description = "Empty currency code"),
        (status = 404, description = "Currency not found"),
        (status = 422, description = "Amount is not a positive number"),
        (status = 503, description = "Ingestion queue is full")
    )
)]
async fn create_conversion() {}

/// List recorded conversions
#[utoipa::path(
    get,
    path = "/conversions",
    tag = "conversions",
    responses(
        (status = 200, description = "Conversions in creation order", body = Vec<Conversion>)
    )
)]
async fn list_conversions() {}

/// OpenAPI documentation for the Currency API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Registry API",
        version = "1.0.0",
        description = "Currency registry with exchange rates synchronized from the Central Bank of Russia and a conversion history.\n\nRates are values of one unit in Russian roubles, so a conversion computes `amount * from.rate / to.rate`.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_currency,
        list_currencies,
        get_currency,
        update_currency,
        delete_currency,
        create_conversion,
        list_conversions,
    ),
    components(
        schemas(
            Currency,
            Conversion,
            ConversionId,
            CreateCurrencyRequest,
            UpdateCurrencyRequest,
            ConversionRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currencies", description = "Currency registry operations"),
        (name = "conversions", description = "Conversions and their history"),
    )
)]
pub struct ApiDoc;
