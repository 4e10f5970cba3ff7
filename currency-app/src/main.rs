//! # Currency Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Restore the file-backed store
//! - Start the ingestion queue, rate sync loop and change monitor
//! - Start the HTTP server
//! - Shut everything down on Ctrl+C / SIGTERM

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_hex::inbound::{HttpServer, shutdown_signal};
use currency_hex::outbound::{CbrClient, StaticRateFeed};
use currency_hex::{CurrencyService, Workers};
use currency_repo::open_store;
use currency_types::RateFeed;

use config::{Config, FeedKind};

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("currency-service"), provider))
}

/// Installs the global subscriber. Returns the OTLP provider when one was set up.
fn init_tracing(config: &Config) -> anyhow::Result<Option<sdktrace::SdkTracerProvider>> {
    let (telemetry, provider) = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let (tracer, provider) = init_tracer(endpoint)?;
            (
                Some(tracing_opentelemetry::layer().with_tracer(tracer)),
                Some(provider),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,currency_app=debug,currency_hex=debug,currency_repo=debug".into()
            }),
        )
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(|| tracing_subscriber::fmt::layer()))
        .with(telemetry)
        .init();

    Ok(provider)
}

fn build_feed(config: &Config) -> anyhow::Result<Arc<dyn RateFeed>> {
    let feed: Arc<dyn RateFeed> = match config.rate_feed {
        FeedKind::Cbr => Arc::new(CbrClient::new(config.rate_feed_url.clone())?),
        FeedKind::Static => Arc::new(StaticRateFeed::new(config.static_variance_percent)),
    };
    Ok(feed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    let otel_provider = init_tracing(&config)?;

    tracing::info!("Starting currency server on port {}", config.port);
    tracing::info!("Using data directory: {}", config.data_dir.display());

    // Restore the store from its snapshot files
    let store = Arc::new(open_store(&config.data_dir));

    // Start background workers
    let feed = build_feed(&config)?;
    tracing::info!(feed = feed.name(), "Rate feed selected");
    let cancel = CancellationToken::new();
    let workers = Workers::spawn(
        Arc::clone(&store),
        feed,
        config.worker_config(),
        cancel.clone(),
    )
    .await;

    // Create the currency service
    let service = CurrencyService::new(Arc::clone(&store), workers.ingestor())
        .with_write_mode(config.write_mode);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);
    let server_cancel = cancel.clone();
    let mut server_task = tokio::spawn(async move { server.run(&addr, server_cancel).await });

    let mut server_result = None;
    tokio::select! {
        _ = shutdown_signal() => {}
        _ = cancel.cancelled() => {}
        joined = &mut server_task => {
            server_result = Some(joined);
        }
    }
    cancel.cancel();

    // Give in-flight requests the grace period, then stop waiting
    let server_result = match server_result {
        Some(joined) => joined,
        None => match tokio::time::timeout(config.shutdown_grace, &mut server_task).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(
                    grace_secs = config.shutdown_grace.as_secs(),
                    "Grace period elapsed, dropping open connections"
                );
                server_task.abort();
                Ok(Ok(()))
            }
        },
    };

    workers.shutdown().await;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }

    server_result??;
    tracing::info!("Shutdown complete");
    Ok(())
}
