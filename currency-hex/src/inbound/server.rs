//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use currency_types::CurrencyRepository;

use super::handlers::{self, AppState};
use crate::CurrencyService;
use crate::openapi::ApiDoc;

/// HTTP Server for the Currency API.
pub struct HttpServer<R: CurrencyRepository> {
    state: Arc<AppState<R>>,
}

impl<R: CurrencyRepository> HttpServer<R> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: CurrencyService<R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let api = Router::new()
            .route("/health", get(handlers::health))
            .route("/currency", post(handlers::create_currency::<R>))
            .route("/currencies", get(handlers::list_currencies::<R>))
            .route(
                "/currency/{code}",
                get(handlers::get_currency::<R>)
                    .put(handlers::update_currency::<R>)
                    .delete(handlers::delete_currency::<R>),
            )
            .route("/conversion", post(handlers::create_conversion::<R>))
            .route("/conversions", get(handlers::list_conversions::<R>))
            .with_state(self.state.clone());

        api.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
    }

    /// Binds `addr` and serves until `cancel` fires.
    pub async fn run(self, addr: &str, cancel: CancellationToken) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, cancel).await
    }

    /// Serves on an already bound listener until `cancel` fires, then stops
    /// accepting and waits for in-flight requests.
    pub async fn serve(self, listener: TcpListener, cancel: CancellationToken) -> anyhow::Result<()> {
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
