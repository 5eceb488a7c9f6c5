//! HTTP surface: router construction and the server loop.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET`  | `/health` | [`health::health_check`] |
//! | `POST` | `/converter/pdf-to-jpg` | [`converter::pdf_to_jpg`] |
//!
//! Both routes are nested under [`ServerConfig::api_prefix`] when one is set.

pub mod converter;
pub mod health;

use crate::config::ServerConfig;
use crate::convert::ConversionHandler;
use crate::error::DispenserError;
use crate::pipeline::PdfiumRasterizer;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<ConversionHandler>,
}

impl AppState {
    pub fn new(handler: ConversionHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

/// Build the application router.
///
/// Takes the handler explicitly so tests can swap in a mock rasterizer.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/converter/pdf-to-jpg", post(converter::pdf_to_jpg))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state);

    let app = if config.api_prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&config.api_prefix, routes)
    };

    app.layer(TraceLayer::new_for_http())
}

/// Bind pdfium, open the socket, and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), DispenserError> {
    let rasterizer = PdfiumRasterizer::from_config(&config);
    rasterizer.probe()?;

    let handler = ConversionHandler::from_config(&config, Arc::new(rasterizer));
    let app = router(AppState::new(handler), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|source| DispenserError::BindFailed {
            addr: config.bind_addr,
            source,
        })?;
    info!(
        "Listening on {} (prefix '{}', default format {})",
        config.bind_addr, config.api_prefix, config.default_format
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(DispenserError::Serve)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
