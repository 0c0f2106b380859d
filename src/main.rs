mod config;
mod dto;
mod handlers;
mod layout;
mod models;
mod repository;
mod service;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
};

use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use handlers::rest;
use service::Board;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to load config: {e}");
    });
    let settings = cfg.store().unwrap_or_else(|e| {
        tracing::error!("Invalid note store config: {e}");
        panic!("invalid note store config: {e}");
    });

    // Store creation and migration
    let store = repository::open(&settings).await.unwrap_or_else(|e| {
        tracing::error!("Failed to open note store: {e}");
        panic!("failed to open note store: {e}");
    });

    // Initial load; a failure stays on the banner
    let mut board = Board::new(store);
    if board.load().await.is_err() {
        tracing::warn!("Starting with an empty board");
    }
    let board = board.shared();

    // REST router config
    let rest_router = rest::router(board)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .config(utoipa_swagger_ui::Config::new([
                    "/rest/api-doc/openapi.json",
                ]))
                .url("/api-doc/openapi.json", rest::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http());

    let router = Router::new()
        .route("/", any(root))
        .nest("/rest", rest_router);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind port {}: {e}", cfg.port);
            panic!("failed to bind port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Board server starting, listening on {}", addr),
        Err(e) => tracing::warn!("Board server starting, local address unknown: {e}"),
    }

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}

async fn root() -> Response {
    (StatusCode::OK, "Sticky board is up").into_response()
}
