//! HTTP surface over a trained [`SegmentationContext`].

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::SharedContext;

use crate::config::ServerConfig;
use crate::context::SegmentationContext;
use crate::error::StartupError;
use axum::routing::{get, post};
use axum::Router;
use log::{error, info};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Build the application router, nested under `server.base_path`.
pub fn router(context: Arc<SegmentationContext>, server: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/features", get(handlers::features))
        .route("/data-summary", get(handlers::data_summary))
        .route("/clusters", get(handlers::clusters))
        .route("/clusters/{cluster_id}", get(handlers::cluster_profile))
        .route("/predict", post(handlers::predict))
        .route("/visualize", post(handlers::visualize))
        .with_state(context);

    let base_path = server.base_path.trim_end_matches('/');
    let app = if base_path.is_empty() {
        api
    } else {
        Router::new().nest(base_path, api)
    };

    if server.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(context: Arc<SegmentationContext>, server: &ServerConfig) -> Result<(), StartupError> {
    let app = router(context, server);
    let bind_addr = format!("{}:{}", server.host, server.port);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server listening on http://{}{}", bind_addr, server.base_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        // Without a handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
}
