//! HTTP exposition of the metric registry

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use crate::error::Result;
use crate::metrics::LabelMetrics;

/// Build the router serving the registry on `path`
pub fn router(metrics: Arc<LabelMetrics>, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

/// Render the current gauge values on every request
async fn metrics_handler(State(metrics): State<Arc<LabelMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => {
            let content_type = TextEncoder::new().format_type().to_string();
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
                .into_response()
        }
    }
}

/// Serve `router` until `shutdown` turns true
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Serving metrics on http://{}", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if shutdown.wait_for(|stop| *stop).await.is_err() {
                // Sender gone without a shutdown request: serve forever
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
