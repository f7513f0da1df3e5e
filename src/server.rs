//! HTTP trigger for the pipeline.
//!
//! - `GET /health` answers `OK` without touching any service.
//! - `GET /` performs one full run and reports how many articles made it
//!   through. Requests are not deduplicated; two concurrent requests mean
//!   two concurrent runs.

use crate::pipeline::Pipeline;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct RunResponse {
    status: &'static str,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(trigger_run))
        .route("/health", get(health))
        .with_state(pipeline)
}

async fn health() -> &'static str {
    "OK"
}

#[instrument(level = "info", skip_all)]
async fn trigger_run(State(pipeline): State<Arc<Pipeline>>) -> impl IntoResponse {
    info!("Run requested over HTTP");
    match pipeline.run().await {
        Ok(results) => (
            StatusCode::OK,
            Json(RunResponse {
                status: "success",
                message: "News crawling and summarization completed.",
                processed: Some(results.len()),
                error: None,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RunResponse {
                    status: "error",
                    message: "News crawling and summarization failed.",
                    processed: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Bind `addr` and serve until SIGINT or SIGTERM.
///
/// # Errors
///
/// Binding or accept-loop I/O errors.
pub async fn serve(pipeline: Arc<Pipeline>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
