//! Metrics and status HTTP endpoint using axum.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use condor_telemetry::Metrics;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::status::StatusReport;

/// Latest status, shared between the run loop and the server.
pub type SharedStatus = Arc<RwLock<Option<StatusReport>>>;

/// Create the axum router.
pub fn create_router(status: SharedStatus) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/status", get(get_status))
        .with_state(status)
}

async fn get_metrics() -> Response {
    match Metrics::gather_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_status(State(status): State<SharedStatus>) -> Response {
    let snapshot = status.read().clone();
    match snapshot {
        Some(report) => Json(report).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

/// Serve until the task is aborted.
pub async fn run_server(status: SharedStatus, port: u16) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Starting metrics server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, create_router(status)).await?;
    Ok(())
}
