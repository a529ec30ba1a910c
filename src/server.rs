//! HTTP trigger: every `GET /sync` runs one full pass with fresh clients.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::sync::Synchronizer;

pub fn router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sync", get(run_sync))
        .with_state(config)
}

pub async fn serve(config: AppConfig, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(addr = %bind, "listening for sync requests");

    axum::serve(listener, router(Arc::new(config)))
        .await
        .context("HTTP server stopped")?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn run_sync(State(config): State<Arc<AppConfig>>) -> Response {
    let synchronizer = match Synchronizer::from_config(&config) {
        Ok(s) => s,
        Err(err) => {
            error!(error = %err, "cannot build clients");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"));
        }
    };

    match synchronizer.run().await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!(error = %err, "sync pass aborted");
            error_response(StatusCode::BAD_GATEWAY, err.to_string())
        }
    }
}
