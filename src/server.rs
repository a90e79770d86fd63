//! HTTP surface of the risk service.
//!
//! Every handler is a pure function of its input; the router carries no state.

use std::future::Future;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, rejection::QueryRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::RiskError;
use crate::risk::{
    self, LevelResponse, OverviewResponse, ResidualResponse, RiskRequest, RiskResponse,
};

pub const CALCULATE_PATH: &str = "/api/risk/calculate/";
pub const OVERVIEW_PATH: &str = "/api/risk/overview/";
pub const RESIDUAL_PATH: &str = "/api/risk/residual/";
pub const LEVEL_PATH: &str = "/api/risk/level/";
pub const HEALTH_PATH: &str = "/health";

/// Build the route table.
pub fn build_router() -> Router {
    Router::new()
        .route(CALCULATE_PATH, post(calculate_handler))
        .route(OVERVIEW_PATH, get(overview_handler))
        .route(RESIDUAL_PATH, get(residual_handler))
        .route(LEVEL_PATH, get(level_handler))
        .route(HEALTH_PATH, get(health_handler))
}

/// Parse the body as JSON regardless of its content type, so a missing or
/// mislabelled body is a 400 rather than a 415.
async fn calculate_handler(body: Bytes) -> Result<Json<RiskResponse>, RiskError> {
    let request: RiskRequest = serde_json::from_slice(&body).map_err(|err| {
        crate::log_debug!("Rejected calculate request: {}", err);
        RiskError::from(err)
    })?;

    let response = risk::calculate(request);
    crate::log_debug!(
        "Calculated risk for asset {}: {}",
        response.asset_id,
        response.risk
    );
    Ok(Json(response))
}

async fn overview_handler() -> Json<OverviewResponse> {
    Json(risk::overview())
}

async fn residual_handler() -> Json<ResidualResponse> {
    Json(risk::residual())
}

#[derive(Debug, Deserialize)]
struct LevelQuery {
    impact: i64,
    probability: i64,
}

async fn level_handler(
    query: Result<Query<LevelQuery>, QueryRejection>,
) -> Result<Json<LevelResponse>, RiskError> {
    let Query(query) = query.map_err(|rejection| {
        crate::log_debug!("Rejected level query: {}", rejection.body_text());
        RiskError::MalformedRequest(rejection.body_text())
    })?;
    let response = risk::classify(query.impact, query.probability);
    crate::log_debug!("Classified risk {} as {}", response.risk, response.level);
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_listener<F>(listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    crate::log_info!("Risk service listening on {}", addr);

    axum::serve(listener, build_router())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    crate::log_info!("Risk service stopped");
    Ok(())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address {addr}"))?;
    serve_with_listener(listener, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        crate::log_error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    crate::log_info!("Shutdown signal received");
}
