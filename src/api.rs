//! HTTP API
//!
//! - `GET  /`              service information
//! - `GET  /health`        component status and routing configuration
//! - `POST /gateway`       inspect, route and audit one prompt
//! - `GET  /audit/recent`  most recent audit records, newest first
//! - `GET  /audit/summary` aggregate over the most recent records

use crate::audit::AuditSummary;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::privacy::expect_text;
use crate::types::GatewayRequest;
use axum::{
    extract::{rejection::QueryRejection, ConnectInfo, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Default number of records returned by the audit endpoints
pub const DEFAULT_RECENT_LIMIT: usize = 50;
/// Largest accepted `limit`
pub const MAX_RECENT_LIMIT: usize = 1000;

/// Shared state for all handlers
#[derive(Clone)]
pub struct ApiState {
    pub gateway: Arc<Gateway>,
    pub config: Arc<GatewayConfig>,
}

/// Build the HTTP application
pub fn build_app(state: ApiState) -> Router {
    let server = state.config.server.clone();
    let router = Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/gateway", post(gateway_endpoint))
        .route("/audit/recent", get(recent_audit))
        .route("/audit/summary", get(audit_summary))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if server.enable_cors {
        router.layer(build_cors(&server.cors_origins))
    } else {
        router
    }
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Handler error, rendered as `{error, message}`
#[derive(Debug)]
pub enum ApiError {
    Gateway(GatewayError),
    BadRequest(String),
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Gateway(GatewayError::InvalidInput(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Gateway(GatewayError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            Self::Gateway(GatewayError::RequestTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match &self {
            Self::BadRequest(msg) => ("Bad request", msg.clone()),
            Self::Gateway(e) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %e, "Request failed");
                (
                    "Internal server error",
                    "Gateway processing error. Please check logs for details.".to_string(),
                )
            }
            Self::Gateway(e) => ("Request rejected", e.to_string()),
        };
        (
            status,
            Json(serde_json::json!({"error": error, "message": message})),
        )
            .into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /
async fn service_info() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "Sovereign Inference Gateway",
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
    }))
}

/// GET /health
async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let routing = &state.config.routing;
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "components": {
            "inspector": "operational",
            "router": "operational",
            "auditLog": "operational",
        },
        "configuration": {
            "threshold": state.gateway.engine().threshold(),
            "cloudConfigured": routing.cloud.has_api_key(),
            "sovereignUrl": routing.sovereign.base_url,
        },
    }))
}

/// First `X-Forwarded-For` entry, else the peer address
fn source_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// POST /gateway
async fn gateway_endpoint(
    State(state): State<ApiState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    // reject non-text prompts before any coercion
    expect_text(body.get("prompt").unwrap_or(&serde_json::Value::Null))?;
    let request: GatewayRequest = serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidInput(format!("Invalid request: {}", e)))?;

    let source = source_address(&headers, peer.map(|ConnectInfo(addr)| addr));
    let response = state.gateway.process(request, source).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

fn checked_limit(
    query: Result<Query<LimitQuery>, QueryRejection>,
    default: usize,
) -> Result<usize, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    match params.limit {
        None => Ok(default),
        Some(n) if (1..=MAX_RECENT_LIMIT as i64).contains(&n) => Ok(n as usize),
        Some(n) => Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}, got {}",
            MAX_RECENT_LIMIT, n
        ))),
    }
}

/// GET /audit/recent
async fn recent_audit(
    State(state): State<ApiState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = checked_limit(query, DEFAULT_RECENT_LIMIT)?;
    let logs = state.gateway.audit().recent(limit).await?;
    Ok(Json(serde_json::json!({
        "count": logs.len(),
        "limit": limit,
        "logs": logs,
    })))
}

/// GET /audit/summary
async fn audit_summary(
    State(state): State<ApiState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = checked_limit(query, MAX_RECENT_LIMIT)?;
    let records = state.gateway.audit().recent(limit).await?;
    Ok(Json(AuditSummary::from_records(&records)))
}
