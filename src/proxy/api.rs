use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::reshape::reshape;
use super::upstream::ContributionSource;
use crate::config::ACTIVITY_ROUTE;
use crate::errors::ProxyError;

/// Budget for the single upstream attempt per request.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared and private caches may keep a successful response for an hour.
pub const CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub source: Arc<dyn ContributionSource>,
    pub upstream_timeout: Duration,
    /// Clock used to drop future-dated entries.
    pub today: fn() -> NaiveDate,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(source: Arc<dyn ContributionSource>) -> Self {
        Self {
            source,
            upstream_timeout: UPSTREAM_TIMEOUT,
            today: utc_today,
        }
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    /// Upstream answered with a non-success status; passed through as-is.
    Upstream(StatusCode, String),
    BadGateway(String),
    GatewayTimeout(String),
    Internal(String),
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        let message = err.to_string();
        match err {
            ProxyError::UpstreamStatus { status } => match StatusCode::from_u16(status) {
                Ok(code) => ApiError::Upstream(code, message),
                Err(_) => ApiError::BadGateway(message),
            },
            ProxyError::InvalidShape { reason } => {
                warn!(%reason, "upstream contract violation");
                ApiError::BadGateway(message)
            }
            ProxyError::TimedOut => ApiError::GatewayTimeout(message),
            ProxyError::Transport(_) | ProxyError::Other(_) => {
                if message.is_empty() {
                    ApiError::Internal("Failed to fetch GitHub activity".to_string())
                } else {
                    ApiError::Internal(message)
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Upstream(status, msg) => (status, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route(ACTIVITY_ROUTE, get(github_activity))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

/// Fetch live upstream data and reshape it; nothing is cached server side.
async fn github_activity(State(state): State<SharedState>) -> Result<Response, ApiError> {
    // Dropping the fetch future on timeout aborts the upstream connection.
    let fetch = tokio::time::timeout(state.upstream_timeout, state.source.fetch());
    let upstream = match fetch.await {
        Ok(result) => result?,
        Err(_) => {
            warn!(
                timeout_ms = state.upstream_timeout.as_millis() as u64,
                "upstream request timed out"
            );
            return Err(ProxyError::TimedOut.into());
        }
    };

    let payload = reshape(upstream, (state.today)());
    info!(
        days = payload.contributions.len(),
        last_year_total = payload.last_year_total,
        "serving activity payload"
    );

    Ok(([(header::CACHE_CONTROL, CACHE_CONTROL)], Json(payload)).into_response())
}
