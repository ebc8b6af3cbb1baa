// =============================================================================
// REST API Endpoints - Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  The chart endpoint is the only one
// that reaches the provider; everything else answers from local state.
//
// CORS is configured permissively so a browser dashboard on another origin
// can call the API directly.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::chart::build_chart;
use crate::error::EngineError;
use crate::market_data::QuoteSummary;
use crate::types::Timeframe;
use crate::window::DisplayWindow;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/timeframes", get(timeframes))
        .route("/api/v1/config", get(config))
        .route("/api/v1/chart", get(chart))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

/// Handler failure, rendered as `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Upstream(anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Upstream(err) => (StatusCode::BAD_GATEWAY, format!("{err:#}")),
        };
        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: i64,
    requests_served: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = Utc::now();
    Json(HealthResponse {
        status: "ok",
        server_time: now.timestamp_millis(),
        uptime_secs: (now - state.started_at).num_seconds(),
        requests_served: state.requests_served(),
    })
}

// =============================================================================
// Configuration views
// =============================================================================

async fn timeframes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rows = state.runtime_config.read().timeframes.clone();
    Json(rows)
}

async fn config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cfg = state.runtime_config.read().clone();
    Json(cfg)
}

// =============================================================================
// Chart
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartQuery {
    /// Company name or ticker.
    #[serde(default)]
    query: String,
    #[serde(default)]
    timeframe: Option<String>,
}

#[derive(Serialize)]
struct ChartResponse {
    timeframe: Timeframe,
    quote: QuoteSummary,
    window: DisplayWindow,
}

async fn chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    let query = params.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let timeframe = match params.timeframe.as_deref() {
        Some(raw) => raw.parse::<Timeframe>().map_err(ApiError::BadRequest)?,
        None => Timeframe::default(),
    };

    // Copy everything out of the config before the first await.
    let (settings, indicator_params, session_gap, alias, home_currency) = {
        let cfg = state.runtime_config.read();
        let settings = cfg
            .timeframe(timeframe)
            .cloned()
            .ok_or_else(|| ApiError::BadRequest(format!("timeframe {timeframe} is not configured")))?;
        (
            settings,
            cfg.indicator_params,
            cfg.session_gap()?,
            cfg.alias(&query).map(str::to_string),
            cfg.home_currency.clone(),
        )
    };

    let hit = state
        .client
        .resolve(&query, alias.as_deref())
        .await
        .map_err(ApiError::Upstream)?
        .ok_or_else(|| ApiError::NotFound(format!("no symbol found for '{query}'")))?;

    let payload = state
        .client
        .fetch_chart(&hit.symbol, &settings.range, &settings.interval)
        .await
        .map_err(ApiError::Upstream)?;

    let policy = settings.policy(Utc::now(), session_gap);
    let window = build_chart(&payload.feed, &indicator_params, policy)?;

    let fx_rate = if payload.meta.needs_conversion(&home_currency) {
        match state.client.fx_rate(&payload.meta.currency, &home_currency).await {
            Ok(rate) => Some(rate),
            Err(e) => {
                warn!(error = %e, currency = %payload.meta.currency, "FX lookup failed - home price omitted");
                None
            }
        }
    } else {
        None
    };

    let quote = QuoteSummary::new(&payload.meta, hit.name.as_deref(), &home_currency, fx_rate);
    let served = state.record_request();

    info!(
        query = %query,
        symbol = %hit.symbol,
        timeframe = %timeframe,
        bars = window.len(),
        served,
        "chart served"
    );

    Ok(Json(ChartResponse {
        timeframe,
        quote,
        window,
    }))
}
