//! Analysis API Routes
//!
//! `POST /analyze` runs the full pipeline for one ticker; `GET /health` reports
//! liveness and the number of cached symbols.

use analysis_core::AnalysisResult;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::request_id::RequestId;
use crate::{AppError, AppResult, AppState};

const MAX_TICKER_LEN: usize = 6;

/// Request body. A missing or non-string `ticker` reads as empty and fails validation.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ticker: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache_size: usize,
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze_ticker))
        .route("/health", get(health))
}

/// Uppercase and check a ticker: 1 to 6 ASCII letters.
pub fn normalize_ticker(raw: &str) -> AppResult<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    let valid = !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker.chars().all(|c| c.is_ascii_uppercase());
    if !valid {
        return Err(AppError::BadRequest("Invalid Ticker Format".to_string()));
    }
    Ok(ticker)
}

async fn analyze_ticker(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> AppResult<Json<AnalysisResult>> {
    let ticker = normalize_ticker(&body.ticker)?;
    let result = state.orchestrator.analyze(&ticker, &request_id.0).await?;
    Ok(Json(result))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online".to_string(),
        cache_size: state.orchestrator.cache_size(),
    })
}
