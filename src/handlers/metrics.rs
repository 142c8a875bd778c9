use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{error::AppResult, AppState};

// ── GET /api/metrics ─────────────────────────────────────────────────────────

pub async fn get_metrics(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let metrics = state.metrics.read().await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "entry_count": metrics.entries.len(),
            "aggregated": metrics.aggregated(),
            "ascii_table": metrics.ascii_table(),
        })),
    )
}

// ── GET /api/metrics/export/csv ──────────────────────────────────────────────

pub async fn export_csv(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let csv = state.metrics.read().await.to_csv()?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"produce_metrics.csv\"",
            ),
        ],
        csv,
    ))
}

// ── DELETE /api/metrics ──────────────────────────────────────────────────────

pub async fn clear_metrics(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut metrics = state.metrics.write().await;
    let cleared = metrics.entries.len();
    metrics.clear();

    info!(cleared, "Metrics cleared");

    (StatusCode::OK, Json(serde_json::json!({ "cleared": cleared })))
}
