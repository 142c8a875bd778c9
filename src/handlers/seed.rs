use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::SeedParams,
    seed,
    store::StoreError,
    AppState,
};

const DEFAULT_SEED_COUNT: usize = 100;
const MAX_SEED_COUNT: usize = 10_000;

// ── POST /api/seed?count=N ───────────────────────────────────────────────────

pub async fn seed_produce(
    State(state): State<AppState>,
    params: Result<Query<SeedParams>, QueryRejection>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let Query(params) = params
        .map_err(|rej| AppError::BadRequest(format!("invalid query: {}", rej.body_text())))?;
    let count = params
        .count
        .unwrap_or(DEFAULT_SEED_COUNT)
        .clamp(1, MAX_SEED_COUNT);

    let items = seed::random_items(&mut StdRng::from_entropy(), count);

    let start = Instant::now();
    let mut created = 0_usize;
    let mut skipped = 0_usize;
    for item in items {
        match state.store.create(item).await {
            Ok(_) => created += 1,
            Err(StoreError::Conflict(_)) => skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }
    let elapsed = start.elapsed();
    let total = state.store.len().await;

    state
        .metrics
        .write()
        .await
        .record("seed", "ok", elapsed.as_nanos() as u64, created);

    info!(requested = count, created, skipped, total, "Seeded produce items");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "requested": count,
            "created": created,
            "skipped_conflicts": skipped,
            "total_items": total,
            "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}
