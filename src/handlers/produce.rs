use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::ProduceItem,
    store::{StoreError, StoreResult},
    validation::{valid_code, validate_item},
    AppState,
};

type ItemResponse = AppResult<(StatusCode, Json<ProduceItem>)>;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn ensure_code_format(code: &str) -> AppResult<()> {
    if valid_code(code) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("invalid produce code format: {}", code)))
    }
}

/// Unwraps the JSON body and runs field validation on it.
fn validated_body(payload: Result<Json<ProduceItem>, JsonRejection>) -> AppResult<ProduceItem> {
    let Json(item) = payload
        .map_err(|rej| AppError::BadRequest(format!("invalid JSON: {}", rej.body_text())))?;

    let errs = validate_item(&item);
    if !errs.is_empty() {
        debug!(fields = ?errs.fields().collect::<Vec<_>>(), "Rejected produce item");
        return Err(AppError::Validation(errs));
    }
    Ok(item)
}

fn outcome<T>(result: &StoreResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(StoreError::NotFound(_)) => "not_found",
        Err(StoreError::Conflict(_)) => "conflict",
    }
}

async fn record<T>(
    state: &AppState,
    op: &str,
    result: &StoreResult<T>,
    elapsed: Duration,
    count: usize,
) {
    state
        .metrics
        .write()
        .await
        .record(op, outcome(result), elapsed.as_nanos() as u64, count);
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_produce(State(state): State<AppState>) -> Json<Vec<ProduceItem>> {
    let start = Instant::now();
    let items = state.store.list().await;
    let elapsed = start.elapsed();

    state
        .metrics
        .write()
        .await
        .record("list", "ok", elapsed.as_nanos() as u64, items.len());
    debug!(count = items.len(), "Listed produce");

    Json(items)
}

// ── Get by code ───────────────────────────────────────────────────────────────

pub async fn get_produce(State(state): State<AppState>, Path(code): Path<String>) -> ItemResponse {
    ensure_code_format(&code)?;

    let start = Instant::now();
    let result = state.store.get(&code).await;
    record(&state, "get", &result, start.elapsed(), 1).await;

    let item = result.inspect_err(|e| debug!(error = %e, "Lookup failed"))?;
    Ok((StatusCode::OK, Json(item)))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_produce(
    State(state): State<AppState>,
    payload: Result<Json<ProduceItem>, JsonRejection>,
) -> ItemResponse {
    let item = validated_body(payload)?;

    let start = Instant::now();
    let result = state.store.create(item).await;
    let elapsed = start.elapsed();
    record(&state, "create", &result, elapsed, 1).await;

    let item = result.inspect_err(|e| debug!(error = %e, "Create rejected"))?;
    info!(
        code = %item.produce_code,
        name = %item.name,
        elapsed_us = elapsed.as_micros() as u64,
        "Created produce item"
    );

    Ok((StatusCode::CREATED, Json(item)))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_produce(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<ProduceItem>, JsonRejection>,
) -> ItemResponse {
    ensure_code_format(&code)?;
    let item = validated_body(payload)?;

    let start = Instant::now();
    let result = state.store.update(&code, item).await;
    let elapsed = start.elapsed();
    record(&state, "update", &result, elapsed, 1).await;

    let item = result.inspect_err(|e| debug!(error = %e, "Update rejected"))?;
    info!(
        from = %code.to_ascii_uppercase(),
        to = %item.produce_code,
        elapsed_us = elapsed.as_micros() as u64,
        "Updated produce item"
    );

    Ok((StatusCode::OK, Json(item)))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_produce(State(state): State<AppState>, Path(code): Path<String>) -> ItemResponse {
    ensure_code_format(&code)?;

    let start = Instant::now();
    let result = state.store.delete(&code).await;
    let elapsed = start.elapsed();
    record(&state, "delete", &result, elapsed, 1).await;

    let item = result.inspect_err(|e| debug!(error = %e, "Delete rejected"))?;
    info!(code = %item.produce_code, elapsed_us = elapsed.as_micros() as u64, "Deleted produce item");

    Ok((StatusCode::OK, Json(item)))
}
