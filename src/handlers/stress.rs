use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    seed,
    store::{ProduceStore, StoreError},
    AppState,
};

#[derive(Debug, Deserialize, Default)]
pub struct StressParams {
    /// Number of concurrent "virtual users" (default: 20)
    pub concurrency: Option<usize>,
    /// Operations per virtual user (default: 50)
    pub ops_per_user: Option<usize>,
}

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicU64,
    creates: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    not_found: AtomicU64,
    conflicts: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct StressReport {
    pub concurrency: usize,
    pub ops_per_user: usize,
    pub total_ops: usize,
    pub item_count_before: usize,
    pub item_count_after: usize,

    pub total_elapsed_ms: f64,
    pub ops_per_second: f64,

    // Successful operations
    pub reads: u64,
    pub creates: u64,
    pub updates: u64,
    pub deletes: u64,

    // Lost races
    pub not_found: u64,
    pub conflicts: u64,

    pub min_latency_us: f64,
    pub avg_latency_us: f64,
    pub p95_latency_us: f64,
    pub p99_latency_us: f64,
    pub max_latency_us: f64,
}

#[derive(Clone, Copy)]
enum Op {
    Read,
    Create,
    Rename,
    Delete,
}

impl Op {
    /// Weight: 50% read, 20% create, 15% rename, 15% delete
    fn roll(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..100) {
            0..=49 => Op::Read,
            50..=69 => Op::Create,
            70..=84 => Op::Rename,
            _ => Op::Delete,
        }
    }
}

// ── POST /api/stress-test ────────────────────────────────────────────────────

pub async fn run_stress_test(
    State(state): State<AppState>,
    params: Result<Json<StressParams>, JsonRejection>,
) -> AppResult<(StatusCode, Json<StressReport>)> {
    let params = match params {
        Ok(Json(p)) => p,
        // No JSON body at all: run with defaults.
        Err(JsonRejection::MissingJsonContentType(_)) => StressParams::default(),
        Err(rej) => {
            return Err(AppError::BadRequest(format!(
                "invalid JSON: {}",
                rej.body_text()
            )))
        }
    };
    let concurrency = params.concurrency.unwrap_or(20).clamp(1, 200);
    let ops_per_user = params.ops_per_user.unwrap_or(50).clamp(1, 1_000);

    let item_count_before = state.store.len().await;
    if item_count_before == 0 {
        return Err(AppError::BadRequest(
            "store is empty; POST /seed?count=100 first".to_string(),
        ));
    }

    info!(concurrency, ops_per_user, item_count_before, "Starting stress test");

    // Codes every virtual user races over; creates and renames add fresh ones.
    let codes: Arc<Vec<String>> = Arc::new(
        state
            .store
            .list()
            .await
            .into_iter()
            .map(|i| i.produce_code)
            .collect(),
    );
    let counters = Arc::new(Counters::default());

    let total_start = Instant::now();
    let mut join_set: JoinSet<Vec<f64>> = JoinSet::new();

    for _ in 0..concurrency {
        let store = Arc::clone(&state.store);
        let codes = Arc::clone(&codes);
        let counters = Arc::clone(&counters);

        join_set.spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut latencies = Vec::with_capacity(ops_per_user);
            for _ in 0..ops_per_user {
                let op_start = Instant::now();
                run_op(&store, &codes, &counters, &mut rng).await;
                latencies.push(op_start.elapsed().as_secs_f64() * 1_000_000.0);
            }
            latencies
        });
    }

    let mut all_lats = Vec::with_capacity(concurrency * ops_per_user);
    while let Some(joined) = join_set.join_next().await {
        let lats = joined.map_err(|e| anyhow::anyhow!("stress worker failed: {}", e))?;
        all_lats.extend(lats);
    }
    let total_elapsed = total_start.elapsed();

    all_lats.sort_by(|a, b| a.total_cmp(b));
    let n = all_lats.len();
    let pct = |p: f64| {
        all_lats
            .get(((n as f64 * p) as usize).min(n.saturating_sub(1)))
            .copied()
            .unwrap_or(0.0)
    };
    let total_ops = concurrency * ops_per_user;

    let report = StressReport {
        concurrency,
        ops_per_user,
        total_ops,
        item_count_before,
        item_count_after: state.store.len().await,
        total_elapsed_ms: total_elapsed.as_secs_f64() * 1000.0,
        ops_per_second: total_ops as f64 / total_elapsed.as_secs_f64().max(f64::EPSILON),
        reads: counters.reads.load(Ordering::Relaxed),
        creates: counters.creates.load(Ordering::Relaxed),
        updates: counters.updates.load(Ordering::Relaxed),
        deletes: counters.deletes.load(Ordering::Relaxed),
        not_found: counters.not_found.load(Ordering::Relaxed),
        conflicts: counters.conflicts.load(Ordering::Relaxed),
        min_latency_us: all_lats.first().copied().unwrap_or(0.0),
        avg_latency_us: if n > 0 { all_lats.iter().sum::<f64>() / n as f64 } else { 0.0 },
        p95_latency_us: pct(0.95),
        p99_latency_us: pct(0.99),
        max_latency_us: all_lats.last().copied().unwrap_or(0.0),
    };

    info!(
        total_ops,
        ops_per_second = %format!("{:.1}", report.ops_per_second),
        conflicts = report.conflicts,
        not_found = report.not_found,
        "Stress test complete"
    );

    Ok((StatusCode::OK, Json(report)))
}

async fn run_op(store: &ProduceStore, codes: &[String], counters: &Counters, rng: &mut StdRng) {
    let target = codes.choose(rng).cloned().unwrap_or_default();

    let result = match Op::roll(rng) {
        Op::Read => store.get(&target).await.map(|_| &counters.reads),
        Op::Create => store
            .create(seed::random_item(rng))
            .await
            .map(|_| &counters.creates),
        Op::Rename => {
            let mut item = seed::random_item(rng);
            // Half the renames aim at an existing code to provoke conflicts.
            if rng.gen_bool(0.5) {
                if let Some(other) = codes.choose(rng) {
                    item.produce_code = other.clone();
                }
            }
            store.update(&target, item).await.map(|_| &counters.updates)
        }
        Op::Delete => store.delete(&target).await.map(|_| &counters.deletes),
    };

    let counter = match result {
        Ok(counter) => counter,
        Err(StoreError::NotFound(_)) => &counters.not_found,
        Err(StoreError::Conflict(_)) => &counters.conflicts,
    };
    counter.fetch_add(1, Ordering::Relaxed);
}
