use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod seed;
pub mod store;
pub mod validation;

use crate::metrics::MetricsStore;
use crate::models::ProduceItem;
use crate::store::ProduceStore;

/// Shared application state. Cheap to clone, everything sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ProduceStore>,
    pub metrics: Arc<RwLock<MetricsStore>>,
}

impl AppState {
    pub fn new(items: impl IntoIterator<Item = ProduceItem>) -> Self {
        Self {
            store: Arc::new(ProduceStore::with_items(items)),
            metrics: Arc::new(RwLock::new(MetricsStore::new())),
        }
    }
}

/// Builds the full router. `api_prefix` is either empty or a `/segment` path.
pub fn build_router(state: AppState, api_prefix: &str) -> Router {
    let api = Router::new()
        // ── Produce CRUD ────────────────────────────────────────────────────
        .route(
            "/produce",
            get(handlers::produce::list_produce).post(handlers::produce::create_produce),
        )
        .route(
            "/produce/:code",
            get(handlers::produce::get_produce)
                .put(handlers::produce::update_produce)
                .post(handlers::produce::update_produce)
                .delete(handlers::produce::delete_produce),
        )
        // ── Seed / stress ───────────────────────────────────────────────────
        .route("/seed", post(handlers::seed::seed_produce))
        .route("/stress-test", post(handlers::stress::run_stress_test))
        // ── Metrics ─────────────────────────────────────────────────────────
        .route(
            "/metrics",
            get(handlers::metrics::get_metrics).delete(handlers::metrics::clear_metrics),
        )
        .route("/metrics/export/csv", get(handlers::metrics::export_csv));

    let router = Router::new().route("/health", get(handlers::health));
    let router = if api_prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(api_prefix, api)
    };

    router
        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
