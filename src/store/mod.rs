use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{normalize_code, ProduceItem};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("produce code {0} does not exist")]
    NotFound(String),
    #[error("produce code {0} already exists")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared in-memory catalog.
///
/// Items live in an `IndexMap` keyed by the upper-cased code, so iteration
/// follows insertion order and removals shift later items down instead of
/// swapping. Reads take the shared lock; every mutation does its
/// check-then-write under a single write guard.
#[derive(Debug, Default)]
pub struct ProduceStore {
    items: RwLock<IndexMap<String, ProduceItem>>,
}

impl ProduceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a seed list. Later duplicates of a code are dropped.
    pub fn with_items(items: impl IntoIterator<Item = ProduceItem>) -> Self {
        let mut map = IndexMap::new();
        for item in items {
            let item = item.normalized();
            if map.contains_key(&item.produce_code) {
                warn!(code = %item.produce_code, "Duplicate seed item ignored");
                continue;
            }
            map.insert(item.produce_code.clone(), item);
        }
        Self {
            items: RwLock::new(map),
        }
    }

    pub async fn list(&self) -> Vec<ProduceItem> {
        self.items.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn get(&self, code: &str) -> StoreResult<ProduceItem> {
        let code = normalize_code(code);
        self.items
            .read()
            .await
            .get(&code)
            .cloned()
            .ok_or(StoreError::NotFound(code))
    }

    pub async fn create(&self, item: ProduceItem) -> StoreResult<ProduceItem> {
        let item = item.normalized();
        let mut items = self.items.write().await;

        if items.contains_key(&item.produce_code) {
            return Err(StoreError::Conflict(item.produce_code));
        }
        items.insert(item.produce_code.clone(), item.clone());
        Ok(item)
    }

    /// Overwrites the item at `code` in place. A changed code must not
    /// collide with another item; the item keeps its position either way.
    pub async fn update(&self, code: &str, item: ProduceItem) -> StoreResult<ProduceItem> {
        let code = normalize_code(code);
        let item = item.normalized();
        let mut items = self.items.write().await;

        let index = items
            .get_index_of(&code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))?;

        if item.produce_code == code {
            if let Some((_, slot)) = items.get_index_mut(index) {
                *slot = item.clone();
            }
            return Ok(item);
        }

        if items.contains_key(&item.produce_code) {
            return Err(StoreError::Conflict(item.produce_code));
        }
        items.shift_remove_index(index);
        items.shift_insert(index, item.produce_code.clone(), item.clone());
        Ok(item)
    }

    pub async fn delete(&self, code: &str) -> StoreResult<ProduceItem> {
        let code = normalize_code(code);
        self.items
            .write()
            .await
            .shift_remove(&code)
            .ok_or(StoreError::NotFound(code))
    }
}
