use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Entries kept before the oldest are dropped.
pub const DEFAULT_METRICS_CAPACITY: usize = 10_000;

/// One timed store call made while serving a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String, // "list" | "get" | "create" | "update" | "delete" | "seed"
    pub outcome: String,   // "ok" | "not_found" | "conflict"
    pub duration_ns: u64,
    pub duration_us: f64,
    pub item_count: usize,
}

impl MetricEntry {
    pub fn new(
        operation: impl Into<String>,
        outcome: impl Into<String>,
        duration_ns: u64,
        item_count: usize,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            outcome: outcome.into(),
            duration_ns,
            duration_us: duration_ns as f64 / 1_000.0,
            item_count,
        }
    }
}

/// Timing entries collected across requests, bounded to the most recent
/// `capacity` entries.
#[derive(Debug)]
pub struct MetricsStore {
    pub entries: VecDeque<MetricEntry>,
    capacity: usize,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_METRICS_CAPACITY)
    }
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_METRICS_CAPACITY)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(
        &mut self,
        operation: impl Into<String>,
        outcome: impl Into<String>,
        duration_ns: u64,
        item_count: usize,
    ) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries
            .push_back(MetricEntry::new(operation, outcome, duration_ns, item_count));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Aggregate stats per (operation, outcome) pair.
    pub fn aggregated(&self) -> Vec<AggregatedMetric> {
        let mut map: HashMap<(&str, &str), Vec<u64>> = HashMap::new();

        for e in &self.entries {
            map.entry((e.operation.as_str(), e.outcome.as_str()))
                .or_default()
                .push(e.duration_ns);
        }

        let mut out: Vec<AggregatedMetric> = map
            .into_iter()
            .map(|((op, outcome), mut durations)| {
                durations.sort_unstable();
                let count = durations.len();
                let total: u64 = durations.iter().sum();
                let pct = |p: f64| durations[((count as f64 * p) as usize).min(count - 1)];

                AggregatedMetric {
                    operation: op.to_string(),
                    outcome: outcome.to_string(),
                    sample_count: count,
                    min_ns: durations[0],
                    max_ns: durations[count - 1],
                    avg_ns: total / count as u64,
                    p50_ns: pct(0.50),
                    p95_ns: pct(0.95),
                    p99_ns: pct(0.99),
                }
            })
            .collect();

        out.sort_by(|a, b| a.operation.cmp(&b.operation).then(a.outcome.cmp(&b.outcome)));
        out
    }

    /// Export all entries as a CSV string.
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record([
            "timestamp",
            "operation",
            "outcome",
            "duration_ns",
            "duration_us",
            "item_count",
        ])?;

        for e in &self.entries {
            wtr.write_record([
                e.timestamp.to_rfc3339(),
                e.operation.clone(),
                e.outcome.clone(),
                e.duration_ns.to_string(),
                format!("{:.3}", e.duration_us),
                e.item_count.to_string(),
            ])?;
        }

        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }

    pub fn ascii_table(&self) -> String {
        let agg = self.aggregated();
        if agg.is_empty() {
            return "No metrics collected yet.".to_string();
        }

        let mut out = String::new();
        out.push_str(&format!(
            "\n{:<12} {:<12} {:>10} {:>12} {:>12} {:>12} {:>12}\n",
            "Operation", "Outcome", "Samples", "Avg (µs)", "P50 (µs)", "P95 (µs)", "P99 (µs)"
        ));
        out.push_str(&"-".repeat(88));
        out.push('\n');

        for row in &agg {
            out.push_str(&format!(
                "{:<12} {:<12} {:>10} {:>12.2} {:>12.2} {:>12.2} {:>12.2}\n",
                row.operation,
                row.outcome,
                row.sample_count,
                row.avg_ns as f64 / 1_000.0,
                row.p50_ns as f64 / 1_000.0,
                row.p95_ns as f64 / 1_000.0,
                row.p99_ns as f64 / 1_000.0,
            ));
        }

        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub operation: String,
    pub outcome: String,
    pub sample_count: usize,
    pub min_ns: u64,
    pub max_ns: u64,
    pub avg_ns: u64,
    pub p50_ns: u64,
    pub p95_ns: u64,
    pub p99_ns: u64,
}
