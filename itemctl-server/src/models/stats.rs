//! Aggregate and diagnostic read models

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// Table-wide aggregates for `GET /api/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    pub total_items: i64,
    pub unique_names: i64,
    pub oldest_item: Option<NaiveDateTime>,
    pub newest_item: Option<NaiveDateTime>,
}

/// Connection pool occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    /// Open connections, idle or in use
    pub total_count: u32,
    /// Open connections not checked out
    pub idle_count: u32,
    /// Callers currently blocked in acquire
    pub waiting_count: u32,
}

/// Result of a successful database probe
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub server_time: DateTime<Utc>,
    pub latency_ms: f64,
    pub version: String,
    pub item_count: i64,
}
