//! Storage seam between HTTP handlers and the backing table
//!
//! Handlers only see [`ItemStore`]. Production uses the PostgreSQL
//! repository; tests swap in [`MemoryStore`](super::MemoryStore).

use async_trait::async_trait;

use super::pool::PoolError;
use crate::models::{
    Diagnostics, Item, ItemId, ItemStats, NewItem, Paginated, Pagination, PoolStats, SearchQuery,
};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Targeted row does not exist; any transaction was rolled back
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Begin, statement or commit failed; the transaction was rolled back
    #[error("transaction failed: {0}")]
    Transaction(#[source] sqlx::Error),

    /// Read-only statement failed
    #[error("query failed: {0}")]
    Read(#[source] sqlx::Error),

    /// No connection could be obtained
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl DbError {
    pub fn item_not_found(id: ItemId) -> Self {
        Self::NotFound {
            resource: "item",
            id: id.to_string(),
        }
    }
}

/// Operations the HTTP layer needs from storage.
///
/// Writes are atomic: either the whole statement commits or the table is
/// left as it was.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a row, returning it with generated `id` and `created_at`.
    async fn create(&self, item: NewItem) -> Result<Item, DbError>;

    /// Replace `name` and `value` of an existing row.
    async fn update(&self, id: ItemId, item: NewItem) -> Result<Item, DbError>;

    /// Delete one row, returning its prior state.
    async fn delete(&self, id: ItemId) -> Result<Item, DbError>;

    /// Delete every row. Irreversible. Returns the number of rows removed.
    async fn delete_all(&self) -> Result<u64, DbError>;

    async fn get(&self, id: ItemId) -> Result<Item, DbError>;

    /// Newest first. Count and page are read independently.
    async fn list(&self, page: Pagination) -> Result<Paginated<Item>, DbError>;

    /// Case-insensitive substring match on `name` or `value`, newest first.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Item>, DbError>;

    async fn stats(&self) -> Result<ItemStats, DbError>;

    /// Round-trip probe used by the health endpoint.
    async fn diagnostics(&self) -> Result<Diagnostics, DbError>;

    fn pool_stats(&self) -> PoolStats;
}
