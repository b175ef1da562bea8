//! In-memory [`ItemStore`] for tests and local experiments
//!
//! Writes stage changes on a copy of the table and swap it in only if the
//! operation succeeds, which gives the same all-or-nothing behavior as the
//! PostgreSQL transactions. Faults can be injected to exercise error paths.

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::Mutex;

use super::store::{DbError, ItemStore};
use crate::models::{
    Diagnostics, Item, ItemId, ItemStats, NewItem, Paginated, Pagination, PoolStats, SearchQuery,
};

#[derive(Debug, Clone)]
struct Table {
    next_id: i32,
    last_created: Option<NaiveDateTime>,
    rows: BTreeMap<i32, Item>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            last_created: None,
            rows: BTreeMap::new(),
        }
    }
}

impl Table {
    fn insert(&mut self, item: NewItem) -> Item {
        let now = Utc::now().naive_utc();
        let created_at = self.last_created.map_or(now, |last| last.max(now));
        self.last_created = Some(created_at);

        let row = Item {
            id: self.next_id,
            name: item.name.into_string(),
            value: item.value,
            created_at,
        };
        self.next_id += 1;
        self.rows.insert(row.id, row.clone());
        row
    }

    /// Rows newest first
    fn newest_first(&self) -> Vec<&Item> {
        let mut rows: Vec<&Item> = self.rows.values().collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows
    }
}

/// In-memory item table
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<Table>,
    round_trips: AtomicUsize,
    fail_writes: AtomicBool,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far.
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Make every write fail after staging its change, before commit.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every call fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of all rows, ordered by id.
    pub async fn rows(&self) -> Vec<Item> {
        self.table.lock().await.rows.values().cloned().collect()
    }

    fn round_trip(&self) -> Result<(), DbError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(DbError::Read(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "database unreachable",
            ))));
        }
        Ok(())
    }

    async fn write<T>(
        &self,
        op: impl FnOnce(&mut Table) -> Result<T, DbError> + Send,
    ) -> Result<T, DbError> {
        self.round_trip()?;
        let mut table = self.table.lock().await;
        let mut staged = table.clone();
        let value = op(&mut staged)?;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::Transaction(sqlx::Error::Protocol(
                "simulated fault before commit".into(),
            )));
        }

        *table = staged;
        Ok(value)
    }

    async fn read<T>(&self, op: impl FnOnce(&Table) -> T + Send) -> Result<T, DbError> {
        self.round_trip()?;
        let table = self.table.lock().await;
        Ok(op(&table))
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn create(&self, item: NewItem) -> Result<Item, DbError> {
        self.write(|table| Ok(table.insert(item))).await
    }

    async fn update(&self, id: ItemId, item: NewItem) -> Result<Item, DbError> {
        self.write(|table| {
            let row = table
                .rows
                .get_mut(&id.get())
                .ok_or_else(|| DbError::item_not_found(id))?;
            row.name = item.name.into_string();
            row.value = item.value;
            Ok(row.clone())
        })
        .await
    }

    async fn delete(&self, id: ItemId) -> Result<Item, DbError> {
        self.write(|table| {
            table
                .rows
                .remove(&id.get())
                .ok_or_else(|| DbError::item_not_found(id))
        })
        .await
    }

    async fn delete_all(&self) -> Result<u64, DbError> {
        self.write(|table| {
            let removed = table.rows.len() as u64;
            table.rows.clear();
            Ok(removed)
        })
        .await
    }

    async fn get(&self, id: ItemId) -> Result<Item, DbError> {
        self.read(|table| table.rows.get(&id.get()).cloned())
            .await?
            .ok_or_else(|| DbError::item_not_found(id))
    }

    async fn list(&self, page: Pagination) -> Result<Paginated<Item>, DbError> {
        self.read(|table| {
            let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
            let items = table
                .newest_first()
                .into_iter()
                .skip(skip)
                .take(page.limit() as usize)
                .cloned()
                .collect();
            Paginated {
                items,
                total: table.rows.len() as i64,
                page,
            }
        })
        .await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Item>, DbError> {
        self.read(|table| {
            table
                .newest_first()
                .into_iter()
                .filter(|row| {
                    query.matches(&row.name) || row.value.as_deref().is_some_and(|v| query.matches(v))
                })
                .cloned()
                .collect()
        })
        .await
    }

    async fn stats(&self) -> Result<ItemStats, DbError> {
        self.read(|table| {
            let mut names: Vec<&str> = table.rows.values().map(|r| r.name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            ItemStats {
                total_items: table.rows.len() as i64,
                unique_names: names.len() as i64,
                oldest_item: table.rows.values().map(|r| r.created_at).min(),
                newest_item: table.rows.values().map(|r| r.created_at).max(),
            }
        })
        .await
    }

    async fn diagnostics(&self) -> Result<Diagnostics, DbError> {
        self.read(|table| Diagnostics {
            server_time: Utc::now(),
            latency_ms: 0.0,
            version: "in-memory".to_string(),
            item_count: table.rows.len() as i64,
        })
        .await
    }

    fn pool_stats(&self) -> PoolStats {
        PoolStats::default()
    }
}
