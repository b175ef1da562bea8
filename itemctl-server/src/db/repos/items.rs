//! Item repository backed by PostgreSQL
//!
//! Every write runs on a dedicated connection inside its own transaction:
//! acquire, begin, one statement, commit or roll back. The connection guard
//! outlives the transaction, so rollback always happens before release.
//! Reads go through the shared pool executor one statement at a time.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Connection, Postgres, Transaction};

use crate::db::pool::ConnectionPool;
use crate::db::store::{DbError, ItemStore};
use crate::models::{
    Diagnostics, Item, ItemId, ItemStats, NewItem, Paginated, Pagination, PoolStats, SearchQuery,
};

const ITEM_COLUMNS: &str = "id, name, value, created_at";

/// Item repository
#[derive(Clone)]
pub struct ItemRepo {
    pool: ConnectionPool,
}

impl ItemRepo {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn read_error(&self, err: sqlx::Error) -> DbError {
        match self.pool.pool_error(&err) {
            Some(pool_err) => DbError::Pool(pool_err),
            None => DbError::Read(err),
        }
    }
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged and the original error is returned.
async fn settle<T>(tx: Transaction<'_, Postgres>, outcome: Result<T, DbError>) -> Result<T, DbError> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(DbError::Transaction)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, original = %err, "Rollback failed");
            }
            Err(err)
        }
    }
}

#[async_trait]
impl ItemStore for ItemRepo {
    async fn create(&self, item: NewItem) -> Result<Item, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await.map_err(DbError::Transaction)?;

        let outcome = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (name, value) VALUES ($1, $2) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.name.as_str())
        .bind(item.value.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::Transaction);

        settle(tx, outcome).await
    }

    async fn update(&self, id: ItemId, item: NewItem) -> Result<Item, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await.map_err(DbError::Transaction)?;

        let outcome = sqlx::query_as::<_, Item>(&format!(
            "UPDATE items SET name = $1, value = $2 WHERE id = $3 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.name.as_str())
        .bind(item.value.as_deref())
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::Transaction)
        .and_then(|row| row.ok_or_else(|| DbError::item_not_found(id)));

        settle(tx, outcome).await
    }

    async fn delete(&self, id: ItemId) -> Result<Item, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await.map_err(DbError::Transaction)?;

        let outcome = sqlx::query_as::<_, Item>(&format!(
            "DELETE FROM items WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::Transaction)
        .and_then(|row| row.ok_or_else(|| DbError::item_not_found(id)));

        settle(tx, outcome).await
    }

    async fn delete_all(&self) -> Result<u64, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await.map_err(DbError::Transaction)?;

        // DELETE rather than TRUNCATE: the id sequence must keep counting.
        let outcome = sqlx::query("DELETE FROM items")
            .execute(&mut *tx)
            .await
            .map(|done| done.rows_affected())
            .map_err(DbError::Transaction);

        settle(tx, outcome).await
    }

    async fn get(&self, id: ItemId) -> Result<Item, DbError> {
        sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(self.pool.shared())
            .await
            .map_err(|e| self.read_error(e))?
            .ok_or_else(|| DbError::item_not_found(id))
    }

    async fn list(&self, page: Pagination) -> Result<Paginated<Item>, DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(self.pool.shared())
            .await
            .map_err(|e| self.read_error(e))?;

        let items = sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(i64::from(page.limit()))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(self.pool.shared())
        .await
        .map_err(|e| self.read_error(e))?;

        Ok(Paginated { items, total, page })
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Item>, DbError> {
        sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE name ILIKE $1 OR value ILIKE $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(query.like_pattern())
        .fetch_all(self.pool.shared())
        .await
        .map_err(|e| self.read_error(e))
    }

    async fn stats(&self) -> Result<ItemStats, DbError> {
        let pool = self.pool.shared();

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items").fetch_one(pool);
        let unique =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT name) FROM items").fetch_one(pool);
        let range = sqlx::query_as::<_, (Option<NaiveDateTime>, Option<NaiveDateTime>)>(
            "SELECT MIN(created_at), MAX(created_at) FROM items",
        )
        .fetch_one(pool);

        let (total_items, unique_names, (oldest_item, newest_item)) =
            tokio::try_join!(total, unique, range).map_err(|e| self.read_error(e))?;

        Ok(ItemStats {
            total_items,
            unique_names,
            oldest_item,
            newest_item,
        })
    }

    async fn diagnostics(&self) -> Result<Diagnostics, DbError> {
        let pool = self.pool.shared();

        let started = Instant::now();
        let server_time: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
            .fetch_one(pool)
            .await
            .map_err(|e| self.read_error(e))?;
        let latency = started.elapsed();

        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(pool)
            .await
            .map_err(|e| self.read_error(e))?;

        let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(pool)
            .await
            .map_err(|e| self.read_error(e))?;

        Ok(Diagnostics {
            server_time,
            latency_ms: latency.as_secs_f64() * 1000.0,
            version,
            item_count,
        })
    }

    fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::{DatabaseConfig, PoolConfig};
    use crate::db::schema::ensure_schema;
    use crate::models::ItemName;

    // Integration tests - run with DATABASE_URL set, one thread (shared table)
    // cargo test -p itemctl-server -- --ignored --test-threads=1

    async fn fresh_repo() -> ItemRepo {
        let database = DatabaseConfig {
            url: Some(std::env::var("DATABASE_URL").expect("DATABASE_URL required")),
            ..DatabaseConfig::default()
        };
        let pool = ConnectionPool::new(&database, PoolConfig::default()).expect("pool");
        ensure_schema(pool.shared()).await.expect("schema");
        let repo = ItemRepo::new(pool);
        repo.delete_all().await.expect("reset");
        repo
    }

    fn new_item(name: &str, value: Option<&str>) -> NewItem {
        NewItem {
            name: ItemName::new(name).unwrap(),
            value: value.map(str::to_owned),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn ids_increase_and_survive_delete_all() {
        let repo = fresh_repo().await;
        let a = repo.create(new_item("a", None)).await.unwrap();
        let b = repo.create(new_item("b", None)).await.unwrap();
        assert!(b.id > a.id);

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        let c = repo.create(new_item("c", None)).await.unwrap();
        assert!(c.id > b.id);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_missing_row_rolls_back() {
        let repo = fresh_repo().await;
        let err = repo
            .update(ItemId::new(i32::MAX), new_item("x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let page = repo.list(Pagination::default()).await.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(repo.pool_stats().waiting_count, 0);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn failed_insert_leaves_no_row() {
        let repo = fresh_repo().await;
        repo.create(new_item("seed", None)).await.unwrap();

        // Raw insert past VARCHAR(255), skipping ItemName validation.
        let mut conn = repo.pool().acquire().await.unwrap();
        let mut tx = conn.begin().await.unwrap();
        let outcome = sqlx::query("INSERT INTO items (name) VALUES ($1)")
            .bind("x".repeat(300))
            .execute(&mut *tx)
            .await
            .map(|_| ())
            .map_err(DbError::Transaction);
        assert!(settle(tx, outcome).await.is_err());
        drop(conn);

        let page = repo.list(Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn search_treats_wildcards_literally() {
        let repo = fresh_repo().await;
        repo.create(new_item("100% cotton", None)).await.unwrap();
        repo.create(new_item("1000 cotton", None)).await.unwrap();

        let q = SearchQuery::new(Some("0%")).unwrap();
        let hits = repo.search(&q).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% cotton");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn stats_and_diagnostics() {
        let repo = fresh_repo().await;
        repo.create(new_item("dup", Some("1"))).await.unwrap();
        repo.create(new_item("dup", Some("2"))).await.unwrap();
        repo.create(new_item("solo", None)).await.unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.unique_names, 2);
        assert!(stats.oldest_item <= stats.newest_item);

        let diag = repo.diagnostics().await.unwrap();
        assert_eq!(diag.item_count, 3);
        assert!(diag.version.starts_with("PostgreSQL"));
    }
}
