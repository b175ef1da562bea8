//! Idempotent schema setup for the items table

use sqlx::PgPool;

/// Create the items table and its indexes if they do not exist.
///
/// Safe to run on every startup and to retry after a failure.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring items schema...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id SERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            value TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_created_at ON items (created_at)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_name ON items (name)")
        .execute(pool)
        .await?;

    tracing::info!("Items schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn schema_is_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPool::connect(&url).await.expect("connect failed");

        ensure_schema(&pool).await.expect("first run");
        ensure_schema(&pool).await.expect("second run");

        let (indexes,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM pg_indexes WHERE tablename = 'items' AND indexname LIKE 'idx_items_%'",
        )
        .fetch_one(&pool)
        .await
        .expect("index query");
        assert_eq!(indexes, 2);
    }
}
