//! Schema initialization command
//!
//! Same idempotent setup the server runs at startup, but failures are
//! reported through the exit code so it can be retried from scripts.

use anyhow::{Context, Result};
use clap::Parser;

use itemctl_server::db::ensure_schema;
use itemctl_server::ConnectionPool;

use super::DatabaseArgs;

/// Arguments for the init-db command
#[derive(Parser, Debug)]
pub struct InitDbArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Create the items table and indexes, then exit
pub async fn run_init_db(args: InitDbArgs) -> Result<()> {
    let pool = ConnectionPool::new(&args.db.database_config(), args.db.pool_config())
        .context("Failed to create database pool")?;

    let outcome = ensure_schema(pool.shared())
        .await
        .context("Schema initialization failed");
    pool.close().await;

    outcome
}
