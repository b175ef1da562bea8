//! HTTP server command

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use itemctl_server::{run_server, ConnectionPool, ServerConfig};

use super::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory served at `/` (must contain index.html)
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Seconds between idle connection probes
    #[arg(long, env = "DB_WATCHDOG_INTERVAL_SECS", default_value_t = 30)]
    pub watchdog_interval_secs: u64,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let pool = ConnectionPool::new(&args.db.database_config(), args.db.pool_config())
        .context("Failed to create database pool")?;

    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        cors_permissive: args.cors_permissive,
        static_dir: args.static_dir,
        watchdog_interval: Duration::from_secs(args.watchdog_interval_secs.max(1)),
    };

    tracing::info!(
        bind = %config.bind_addr,
        max_connections = args.db.pool_max,
        "Starting itemctl server"
    );

    // Run server (blocks until shutdown or a fatal pool fault)
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
