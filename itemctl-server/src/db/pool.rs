//! Database connection pool management
//!
//! Wraps sqlx `PgPool` with explicit limits and timeouts.
//!
//! Two ways in:
//! - [`ConnectionPool::acquire`] hands out a dedicated connection for
//!   transactional work. The connection returns to the pool when the guard
//!   drops, on every exit path.
//! - [`ConnectionPool::shared`] is the pool-level executor for
//!   single-statement reads; sqlx acquires and releases around the statement.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Connection, PgConnection, PgPool, Postgres};

use crate::models::PoolStats;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Idle connections are closed after this long.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Callers give up waiting for a connection after this long.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Pool-level failures
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("timed out after {0:?} waiting for a database connection")]
    AcquisitionTimeout(Duration),

    #[error("connection pool is closed")]
    Closed,

    #[error("invalid database configuration: {0}")]
    Config(#[source] sqlx::Error),

    #[error("connection pool is unusable: {0}")]
    Fatal(#[source] sqlx::Error),
}

/// Where and how to connect
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection string; overrides the discrete fields when set
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    /// Require TLS when `Some(true)`, disable it when `Some(false)`.
    /// `None` keeps the `sslmode` of `url`, or disables TLS for the
    /// discrete fields.
    pub ssl: Option<bool>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            user: "postgres".to_string(),
            password: None,
            ssl: None,
        }
    }
}

impl DatabaseConfig {
    /// Build sqlx connect options.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Config`] if `url` is set and cannot be parsed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, PoolError> {
        let explicit = self.ssl.map(|require| {
            if require {
                PgSslMode::Require
            } else {
                PgSslMode::Disable
            }
        });

        if let Some(url) = &self.url {
            let options = url.parse::<PgConnectOptions>().map_err(PoolError::Config)?;
            return Ok(match explicit {
                Some(mode) => options.ssl_mode(mode),
                None => options,
            });
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .ssl_mode(explicit.unwrap_or(PgSslMode::Disable));
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }
}

/// Pool sizing and timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

/// Bounded PostgreSQL pool with a waiter counter.
#[derive(Clone)]
pub struct ConnectionPool {
    pool: PgPool,
    acquire_timeout: Duration,
    waiting: Arc<AtomicU32>,
}

impl ConnectionPool {
    /// Create a pool. Connections are opened lazily on first use, so the
    /// server can start while the database is still coming up.
    pub fn new(database: &DatabaseConfig, config: PoolConfig) -> Result<Self, PoolError> {
        let options = database.connect_options()?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(config.idle_timeout)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        Ok(Self::from_pool(pool, config.acquire_timeout))
    }

    /// Wrap an existing sqlx pool.
    pub fn from_pool(pool: PgPool, acquire_timeout: Duration) -> Self {
        Self {
            pool,
            acquire_timeout,
            waiting: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Check out a dedicated connection.
    ///
    /// The connection goes back to the idle set when the returned guard is
    /// dropped.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, PoolError> {
        let _waiting = WaitGuard::enter(&self.waiting);
        self.pool
            .acquire()
            .await
            .map_err(|e| self.classify(e))
    }

    /// Pool-level executor for single-statement reads.
    pub fn shared(&self) -> &PgPool {
        &self.pool
    }

    /// Map pool-level sqlx errors onto [`PoolError`], if they are one.
    pub fn pool_error(&self, err: &sqlx::Error) -> Option<PoolError> {
        match err {
            sqlx::Error::PoolTimedOut => Some(PoolError::AcquisitionTimeout(self.acquire_timeout)),
            sqlx::Error::PoolClosed => Some(PoolError::Closed),
            _ => None,
        }
    }

    fn classify(&self, err: sqlx::Error) -> PoolError {
        match self.pool_error(&err) {
            Some(pool_err) => pool_err,
            None if is_fatal(&err) => PoolError::Fatal(err),
            None => PoolError::Config(err),
        }
    }

    /// Current occupancy counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_count: self.pool.size(),
            idle_count: u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX),
            waiting_count: self.waiting.load(Ordering::Relaxed),
        }
    }

    /// Ping idle connections until one fails in a way the pool cannot
    /// recover from, then return that fault.
    ///
    /// Ticks with no idle connections are skipped: nothing has been
    /// established yet, or everything is checked out and being exercised by
    /// requests already.
    ///
    /// sqlx pings idle connections before handing them out and quietly
    /// replaces dead ones, so a failed ping is confirmed with a fresh
    /// connection outside the pool before it is judged.
    pub async fn watch_idle(&self, every: Duration) -> PoolError {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.pool.is_closed() {
                return PoolError::Closed;
            }
            if self.pool.num_idle() == 0 {
                continue;
            }

            if let Err(fault) = self.ping_idle().await {
                return fault;
            }
        }
    }

    /// Ping one pooled connection. Errors only with a fault the pool cannot
    /// recover from.
    pub async fn ping_idle(&self) -> Result<(), PoolError> {
        let ping = async {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await?;
            Ok::<(), sqlx::Error>(())
        };

        match ping.await {
            Ok(()) => {
                tracing::trace!("idle connection ping ok");
                Ok(())
            }
            Err(e) if is_fatal(&e) => Err(PoolError::Fatal(e)),
            Err(e) => {
                tracing::warn!(error = %e, "idle connection ping failed, checking database directly");
                self.check_backing_store().await
            }
        }
    }

    /// Open and close one connection outside the pool so connect errors
    /// surface as they are instead of as a pool timeout.
    pub async fn check_backing_store(&self) -> Result<(), PoolError> {
        let options = self.pool.connect_options();
        let connect = PgConnection::connect_with(&options);

        match tokio::time::timeout(self.acquire_timeout, connect).await {
            Ok(Ok(conn)) => {
                if let Err(e) = conn.close().await {
                    tracing::debug!(error = %e, "closing check connection failed");
                }
                Ok(())
            }
            Ok(Err(e)) if is_fatal(&e) => Err(PoolError::Fatal(e)),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "database check failed");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.acquire_timeout, "database check timed out");
                Ok(())
            }
        }
    }

    /// Close the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Whether an error means the backing store is gone rather than a single
/// statement having failed.
pub fn is_fatal(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Protocol(_) => true,
        // Class 57: operator intervention (admin shutdown, crash shutdown, ...)
        sqlx::Error::Database(db) => db.code().is_some_and(|code| code.starts_with("57P")),
        _ => false,
    }
}

/// Counts a caller as waiting until it leaves `acquire`, including by
/// cancellation.
struct WaitGuard<'a>(&'a AtomicU32);

impl<'a> WaitGuard<'a> {
    fn enter(counter: &'a AtomicU32) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}
