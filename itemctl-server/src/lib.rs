//! itemctl-server: HTTP façade over a single PostgreSQL table
//!
//! Maps HTTP requests for "items" onto validated, transactional database
//! operations, plus paginated listing, search and aggregate reads.
//!
//! - [`db`]: bounded connection pool, schema setup, the `ItemStore` seam
//! - [`http`]: axum router, handlers, error envelope
//! - [`models`]: validated input and response types

pub mod db;
pub mod http;
pub mod models;

pub use db::{ConnectionPool, DatabaseConfig, PoolConfig};
pub use http::{run_server, ServerConfig, ServerError};
