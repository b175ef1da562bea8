//! Database layer - connection pool, schema and item storage
//!
//! # Design Principles
//!
//! - Bounded pool with an acquisition timeout - callers get an error, not a hang
//! - Writes on a dedicated connection, one transaction per statement
//! - Reads on the shared pool executor, one statement at a time
//! - Handlers depend on the `ItemStore` trait, not on PostgreSQL

pub mod memory;
pub mod pool;
pub mod repos;
pub mod schema;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{ConnectionPool, DatabaseConfig, PoolConfig, PoolError};
pub use repos::ItemRepo;
pub use schema::ensure_schema;
pub use store::{DbError, ItemStore};
