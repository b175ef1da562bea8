//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - One statement per write, wrapped in its own transaction
//! - RETURNING instead of a follow-up SELECT
//! - Zero affected rows on a targeted write is NotFound, never committed

pub mod items;

pub use items::ItemRepo;
