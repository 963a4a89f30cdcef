//! History store for epistats
//!
//! Cross-cycle persistence for derived seven-day averages, using SQLite
//! with:
//! - Schema migrations via PRAGMA user_version
//! - A repository handle with upsert/lookup operations

pub mod repo;
pub mod schema;

pub use repo::Database;
