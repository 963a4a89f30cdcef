//! # epistats-core
//!
//! Core library for epistats - an epidemiological usage-statistics
//! aggregation engine.
//!
//! Each refresh cycle fetches raw per-query result sets from a Splunk
//! search API, reconciles them against a calendar-complete day history, and
//! derives second-order statistics (seven-day rolling averages,
//! week-over-week change, code-entry-delay ratio). The latest rolling
//! average is persisted per day so later cycles can reference prior
//! results.
//!
//! This library provides:
//! - Domain types for the day history and the statistics snapshot
//! - The Splunk search client and response normalizer
//! - The aggregation engine behind the [`StatisticsProvider`] entry point
//! - The SQLite-backed history store
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use epistats_core::{Config, Database, SplunkStatisticsProvider, StatisticsProvider};
//!
//! # async fn run() -> epistats_core::Result<()> {
//! let config = Config::load()?;
//! let store = Arc::new(Database::open(&Config::database_path())?);
//! store.migrate()?;
//!
//! let provider = SplunkStatisticsProvider::new(config.splunk()?.clone(), store)?;
//! let snapshot = provider.compute_statistics().await?;
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use stats::{MockStatisticsProvider, SplunkStatisticsProvider, StatisticsProvider};
pub use types::{DayRecord, StatisticsSnapshot};

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod splunk;
pub mod stats;
pub mod types;
