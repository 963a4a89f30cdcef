//! Statistics computation
//!
//! One refresh cycle flows through this module:
//! scaffold construction → per-metric fetches → sequential folds →
//! a completed [`crate::StatisticsSnapshot`].
//!
//! [`StatisticsProvider`] is the sole entry point downstream consumers see;
//! [`SplunkStatisticsProvider`] is the real engine and
//! [`MockStatisticsProvider`] a synthetic stand-in for development.

pub mod aggregate;
pub mod mock;
pub mod provider;
pub mod scaffold;

pub use mock::MockStatisticsProvider;
pub use provider::{SplunkStatisticsProvider, StatisticsProvider};
pub use scaffold::fill_days;
