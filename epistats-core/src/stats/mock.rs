//! Synthetic statistics provider
//!
//! Stands in for the Splunk-backed engine when no search API is configured
//! (local development, CLI acceptance tests). The generated history is
//! deterministic so repeated runs and assertions agree, and the derived
//! statistics go through the same aggregation code as the real engine.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};

use crate::db::Database;
use crate::error::Result;
use crate::stats::aggregate::{calculate_rolling_average, derive_week_over_week};
use crate::stats::provider::StatisticsProvider;
use crate::stats::scaffold::fill_days;
use crate::types::StatisticsSnapshot;

/// Days of synthetic history generated by default
const DEFAULT_HISTORY_DAYS: i64 = 90;

/// Statistics provider producing deterministic synthetic data.
pub struct MockStatisticsProvider {
    store: Arc<Database>,
    start_date: NaiveDate,
}

impl MockStatisticsProvider {
    /// Create a mock provider with ~90 days of history ending today.
    pub fn new(store: Arc<Database>) -> Self {
        let start_date = Local::now().date_naive() - Duration::days(DEFAULT_HISTORY_DAYS);
        Self { store, start_date }
    }

    /// Create a mock provider with history starting at a fixed date.
    pub fn with_start_date(store: Arc<Database>, start_date: NaiveDate) -> Self {
        Self { store, start_date }
    }
}

#[async_trait]
impl StatisticsProvider for MockStatisticsProvider {
    async fn compute_statistics(&self) -> Result<StatisticsSnapshot> {
        let today = Local::now().date_naive();
        tracing::info!(start = %self.start_date, "Generating mock statistics");

        let mut snapshot = StatisticsSnapshot::new(today);
        snapshot.history = fill_days(self.start_date, today);

        let mut total_codes = 0;
        for (i, day) in snapshot.history.iter_mut().enumerate() {
            // weekly wave, deterministic per position
            let infections = 120 + 35 * (i as i64 % 7);
            let codes = 40 + 5 * (i as i64 % 5);
            day.new_infections = Some(infections);
            day.covid_codes_entered = Some(codes);
            total_codes += codes;
        }
        snapshot.total_covid_codes_entered = total_codes;
        snapshot.total_active_users = Some(1_600_000);

        calculate_rolling_average(&mut snapshot.history);
        derive_week_over_week(&mut snapshot, &self.store)?;
        snapshot.covid_codes_entered0to2d_prev_week = Some(0.8);

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_mock_produces_complete_snapshot() {
        let store = Arc::new(Database::open_in_memory().unwrap());
        store.migrate().unwrap();

        let provider = MockStatisticsProvider::new(store.clone());
        let snapshot = provider.compute_statistics().await.unwrap();

        assert_eq!(snapshot.history.len(), DEFAULT_HISTORY_DAYS as usize);
        assert_eq!(snapshot.total_active_users, Some(1_600_000));
        assert!(snapshot.new_infections_seven_day_avg.is_some());
        assert_eq!(snapshot.covid_codes_entered0to2d_prev_week, Some(0.8));

        // the latest rolling average was persisted for later cycles
        let last = snapshot.history.last().unwrap();
        assert_eq!(
            store.find_seven_day_avg(last.date).unwrap(),
            last.new_infections_seven_day_average
        );
    }

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let store = Arc::new(Database::open_in_memory().unwrap());
        store.migrate().unwrap();

        let provider = MockStatisticsProvider::with_start_date(store, date(2020, 6, 1));
        let a = provider.compute_statistics().await.unwrap();
        let b = provider.compute_statistics().await.unwrap();

        assert_eq!(a.history, b.history);
        assert_eq!(a.total_covid_codes_entered, b.total_covid_codes_entered);
    }
}
