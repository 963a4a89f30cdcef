//! Statistics provider boundary
//!
//! [`StatisticsProvider::compute_statistics`] is the single entry point
//! downstream consumers call; the caller owns scheduling and caching. A
//! cycle either returns a complete snapshot or fails as a whole; partial
//! results are never exposed.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Duration, Local};
use tokio::sync::Mutex;

use crate::config::SplunkConfig;
use crate::db::Database;
use crate::error::Result;
use crate::splunk::SplunkClient;
use crate::stats::aggregate::{
    fold_active_apps, fold_code_entry_delay, fold_positive_tests, fold_used_auth_codes,
};
use crate::stats::scaffold::fill_days;
use crate::types::StatisticsSnapshot;

/// Source of statistics snapshots.
#[async_trait]
pub trait StatisticsProvider: Send + Sync {
    /// Run one refresh cycle and return the completed snapshot.
    async fn compute_statistics(&self) -> Result<StatisticsSnapshot>;
}

/// The real statistics engine, backed by the Splunk search API and the
/// history store.
pub struct SplunkStatisticsProvider {
    config: SplunkConfig,
    client: SplunkClient,
    store: Arc<Database>,
    // serializes refresh cycles so overlapping invocations cannot interleave
    // history-store reads and writes
    cycle_lock: Mutex<()>,
}

impl SplunkStatisticsProvider {
    /// Create a provider from configuration and an opened history store.
    pub fn new(config: SplunkConfig, store: Arc<Database>) -> Result<Self> {
        let client = SplunkClient::new(config.clone())?;
        Ok(Self {
            config,
            client,
            store,
            cycle_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl StatisticsProvider for SplunkStatisticsProvider {
    async fn compute_statistics(&self) -> Result<StatisticsSnapshot> {
        let _cycle = self.cycle_lock.lock().await;
        let started = Instant::now();
        tracing::info!(url = %self.config.url, "Loading statistics from Splunk");

        let today = Local::now().date_naive();
        let end_date = today - Duration::days(self.config.end_days_back);
        tracing::info!(
            start = %self.config.start_date,
            end = %end_date,
            "Setting up statistics history"
        );

        let mut snapshot = StatisticsSnapshot::new(today);
        snapshot.history = fill_days(self.config.start_date, end_date);

        // All four fetches must succeed before any fold runs; a failure in
        // any one aborts the cycle without a partial snapshot.
        tracing::info!("Loading active apps");
        let active_apps = self.client.fetch_active_apps().await?;
        tracing::info!("Loading used auth code count");
        let auth_codes = self.client.fetch_used_auth_code_count(today).await?;
        tracing::info!("Loading positive test count");
        let positive_tests = self.client.fetch_positive_test_count(today).await?;
        tracing::info!("Loading covid codes entered within 0 to 2 days");
        let code_delays = self.client.fetch_covid_codes_entered_within_window().await?;

        fold_active_apps(
            &mut snapshot,
            &active_apps,
            self.config.active_apps_override,
        );
        fold_used_auth_codes(&mut snapshot, &auth_codes);
        fold_positive_tests(&mut snapshot, &positive_tests, &self.store)?;
        fold_code_entry_delay(&mut snapshot, &code_delays);

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Statistics loaded from Splunk"
        );
        Ok(snapshot)
    }
}
