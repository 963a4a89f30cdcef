//! HTTP client for the Splunk search API
//!
//! One fixed query exists per derived metric. Each fetch issues a single
//! form-encoded POST with basic auth and a time window, and normalizes the
//! newline-delimited response through [`parse_results`].
//!
//! Both the connect and the full-request timeout are bounded at client
//! construction. The refresh cycle is synchronous end-to-end, so an
//! unbounded call here would wedge the whole cycle.

use std::time::Duration;

use chrono::NaiveDate;

use crate::config::SplunkConfig;
use crate::error::{Error, Result};

use super::response::{parse_results, QueryResult};

/// User agent sent with every search request
const USER_AGENT: &str = "epistats-backend";

/// Lookback window for the active-apps query, in days
const ACTIVE_APPS_LOOKBACK_DAYS: i64 = 10;

/// Lookback window for the code-entry-delay query, in days
const CODE_ENTRY_WINDOW_DAYS: i64 = 7;

/// Client for the Splunk search endpoint
pub struct SplunkClient {
    config: SplunkConfig,
    http_client: reqwest::Client,
}

impl SplunkClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: SplunkConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Fetch active app counts over the last ten days
    pub async fn fetch_active_apps(&self) -> Result<Vec<QueryResult>> {
        let (earliest, latest) = relative_window(ACTIVE_APPS_LOOKBACK_DAYS);
        self.search(&self.config.active_apps_query, &earliest, &latest)
            .await
    }

    /// Fetch used authorization code counts over the full history
    pub async fn fetch_used_auth_code_count(&self, today: NaiveDate) -> Result<Vec<QueryResult>> {
        let (earliest, latest) =
            absolute_window(self.config.start_date, today, self.config.end_days_back);
        self.search(&self.config.used_auth_code_count_query, &earliest, &latest)
            .await
    }

    /// Fetch positive test counts over the full history
    pub async fn fetch_positive_test_count(&self, today: NaiveDate) -> Result<Vec<QueryResult>> {
        let (earliest, latest) =
            absolute_window(self.config.start_date, today, self.config.end_days_back);
        self.search(&self.config.positive_test_count_query, &earliest, &latest)
            .await
    }

    /// Fetch code-entry delay buckets over the last seven days
    pub async fn fetch_covid_codes_entered_within_window(&self) -> Result<Vec<QueryResult>> {
        let (earliest, latest) = relative_window(CODE_ENTRY_WINDOW_DAYS);
        self.search(&self.config.covid_codes_entered_query, &earliest, &latest)
            .await
    }

    /// Issue one search request and normalize the response.
    ///
    /// Any transport failure or non-success status aborts the refresh cycle.
    async fn search(&self, query: &str, earliest: &str, latest: &str) -> Result<Vec<QueryResult>> {
        let params = [
            ("search", query),
            ("earliest_time", earliest),
            ("latest_time", latest),
            ("output_mode", "json"),
        ];

        tracing::debug!(url = %self.config.url, earliest, latest, "Issuing search request");

        let response = self
            .http_client
            .post(&self.config.url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Splunk(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::Splunk(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Splunk(format!("failed to read response body: {}", e)))?;

        parse_results(&body)
    }
}

/// Window for short lookbacks: the last `days_back` days through now.
fn relative_window(days_back: i64) -> (String, String) {
    (format!("-{}d@d", days_back), "now".to_string())
}

/// Window for full-history queries: from the configured start date through
/// `end_days_back` days before today.
fn absolute_window(start_date: NaiveDate, today: NaiveDate, end_days_back: i64) -> (String, String) {
    let days_back = today.signed_duration_since(start_date).num_days();
    (
        format!("-{}d@d", days_back),
        format!("-{}d@d", end_days_back),
    )
}
