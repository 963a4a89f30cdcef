//! Splunk search response decoding
//!
//! The search API does not return a JSON array: the body is a sequence of
//! independent JSON objects, one per line, each an envelope carrying a
//! `preview` flag and the actual result row. Numeric fields may hold the
//! literal string `"NO_DATA"` instead of a number to mean "no data".
//!
//! Decoding is strict: a malformed line aborts the whole refresh cycle. An
//! empty body (or one containing only preview envelopes) is not an error;
//! it means the metric is unavailable for this cycle.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Literal sentinel the API emits in place of a missing numeric value.
const NO_DATA_SENTINEL: &str = "\"NO_DATA\"";

/// Envelope wrapping each response line.
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    /// Partial/incremental search result, not a finalized row
    #[serde(default)]
    preview: bool,
    /// The result row itself
    result: QueryResult,
}

/// One row returned by a metric query.
///
/// Every metric field is optional: each of the fixed queries populates only
/// its own columns, and the `"NO_DATA"` sentinel decodes to `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Row timestamp; the date part joins against the day scaffold
    pub time: DateTime<FixedOffset>,
    /// Active app count (active-apps query)
    pub active_apps: Option<i64>,
    /// Used authorization codes (auth-code query)
    pub used_authorization_codes_count: Option<i64>,
    /// Positive tests (positive-test query)
    pub positive_test_count: Option<i64>,
    /// Codes entered the day of symptom onset (code-entry-delay query)
    pub after_zero_days: Option<i64>,
    /// Codes entered one day after symptom onset
    pub after_one_days: Option<i64>,
    /// Codes entered two days after symptom onset
    pub after_two_days: Option<i64>,
    /// All codes entered in the bucket window
    pub total: Option<i64>,
}

/// Decode a raw Splunk response body into result rows, descending by time.
///
/// Preview envelopes are dropped. Empty and whitespace-only lines are
/// skipped; any other undecodable line is a hard failure for the cycle.
pub fn parse_results(body: &str) -> Result<Vec<QueryResult>> {
    let mut results = Vec::new();

    for (index, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Sentinel replacement must happen before decoding so every numeric
        // field uniformly decodes to absent.
        let sanitized = line.replace(NO_DATA_SENTINEL, "null");

        let envelope: ResponseEnvelope =
            serde_json::from_str(&sanitized).map_err(|e| Error::Parse {
                line: index + 1,
                message: e.to_string(),
            })?;

        if envelope.preview {
            continue;
        }
        results.push(envelope.result);
    }

    results.sort_by(|a, b| b.time.cmp(&a.time));
    Ok(results)
}
