//! Core domain types for epistats
//!
//! These types form the statistics object handed to downstream consumers
//! after a refresh cycle. Serialization uses the camelCase wire names the
//! public statistics endpoint has always exposed.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Refresh cycle** | One end-to-end run producing a [`StatisticsSnapshot`] |
//! | **Scaffold** | The calendar-complete [`DayRecord`] sequence used as the join backbone |
//! | **Rolling average** | Trailing 7-sample mean of new infections, strict (no partial windows) |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day in the statistics history.
///
/// Exactly one record exists per date in the scaffold range, contiguous and
/// ascending. All metric fields start unset and are filled by the folds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    /// Calendar date (unique key within a history)
    pub date: NaiveDate,
    /// Positive tests reported for this day
    pub new_infections: Option<i64>,
    /// Covid codes entered on this day
    pub covid_codes_entered: Option<i64>,
    /// Trailing 7-day average of new infections ending at this day.
    ///
    /// Present only when all seven days of the window carry a value.
    pub new_infections_seven_day_average: Option<i64>,
}

impl DayRecord {
    /// Create an empty record for a date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            new_infections: None,
            covid_codes_entered: None,
            new_infections_seven_day_average: None,
        }
    }
}

/// Aggregate result of one refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    /// Date the snapshot was computed
    pub last_updated: NaiveDate,
    /// Calendar-complete day history, ascending
    pub history: Vec<DayRecord>,
    /// Most recently observed active app count (or configured override)
    pub total_active_users: Option<i64>,
    /// Sum of covid codes entered across the history
    pub total_covid_codes_entered: i64,
    /// Most recent non-null seven-day average of new infections
    pub new_infections_seven_day_avg: Option<i64>,
    /// Relative change of the seven-day average versus one week earlier.
    ///
    /// Absent when no previous-week value exists or it is zero.
    pub new_infections_seven_day_avg_rel_prev_week: Option<f64>,
    /// Share of covid codes entered within 0-2 days of symptom onset over
    /// the last seven days, in `[0, 1]`. Exactly `1.0` when the window has
    /// results but a zero total; absent when the metric was unavailable.
    pub covid_codes_entered0to2d_prev_week: Option<f64>,
}

impl StatisticsSnapshot {
    /// Create an empty snapshot stamped with a computation date
    pub fn new(last_updated: NaiveDate) -> Self {
        Self {
            last_updated,
            history: Vec::new(),
            total_active_users: None,
            total_covid_codes_entered: 0,
            new_infections_seven_day_avg: None,
            new_infections_seven_day_avg_rel_prev_week: None,
            covid_codes_entered0to2d_prev_week: None,
        }
    }
}
