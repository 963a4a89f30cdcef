//! Folding of per-metric query results into the statistics snapshot
//!
//! Each fold consumes one normalized result list (most-recent-first) and
//! mutates the snapshot. Folds never fail on missing data: a metric that is
//! absent from a cycle leaves the corresponding field absent. Only history
//! store I/O can abort a fold.

use chrono::Duration;

use crate::db::Database;
use crate::error::Result;
use crate::splunk::QueryResult;
use crate::types::{DayRecord, StatisticsSnapshot};

/// Fold active app counts: the most recent result carrying a value wins.
///
/// A configured override replaces the fetched value unconditionally.
pub fn fold_active_apps(
    snapshot: &mut StatisticsSnapshot,
    results: &[QueryResult],
    override_count: Option<i64>,
) {
    if !results.is_empty() {
        // results are descending by time, so the first hit is the latest
        snapshot.total_active_users = results.iter().find_map(|r| r.active_apps);
    }
    if let Some(count) = override_count {
        tracing::info!(
            from_query = ?snapshot.total_active_users,
            override_count = count,
            "Overriding active app count"
        );
        snapshot.total_active_users = Some(count);
    }
}

/// Fold used authorization codes into the day history and the running total.
///
/// Results whose date falls outside the scaffold, or whose count is absent,
/// are skipped and contribute nothing to the total.
pub fn fold_used_auth_codes(snapshot: &mut StatisticsSnapshot, results: &[QueryResult]) {
    let mut total = 0;
    for result in results {
        let Some(count) = result.used_authorization_codes_count else {
            continue;
        };
        let date = result.time.date_naive();
        if let Some(day) = snapshot.history.iter_mut().find(|d| d.date == date) {
            day.covid_codes_entered = Some(count);
            total += count;
        }
    }
    snapshot.total_covid_codes_entered = total;
}

/// Fold positive test counts, then derive the seven-day rolling averages and
/// the week-over-week change (persisting the latest average to the store).
pub fn fold_positive_tests(
    snapshot: &mut StatisticsSnapshot,
    results: &[QueryResult],
    store: &Database,
) -> Result<()> {
    for result in results {
        let Some(count) = result.positive_test_count else {
            continue;
        };
        let date = result.time.date_naive();
        if let Some(day) = snapshot.history.iter_mut().find(|d| d.date == date) {
            day.new_infections = Some(count);
        }
    }

    calculate_rolling_average(&mut snapshot.history);
    derive_week_over_week(snapshot, store)
}

/// Fold code-entry delay buckets into the 0-to-2-days ratio.
///
/// An empty window leaves the ratio absent; a window with results but a zero
/// total yields exactly 1.0 by policy. Absent bucket fields count as zero.
pub fn fold_code_entry_delay(snapshot: &mut StatisticsSnapshot, results: &[QueryResult]) {
    if results.is_empty() {
        return;
    }

    let mut within_0_to_2_days = 0;
    let mut total = 0;
    for result in results {
        within_0_to_2_days += result.after_zero_days.unwrap_or(0)
            + result.after_one_days.unwrap_or(0)
            + result.after_two_days.unwrap_or(0);
        total += result.total.unwrap_or(0);
    }

    snapshot.covid_codes_entered0to2d_prev_week = if total == 0 {
        Some(1.0)
    } else {
        Some(within_0_to_2_days as f64 / total as f64)
    };
}

/// Compute the strict trailing seven-day average of new infections.
///
/// The average at day D exists only when all seven days `[D-6, D]` carry a
/// value; it is the integer-rounded mean. Partial windows are never used.
pub fn calculate_rolling_average(history: &mut [DayRecord]) {
    for i in 6..history.len() {
        let mut sum = 0;
        let mut complete = true;
        for j in i - 6..=i {
            match history[j].new_infections {
                Some(count) => sum += count,
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if complete {
            history[i].new_infections_seven_day_average = Some((sum as f64 / 7.0).round() as i64);
        }
    }
}

/// Derive the latest seven-day average and its change versus one week back.
///
/// Walks the history newest to oldest to the first record with a rolling
/// average, persists that value to the store keyed by its date, and resolves
/// the previous week's value from the store. On a store miss the in-memory
/// average seven positions earlier stands in (valid because the scaffold has
/// no gaps); with fewer than seven preceding records there is no fallback.
///
/// When the previous value is absent or zero the relative change is left
/// absent rather than dividing into infinity.
pub fn derive_week_over_week(snapshot: &mut StatisticsSnapshot, store: &Database) -> Result<()> {
    let latest = snapshot
        .history
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, day)| {
            day.new_infections_seven_day_average
                .map(|avg| (i, day.date, avg))
        });

    let Some((index, day, latest_avg)) = latest else {
        return Ok(());
    };

    store.upsert_seven_day_avg(day, latest_avg)?;

    let mut previous = store.find_seven_day_avg(day - Duration::days(7))?;
    if previous.is_none() {
        tracing::warn!(%day, "No seven day average history for day, using current data as fallback");
        previous = index
            .checked_sub(7)
            .and_then(|j| snapshot.history[j].new_infections_seven_day_average);
    }

    snapshot.new_infections_seven_day_avg = Some(latest_avg);
    snapshot.new_infections_seven_day_avg_rel_prev_week = match previous {
        Some(prev) if prev != 0 => Some(latest_avg as f64 / prev as f64 - 1.0),
        _ => None,
    };

    Ok(())
}
