//! Integration tests for the epistats refresh-cycle aggregation
//!
//! These tests drive the parser and the folds end-to-end over NDJSON
//! fixture files in `tests/fixtures/splunk/`, mirroring real search API
//! response bodies (preview envelopes, `"NO_DATA"` sentinels, out-of-range
//! rows included).

use chrono::NaiveDate;
use epistats_core::db::Database;
use epistats_core::splunk::{parse_results, QueryResult};
use epistats_core::stats::aggregate::{
    fold_active_apps, fold_code_entry_delay, fold_positive_tests, fold_used_auth_codes,
};
use epistats_core::stats::fill_days;
use epistats_core::StatisticsSnapshot;
use std::path::PathBuf;

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/splunk")
        .join(name)
}

/// Parse a fixture response body into normalized results
fn fixture_results(name: &str) -> Vec<QueryResult> {
    let body = std::fs::read_to_string(fixture_path(name)).expect("fixture should be readable");
    parse_results(&body).expect("fixture should parse")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Scaffold for the reference scenario: today = 2020-06-10, start = 2020-06-01
fn scenario_snapshot() -> StatisticsSnapshot {
    let mut snapshot = StatisticsSnapshot::new(date(2020, 6, 10));
    snapshot.history = fill_days(date(2020, 6, 1), date(2020, 6, 10));
    snapshot
}

fn open_store() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    db
}

// ============================================
// Parser over fixture bodies
// ============================================

#[test]
fn test_fixture_parsing_filters_previews_and_sorts() {
    let results = fixture_results("positive-test-count.ndjson");

    // 10 lines, one preview -> 9 results
    assert_eq!(results.len(), 9);
    // descending by time
    assert_eq!(results[0].time.date_naive(), date(2020, 6, 9));
    assert_eq!(results[8].time.date_naive(), date(2020, 6, 1));
    // the final (non-preview) row for 2020-06-09 won, not the preview
    assert_eq!(results[0].positive_test_count, Some(24));
    // the sentinel decoded to absent
    assert!(results[8].positive_test_count.is_none());
}

// ============================================
// End-to-end refresh cycle
// ============================================

#[test]
fn test_end_to_end_refresh_cycle() {
    let store = open_store();
    let mut snapshot = scenario_snapshot();
    assert_eq!(snapshot.history.len(), 9);

    fold_active_apps(&mut snapshot, &fixture_results("active-apps.ndjson"), None);
    fold_used_auth_codes(&mut snapshot, &fixture_results("used-auth-codes.ndjson"));
    fold_positive_tests(
        &mut snapshot,
        &fixture_results("positive-test-count.ndjson"),
        &store,
    )
    .unwrap();
    fold_code_entry_delay(&mut snapshot, &fixture_results("code-entry-delay.ndjson"));

    // active apps: newest row was NO_DATA, the one before carries the value
    assert_eq!(snapshot.total_active_users, Some(123_456));

    // auth codes: the 2020-05-20 row is outside the scaffold and must not
    // contribute to the total
    assert_eq!(snapshot.total_covid_codes_entered, 12);
    assert_eq!(snapshot.history[2].covid_codes_entered, Some(5));
    assert_eq!(snapshot.history[3].covid_codes_entered, Some(7));

    // infections: 2020-06-01 stays unset (sentinel), 06-02..06-09 are filled
    assert!(snapshot.history[0].new_infections.is_none());
    assert_eq!(snapshot.history[1].new_infections, Some(10));
    assert_eq!(snapshot.history[8].new_infections, Some(24));

    // rolling averages exist only where the full 7-day window is non-null:
    // index 6 includes the unset 2020-06-01, indices 7 and 8 are complete
    assert!(snapshot.history[6].new_infections_seven_day_average.is_none());
    assert_eq!(snapshot.history[7].new_infections_seven_day_average, Some(16));
    assert_eq!(snapshot.history[8].new_infections_seven_day_average, Some(18));
    assert_eq!(snapshot.new_infections_seven_day_avg, Some(18));

    // fresh store and no in-memory value 7 positions back -> change absent
    assert!(snapshot
        .new_infections_seven_day_avg_rel_prev_week
        .is_none());
    // but the latest average was persisted for the next cycle
    assert_eq!(store.find_seven_day_avg(date(2020, 6, 9)).unwrap(), Some(18));

    // delay ratio: (1+1+0 + 0+0+1) / (4+6) = 0.3
    let ratio = snapshot.covid_codes_entered0to2d_prev_week.unwrap();
    assert!((ratio - 0.3).abs() < 1e-9);
}

#[test]
fn test_refresh_cycle_with_seeded_history_store() {
    let store = open_store();
    // a previous cycle persisted the average for one week before the
    // latest computable day (2020-06-09)
    store.upsert_seven_day_avg(date(2020, 6, 2), 9).unwrap();

    let mut snapshot = scenario_snapshot();
    fold_positive_tests(
        &mut snapshot,
        &fixture_results("positive-test-count.ndjson"),
        &store,
    )
    .unwrap();

    let rel = snapshot.new_infections_seven_day_avg_rel_prev_week.unwrap();
    // 18 / 9 - 1
    assert!((rel - 1.0).abs() < 1e-9);
}

#[test]
fn test_second_cycle_reads_first_cycles_average() {
    let store = open_store();

    // cycle 1: scaffold through 2020-06-10, persists avg 18 for 2020-06-09
    let mut first = scenario_snapshot();
    fold_positive_tests(
        &mut first,
        &fixture_results("positive-test-count.ndjson"),
        &store,
    )
    .unwrap();
    assert_eq!(store.find_seven_day_avg(date(2020, 6, 9)).unwrap(), Some(18));

    // cycle 2, a week later: constant 21 infections through 2020-06-16
    let mut second = StatisticsSnapshot::new(date(2020, 6, 17));
    second.history = fill_days(date(2020, 6, 1), date(2020, 6, 17));
    for day in second.history.iter_mut() {
        day.new_infections = Some(21);
    }
    fold_positive_tests(&mut second, &[], &store).unwrap();

    assert_eq!(second.new_infections_seven_day_avg, Some(21));
    // previous week's value (18 for 2020-06-09) came from the store
    let rel = second.new_infections_seven_day_avg_rel_prev_week.unwrap();
    assert!((rel - (21.0 / 18.0 - 1.0)).abs() < 1e-9);
}

// ============================================
// Empty-cycle behavior
// ============================================

#[test]
fn test_empty_results_leave_metrics_absent() {
    let store = open_store();
    let mut snapshot = scenario_snapshot();

    fold_active_apps(&mut snapshot, &[], None);
    fold_used_auth_codes(&mut snapshot, &[]);
    fold_positive_tests(&mut snapshot, &[], &store).unwrap();
    fold_code_entry_delay(&mut snapshot, &[]);

    assert!(snapshot.total_active_users.is_none());
    assert_eq!(snapshot.total_covid_codes_entered, 0);
    assert!(snapshot.new_infections_seven_day_avg.is_none());
    assert!(snapshot.covid_codes_entered0to2d_prev_week.is_none());
    assert!(store.list_seven_day_avgs().unwrap().is_empty());
}

#[test]
fn test_empty_scaffold_is_tolerated() {
    let store = open_store();
    let mut snapshot = StatisticsSnapshot::new(date(2020, 6, 1));
    snapshot.history = fill_days(date(2020, 6, 1), date(2020, 6, 1));

    fold_used_auth_codes(&mut snapshot, &fixture_results("used-auth-codes.ndjson"));
    fold_positive_tests(
        &mut snapshot,
        &fixture_results("positive-test-count.ndjson"),
        &store,
    )
    .unwrap();

    assert!(snapshot.history.is_empty());
    assert_eq!(snapshot.total_covid_codes_entered, 0);
    assert!(snapshot.new_infections_seven_day_avg.is_none());
}
