//! History store repository
//!
//! Read-then-write access happens inside the positive-test fold of a
//! refresh cycle; the single mutex-guarded connection serializes store
//! access across callers.

use crate::error::{Error, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;

/// Date format used for the `day` primary key column
const DAY_FORMAT: &str = "%Y-%m-%d";

/// History store handle (single guarded connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a history store at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode keeps concurrent readers (e.g. the CLI history command)
        // from blocking a running refresh cycle
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory history store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this store
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Insert or overwrite the seven-day average for a day
    pub fn upsert_seven_day_avg(&self, day: NaiveDate, value: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO seven_day_avg_history (day, seven_day_avg, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(day) DO UPDATE SET
                seven_day_avg = excluded.seven_day_avg,
                updated_at = excluded.updated_at
            "#,
            params![
                day.format(DAY_FORMAT).to_string(),
                value,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Look up the persisted seven-day average for a day
    pub fn find_seven_day_avg(&self, day: NaiveDate) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT seven_day_avg FROM seven_day_avg_history WHERE day = ?",
            [day.format(DAY_FORMAT).to_string()],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    /// List all persisted seven-day averages, ascending by day
    pub fn list_seven_day_avgs(&self) -> Result<Vec<(NaiveDate, i64)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT day, seven_day_avg FROM seven_day_avg_history ORDER BY day ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let day: String = row.get(0)?;
            let value: i64 = row.get(1)?;
            Ok((day, value))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (day, value) = row?;
            let date = NaiveDate::parse_from_str(&day, DAY_FORMAT)
                .map_err(|e| Error::Config(format!("invalid day key in store: {}", e)))?;
            entries.push((date, value));
        }
        Ok(entries)
    }
}
