// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use coursemap_model::CourseRecord;
use rusqlite::{params, Connection};
use std::fmt::{Display, Formatter};
use std::path::Path;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

pub const CRATE_NAME: &str = "coursemap-store";
pub const SCHEMA_VERSION: i64 = 1;

#[derive(Debug)]
pub struct StoreError(pub String);
impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for StoreError {}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS courses (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  program TEXT NOT NULL DEFAULT '',
  foreign_course_title TEXT NOT NULL DEFAULT '',
  foreign_course_code TEXT NOT NULL DEFAULT '',
  foreign_credits TEXT NOT NULL DEFAULT '',
  home_course_title TEXT NOT NULL DEFAULT '',
  aok TEXT NOT NULL DEFAULT '',
  home_course_code TEXT NOT NULL DEFAULT '',
  course_notes TEXT NOT NULL DEFAULT '',
  pace_school TEXT NOT NULL DEFAULT '',
  pace_department TEXT NOT NULL DEFAULT '',
  created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_program ON courses(program);
CREATE INDEX IF NOT EXISTS idx_pace_school ON courses(pace_school);
CREATE INDEX IF NOT EXISTS idx_pace_department ON courses(pace_department);
";

/// The single shared record set. One connection behind an async mutex
/// serializes queries against ingestions, and `replace_all` runs as one
/// transaction, so readers observe the pre- or post-ingestion set in full,
/// never a partial write.
pub struct CourseStore {
    conn: Mutex<Connection>,
}

impl CourseStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError(e.to_string()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| StoreError(e.to_string()))?;
        conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))
            .map_err(|e| StoreError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Query functions borrow the connection through this guard; holding it
    /// excludes a concurrent replace.
    pub async fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }

    /// Replaces the entire record set: delete-all plus bulk insert inside a
    /// single transaction. A failure rolls back and leaves the previous set
    /// authoritative.
    pub async fn replace_all(&self, records: &[CourseRecord]) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(|e| StoreError(e.to_string()))?;
        {
            tx.execute("DELETE FROM courses", [])
                .map_err(|e| StoreError(e.to_string()))?;
            let mut stmt = tx
                .prepare(
                    "INSERT INTO courses (
                       program, foreign_course_title, foreign_course_code, foreign_credits,
                       home_course_title, aok, home_course_code, course_notes,
                       pace_school, pace_department
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .map_err(|e| StoreError(e.to_string()))?;
            for record in records {
                stmt.execute(params![
                    record.program,
                    record.foreign_course_title,
                    record.foreign_course_code,
                    record.foreign_credits,
                    record.home_course_title,
                    record.aok,
                    record.home_course_code,
                    record.course_notes,
                    record.pace_school,
                    record.pace_department,
                ])
                .map_err(|e| StoreError(e.to_string()))?;
            }
        }
        tx.commit().map_err(|e| StoreError(e.to_string()))?;
        info!(imported = records.len(), "course record set replaced");
        Ok(records.len())
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get::<_, i64>(0))
            .map(|v| v as u64)
            .map_err(|e| StoreError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(program: &str) -> CourseRecord {
        CourseRecord {
            program: program.to_string(),
            ..CourseRecord::default()
        }
    }

    #[tokio::test]
    async fn replace_all_is_wholesale_not_additive() {
        let store = CourseStore::open_in_memory().expect("open store");
        store
            .replace_all(&[record("Rome"), record("Tokyo")])
            .await
            .expect("first replace");
        assert_eq!(store.count().await.expect("count"), 2);

        store
            .replace_all(&[record("Madrid")])
            .await
            .expect("second replace");
        assert_eq!(store.count().await.expect("count"), 1);

        let conn = store.connection().await;
        let survivor: String = conn
            .query_row("SELECT program FROM courses", [], |row| row.get(0))
            .expect("single row");
        assert_eq!(survivor, "Madrid");
    }

    #[tokio::test]
    async fn replace_all_with_empty_set_clears_the_table() {
        let store = CourseStore::open_in_memory().expect("open store");
        store.replace_all(&[record("Rome")]).await.expect("seed");
        store.replace_all(&[]).await.expect("clear");
        assert_eq!(store.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn insertion_order_is_preserved_by_surrogate_ids() {
        let store = CourseStore::open_in_memory().expect("open store");
        store
            .replace_all(&[record("b"), record("a"), record("c")])
            .await
            .expect("replace");
        let conn = store.connection().await;
        let mut stmt = conn
            .prepare("SELECT program FROM courses ORDER BY id ASC")
            .expect("prepare");
        let programs: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows");
        assert_eq!(programs, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("courses.db");
        {
            let store = CourseStore::open(&path).expect("open store");
            store.replace_all(&[record("Rome")]).await.expect("seed");
        }
        let reopened = CourseStore::open(&path).expect("reopen store");
        assert_eq!(reopened.count().await.expect("count"), 1);
    }
}
