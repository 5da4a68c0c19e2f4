use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use crate::errors::ExportError;
use crate::export::Exporter;
use crate::model::{CheckResult, CheckStatus, RunRecord, RunStatus, Severity};

/// Reference SQLite sink. Upserts runs by id and results by
/// (run_id, check_name), so re-exporting the same run is a no-op.
#[derive(Clone)]
pub struct SqliteExporter {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExporter {
    pub fn open(path: &Path) -> Result<Self, ExportError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn memory() -> Result<Self, ExportError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, ExportError> {
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        conn.execute_batch(crate::export::schema::DDL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Reads a persisted run back. `served_from_cache` is a runtime flag and
    /// comes back false; everything else round-trips.
    pub fn load_run(&self, run_id: i64) -> Result<Option<RunRecord>, ExportError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, job_id, suite_name, suite_description, status,
                    started_at, ended_at, duration_ms, bytes_processed,
                    cache_hit, validate_first, validate_only, error_count, extra
             FROM runs WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![run_id], |row| {
            Ok(RunRecord {
                id: row.get(0)?,
                job_id: row.get(1)?,
                suite_name: row.get(2)?,
                suite_description: row.get(3)?,
                status: RunStatus::parse(&row.get::<_, String>(4)?),
                started_at: row.get(5)?,
                ended_at: row.get(6)?,
                duration_ms: row.get(7)?,
                bytes_processed: row.get::<_, i64>(8)? as u64,
                cache_hit: row.get(9)?,
                validate_first: row.get(10)?,
                validate_only: row.get(11)?,
                error_count: row.get(12)?,
                extra: row
                    .get::<_, Option<String>>(13)?
                    .and_then(|raw| serde_json::from_str(&raw).ok())
                    .unwrap_or_default(),
            })
        })?;
        match rows.next() {
            Some(run) => Ok(Some(run?)),
            None => Ok(None),
        }
    }

    /// Reads a run's persisted results back in insertion order.
    pub fn load_results(&self, run_id: i64) -> Result<Vec<CheckResult>, ExportError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT run_id, check_name, check_description, check_params,
                    status, severity, value, threshold_lower, threshold_upper, message
             FROM results WHERE run_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(CheckResult {
                run_id: row.get(0)?,
                check_name: row.get(1)?,
                check_description: row.get(2)?,
                check_params: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                status: CheckStatus::parse(&row.get::<_, String>(4)?),
                severity: Severity::parse(&row.get::<_, String>(5)?),
                value: row.get(6)?,
                threshold_lower: row.get(7)?,
                threshold_upper: row.get(8)?,
                message: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                served_from_cache: false,
            })
        })?;

        let mut results = Vec::new();
        for r in rows {
            results.push(r?);
        }
        Ok(results)
    }

    /// Row count helper for tests and diagnostics.
    pub fn count_rows(&self, table: &str) -> Result<i64, ExportError> {
        if !["runs", "results"].contains(&table) {
            return Err(ExportError::Sink {
                name: "sqlite".into(),
                reason: format!("invalid table name for count_rows: {}", table),
            });
        }
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(n)
    }
}

impl Exporter for SqliteExporter {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn export_run(&self, run: &RunRecord) -> Result<(), ExportError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO runs(
                id, job_id, suite_name, suite_description, status,
                started_at, ended_at, duration_ms, bytes_processed,
                cache_hit, validate_first, validate_only, error_count, extra
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(id) DO UPDATE SET
                job_id=excluded.job_id,
                suite_name=excluded.suite_name,
                suite_description=excluded.suite_description,
                status=excluded.status,
                started_at=excluded.started_at,
                ended_at=excluded.ended_at,
                duration_ms=excluded.duration_ms,
                bytes_processed=excluded.bytes_processed,
                cache_hit=excluded.cache_hit,
                validate_first=excluded.validate_first,
                validate_only=excluded.validate_only,
                error_count=excluded.error_count,
                extra=excluded.extra",
            params![
                run.id,
                run.job_id,
                run.suite_name,
                run.suite_description,
                run.status.as_str(),
                run.started_at,
                run.ended_at,
                run.duration_ms,
                run.bytes_processed as i64,
                run.cache_hit,
                run.validate_first,
                run.validate_only,
                run.error_count,
                run.extra_json(),
            ],
        )?;
        Ok(())
    }

    fn export_results(&self, run_id: i64, results: &[CheckResult]) -> Result<(), ExportError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO results(
                    run_id, check_name, check_description, check_params,
                    status, severity, value, threshold_lower, threshold_upper, message
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(run_id, check_name) DO UPDATE SET
                    check_description=excluded.check_description,
                    check_params=excluded.check_params,
                    status=excluded.status,
                    severity=excluded.severity,
                    value=excluded.value,
                    threshold_lower=excluded.threshold_lower,
                    threshold_upper=excluded.threshold_upper,
                    message=excluded.message",
            )?;
            for r in results {
                stmt.execute(params![
                    run_id,
                    r.check_name,
                    r.check_description,
                    r.check_params,
                    r.status.as_str(),
                    r.severity.as_str(),
                    r.value,
                    r.threshold_lower,
                    r.threshold_upper,
                    r.message,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
