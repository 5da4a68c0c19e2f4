pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
  id INTEGER PRIMARY KEY,
  job_id TEXT NOT NULL,
  suite_name TEXT NOT NULL,
  suite_description TEXT,
  status TEXT NOT NULL,
  started_at TEXT NOT NULL,
  ended_at TEXT,
  duration_ms INTEGER,
  bytes_processed INTEGER NOT NULL DEFAULT 0,
  cache_hit INTEGER NOT NULL DEFAULT 0,
  validate_first INTEGER NOT NULL DEFAULT 0,
  validate_only INTEGER NOT NULL DEFAULT 0,
  error_count INTEGER NOT NULL DEFAULT 0,
  extra TEXT,
  created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS results (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id INTEGER NOT NULL REFERENCES runs(id),
  check_name TEXT NOT NULL,
  check_description TEXT,
  check_params TEXT,
  status TEXT NOT NULL,
  severity TEXT NOT NULL,
  value REAL,
  threshold_lower REAL,
  threshold_upper REAL,
  message TEXT,
  UNIQUE(run_id, check_name)
);

CREATE INDEX IF NOT EXISTS idx_results_run_id ON results(run_id);
"#;
