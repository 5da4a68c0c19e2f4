use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::thresholds::Threshold;

/// Severity of a check, independent of its pass/fail status.
///
/// Ordering follows declaration order, so `Severity::Critical` is the
/// maximum; evaluator failures escalate to it via `max`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "info" => Severity::Info,
            "critical" => Severity::Critical,
            _ => Severity::Warning,
        }
    }
}

/// Outcome of a single check within a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pass" => CheckStatus::Pass,
            "fail" => CheckStatus::Fail,
            _ => CheckStatus::Error,
        }
    }
}

/// Lifecycle status of one suite execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Passed => "passed",
            RunStatus::Failed => "failed",
            RunStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => RunStatus::Pending,
            "running" => RunStatus::Running,
            "passed" => RunStatus::Passed,
            "failed" => RunStatus::Failed,
            _ => RunStatus::Error,
        }
    }
}

/// One data-quality rule: an evaluator kind plus parameters, severity and
/// optional threshold bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Evaluator kind, resolved against the registry at suite-load time.
    pub kind: String,
    /// Parameters keyed by name. BTreeMap keeps the serialized form
    /// deterministic for cache keys and audit snapshots.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
}

impl Check {
    /// Canonical serialized parameters, snapshotted onto results.
    pub fn params_json(&self) -> String {
        serde_json::to_string(&self.params).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.params.get(name)
    }
}

/// Named, ordered collection of checks sharing one data source.
/// Immutable once a run starts: the coordinator snapshots everything it
/// needs, so later edits never alter historical runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub checks: Vec<Check>,
}

/// Caller-supplied execution modes for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Gate the full suite behind a single smoke check.
    pub validate_first: bool,
    /// Serve cached results without fresh evaluation when available.
    pub validate_only: bool,
    /// Name of the smoke check for `validate_first`; defaults to the first
    /// check in the suite.
    pub smoke_check: Option<String>,
    /// Parallel evaluator workers.
    pub parallel: usize,
    /// Per-check evaluation timeout.
    pub check_timeout: Duration,
    /// Opaque payload passed through to exporters.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            validate_first: false,
            validate_only: false,
            smoke_check: None,
            parallel: 4,
            check_timeout: Duration::from_secs(30),
            extra: BTreeMap::new(),
        }
    }
}

/// Suite-level record of one execution, pushed to exporter sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: i64,
    /// Caller-supplied correlation id, not unique.
    pub job_id: String,
    pub suite_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_description: Option<String>,
    pub status: RunStatus,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    pub bytes_processed: u64,
    /// True iff every result in the run was served from cache.
    pub cache_hit: bool,
    pub validate_first: bool,
    pub validate_only: bool,
    pub error_count: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RunRecord {
    pub fn extra_json(&self) -> String {
        serde_json::to_string(&self.extra).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Outcome of one check within a run. Immutable once written; `run_id` is a
/// plain foreign-key identifier, the run owns the ordered collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub run_id: i64,
    pub check_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_description: Option<String>,
    /// Serialized parameter snapshot, for audit and export.
    pub check_params: String,
    pub status: CheckStatus,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_upper: Option<f64>,
    pub message: String,
    /// Runtime flag, not persisted by the SQLite sink.
    #[serde(default)]
    pub served_from_cache: bool,
}
