use std::time::Duration;
use thiserror::Error;

/// Suite/check definition problems. Fatal at `start_run` or config load,
/// never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("suite '{0}' has no checks")]
    EmptySuite(String),

    #[error("duplicate check name '{check}' in suite '{suite}'")]
    DuplicateCheck { suite: String, check: String },

    #[error("check '{check}': threshold lower {lower} exceeds upper {upper}")]
    InvalidThreshold {
        check: String,
        lower: f64,
        upper: f64,
    },

    #[error("check '{check}' declares unknown kind '{kind}'")]
    UnknownCheckKind { check: String, kind: String },

    #[error("suite '{suite}' has no check named '{check}' to use as smoke check")]
    UnknownSmokeCheck { suite: String, check: String },

    #[error("failed to load suite definition: {0}")]
    Parse(String),
}

/// Failure of a single evaluator invocation. Recovered into a per-check
/// `error` result, except `SourceUnavailable` which aborts the run.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("evaluation timed out after {0:?}")]
    Timeout(Duration),

    #[error("evaluation failed: {0}")]
    Unknown(String),
}

impl EvalError {
    /// A fatal error aborts the remaining checks of the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvalError::SourceUnavailable(_))
    }
}

/// Result cache storage failure. Always degraded to a cache miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage unavailable: {0}")]
    Unavailable(String),
}

/// Exporter sink failure. Surfaced after the run completes; the run status
/// itself is unaffected and the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("sqlite export failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error during export: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed during export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("exporter '{name}' failed: {reason}")]
    Sink { name: String, reason: String },
}
