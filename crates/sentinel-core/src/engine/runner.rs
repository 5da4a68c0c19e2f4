use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::cache::ResultCache;
use crate::config::validate_suite;
use crate::errors::{ConfigError, EvalError, ExportError};
use crate::evaluator::EvaluatorRegistry;
use crate::export::Exporter;
use crate::fingerprint::cache_key;
use crate::model::{Check, CheckResult, CheckStatus, RunOptions, RunRecord, RunStatus, Severity, Suite};
use crate::source::DataSource;

/// External cancellation signal for a run. In-flight checks finish, no new
/// checks are dispatched, and the run terminates as `error` with the reason
/// recorded in `extra["cancel_reason"]`.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Mutex<Option<String>>>,
}

impl CancelToken {
    pub fn cancel(&self, reason: &str) {
        let mut guard = self.inner.lock().unwrap();
        if guard.is_none() {
            *guard = Some(reason.to_string());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().unwrap().is_some()
    }

    pub fn reason(&self) -> Option<String> {
        self.inner.lock().unwrap().clone()
    }
}

/// One started run: suite metadata snapshotted at `start_run`, immune to
/// later suite mutation. No process-wide "current run" exists; every call
/// goes through a handle.
pub struct RunHandle {
    run_id: i64,
    job_id: String,
    suite: Suite,
    source: Arc<dyn DataSource>,
    options: RunOptions,
    started_at: chrono::DateTime<chrono::Utc>,
    cancel: CancelToken,
}

impl std::fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("run_id", &self.run_id)
            .field("job_id", &self.job_id)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl RunHandle {
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self, reason: &str) {
        self.cancel.cancel(reason);
    }
}

/// Finalized run plus its ordered results.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run: RunRecord,
    pub results: Vec<CheckResult>,
}

/// Owns the lifecycle of suite executions: scheduling checks, applying the
/// caching / validate-only / validate-first policy, aggregating results and
/// pushing finished runs to the exporter sinks.
pub struct Runner {
    registry: EvaluatorRegistry,
    cache: Arc<dyn ResultCache>,
    exporters: Vec<Arc<dyn Exporter>>,
    next_run_id: AtomicI64,
}

impl Runner {
    pub fn new(registry: EvaluatorRegistry, cache: Arc<dyn ResultCache>) -> Self {
        Self {
            registry,
            cache,
            exporters: Vec::new(),
            next_run_id: AtomicI64::new(1),
        }
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn Exporter>) -> Self {
        self.exporters.push(exporter);
        self
    }

    /// Validates the suite, assigns a run id and snapshots suite metadata.
    /// Fails fast on malformed suites; never retried.
    pub fn start_run(
        &self,
        suite: &Suite,
        source: Arc<dyn DataSource>,
        job_id: &str,
        options: RunOptions,
    ) -> Result<RunHandle, ConfigError> {
        validate_suite(suite)?;
        self.registry.resolve(suite)?;
        if let Some(name) = options.smoke_check.as_deref() {
            if !suite.checks.iter().any(|c| c.name == name) {
                return Err(ConfigError::UnknownSmokeCheck {
                    suite: suite.name.clone(),
                    check: name.to_string(),
                });
            }
        }

        let run_id = self.next_run_id.fetch_add(1, Ordering::SeqCst);
        tracing::info!(run_id, suite = %suite.name, job_id, "run started");

        Ok(RunHandle {
            run_id,
            job_id: job_id.to_string(),
            suite: suite.clone(),
            source,
            options,
            started_at: chrono::Utc::now(),
            cancel: CancelToken::default(),
        })
    }

    /// Evaluates every check of the suite in declared order and finalizes
    /// the run. Individual check failures never raise here; they become
    /// `error` results. A data source that turns unusable mid-run aborts the
    /// remaining unattempted checks and forces run status `error`.
    pub async fn execute(&self, handle: RunHandle) -> anyhow::Result<RunOutcome> {
        let RunHandle {
            run_id,
            job_id,
            suite,
            source,
            options,
            started_at,
            cancel,
        } = handle;

        tracing::info!(run_id, suite = %suite.name, checks = suite.checks.len(), "run executing");

        let ctx = Arc::new(CheckContext {
            run_id,
            registry: self.registry.clone(),
            cache: Arc::clone(&self.cache),
            source,
            validate_only: options.validate_only,
            check_timeout: options.check_timeout,
            bytes_processed: AtomicU64::new(0),
            fatal: Mutex::new(None),
        });

        let mut slots: Vec<Option<CheckResult>> = suite.checks.iter().map(|_| None).collect();
        let mut aborted = false;

        // validate_first is an ordering barrier: the smoke check's status
        // must be known before any other evaluation starts.
        let mut smoke_idx = None;
        if options.validate_first {
            let idx = options
                .smoke_check
                .as_deref()
                .and_then(|name| suite.checks.iter().position(|c| c.name == name))
                .unwrap_or(0);
            let result = ctx.run_check(&suite.checks[idx]).await;
            let errored = result.status == CheckStatus::Error;
            slots[idx] = Some(result);
            smoke_idx = Some(idx);
            if errored {
                tracing::warn!(run_id, check = %suite.checks[idx].name, "smoke check errored, aborting run");
                aborted = true;
            }
        }

        if !aborted {
            let sem = Arc::new(Semaphore::new(options.parallel.max(1)));
            let mut handles = Vec::new();
            for (idx, check) in suite.checks.iter().enumerate() {
                if Some(idx) == smoke_idx {
                    continue;
                }
                if cancel.is_cancelled() || ctx.is_fatal() {
                    break;
                }
                let permit = sem.clone().acquire_owned().await?;
                // an in-flight check may have raised an abort condition
                // while we waited for the permit
                if cancel.is_cancelled() || ctx.is_fatal() {
                    break;
                }
                let ctx = Arc::clone(&ctx);
                let check = check.clone();
                handles.push((
                    idx,
                    tokio::spawn(async move {
                        let _permit = permit;
                        ctx.run_check(&check).await
                    }),
                ));
            }

            for (idx, h) in handles {
                let result = match h.await {
                    Ok(result) => result,
                    Err(e) => {
                        ctx.error_result(&suite.checks[idx], &format!("task error: {}", e))
                    }
                };
                slots[idx] = Some(result);
            }
        }

        // unattempted checks leave no results behind
        let results: Vec<CheckResult> = slots.into_iter().flatten().collect();
        let error_count = results
            .iter()
            .filter(|r| r.status == CheckStatus::Error)
            .count() as u32;
        let any_fail = results.iter().any(|r| r.status == CheckStatus::Fail);
        let all_cached = !results.is_empty() && results.iter().all(|r| r.served_from_cache);

        let mut extra = options.extra;
        let status = if let Some(reason) = cancel.reason() {
            extra.insert(
                "cancel_reason".to_string(),
                serde_json::Value::String(reason),
            );
            RunStatus::Error
        } else if error_count > 0 {
            RunStatus::Error
        } else if any_fail {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        };

        let ended_at = chrono::Utc::now();
        let run = RunRecord {
            id: run_id,
            job_id,
            suite_name: suite.name,
            suite_description: suite.description,
            status,
            started_at: started_at.to_rfc3339(),
            ended_at: Some(ended_at.to_rfc3339()),
            duration_ms: Some((ended_at - started_at).num_milliseconds()),
            bytes_processed: ctx.bytes_processed.load(Ordering::Relaxed),
            cache_hit: all_cached,
            validate_first: options.validate_first,
            validate_only: options.validate_only,
            error_count,
            extra,
        };

        tracing::info!(
            run_id,
            status = run.status.as_str(),
            error_count,
            bytes_processed = run.bytes_processed,
            "run finished"
        );

        Ok(RunOutcome { run, results })
    }

    /// Pushes a finalized run and its results to every registered sink.
    /// Failure here never changes the run's own status; the caller decides
    /// whether to retry.
    pub fn export(&self, outcome: &RunOutcome) -> Result<(), ExportError> {
        for exporter in &self.exporters {
            exporter.export_run(&outcome.run)?;
            exporter.export_results(outcome.run.id, &outcome.results)?;
            tracing::debug!(run_id = outcome.run.id, sink = exporter.name(), "run exported");
        }
        Ok(())
    }
}

/// Shared state for one run's worker tasks. Only the cache and the aggregate
/// counters are shared-mutable; both sit behind their own lock or atomic.
struct CheckContext {
    run_id: i64,
    registry: EvaluatorRegistry,
    cache: Arc<dyn ResultCache>,
    source: Arc<dyn DataSource>,
    validate_only: bool,
    check_timeout: std::time::Duration,
    bytes_processed: AtomicU64,
    fatal: Mutex<Option<String>>,
}

impl CheckContext {
    async fn run_check(&self, check: &Check) -> CheckResult {
        let params_json = check.params_json();
        let key = cache_key(&check.name, &params_json, &self.source.fingerprint());

        if self.validate_only {
            match self.cache.get(&key) {
                Ok(Some(mut cached)) => {
                    cached.run_id = self.run_id;
                    cached.served_from_cache = true;
                    return cached;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(check = %check.name, error = %e, "result cache degraded, evaluating fresh");
                }
            }
        }

        let Some(evaluator) = self.registry.get(&check.kind) else {
            // kinds are resolved at start_run; reaching this means the
            // registry changed underneath the run
            return self.error_result(
                check,
                &format!("no evaluator registered for kind '{}'", check.kind),
            );
        };

        let outcome = match timeout(
            self.check_timeout,
            evaluator.evaluate(check, self.source.as_ref()),
        )
        .await
        {
            Ok(Ok(measurement)) => Ok(measurement),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(EvalError::Timeout(self.check_timeout)),
        };

        match outcome {
            Ok(measurement) => {
                self.bytes_processed
                    .fetch_add(measurement.bytes_processed, Ordering::Relaxed);
                let threshold = check.threshold.unwrap_or_default();
                let (status, message) = threshold.judge(&check.name, measurement.value);
                let result = CheckResult {
                    run_id: self.run_id,
                    check_name: check.name.clone(),
                    check_description: check.description.clone(),
                    check_params: params_json,
                    status,
                    severity: check.severity,
                    value: Some(measurement.value),
                    threshold_lower: threshold.lower,
                    threshold_upper: threshold.upper,
                    message,
                    served_from_cache: false,
                };
                if let Err(e) = self.cache.put(&key, &result) {
                    tracing::warn!(check = %check.name, error = %e, "failed to cache result");
                }
                result
            }
            Err(e) => {
                if e.is_fatal() {
                    let mut fatal = self.fatal.lock().unwrap();
                    if fatal.is_none() {
                        *fatal = Some(e.to_string());
                    }
                }
                self.error_result(check, &e.to_string())
            }
        }
    }

    fn error_result(&self, check: &Check, message: &str) -> CheckResult {
        let threshold = check.threshold.unwrap_or_default();
        CheckResult {
            run_id: self.run_id,
            check_name: check.name.clone(),
            check_description: check.description.clone(),
            check_params: check.params_json(),
            status: CheckStatus::Error,
            // an errored check always surfaces at critical severity
            severity: check.severity.max(Severity::Critical),
            value: None,
            threshold_lower: threshold.lower,
            threshold_upper: threshold.upper,
            message: format!("{}: {}", check.name, message),
            served_from_cache: false,
        }
    }

    fn is_fatal(&self) -> bool {
        self.fatal.lock().unwrap().is_some()
    }
}
