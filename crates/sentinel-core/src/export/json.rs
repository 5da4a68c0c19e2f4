use std::path::PathBuf;

use crate::errors::ExportError;
use crate::export::Exporter;
use crate::model::{CheckResult, RunRecord};

/// File sink writing one JSON document per run. Re-exporting overwrites the
/// same files, so the sink stays idempotent by construction.
pub struct JsonExporter {
    dir: PathBuf,
}

impl JsonExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn run_path(&self, run_id: i64) -> PathBuf {
        self.dir.join(format!("run-{}.json", run_id))
    }

    fn results_path(&self, run_id: i64) -> PathBuf {
        self.dir.join(format!("run-{}-results.json", run_id))
    }
}

impl Exporter for JsonExporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn export_run(&self, run: &RunRecord) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_string_pretty(run)?;
        std::fs::write(self.run_path(run.id), payload)?;
        Ok(())
    }

    fn export_results(&self, run_id: i64, results: &[CheckResult]) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_string_pretty(results)?;
        std::fs::write(self.results_path(run_id), payload)?;
        Ok(())
    }
}
