use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ExportError;
use crate::model::{CheckResult, RunRecord};

pub mod json;
pub mod schema;
pub mod sqlite;

/// Sink for finalized runs and their results. Both operations must be
/// idempotent: re-exporting the same run by primary key never duplicates
/// rows (upsert-by-id or insert-ignore).
pub trait Exporter: Send + Sync {
    fn name(&self) -> &'static str;

    fn export_run(&self, run: &RunRecord) -> Result<(), ExportError>;

    fn export_results(&self, run_id: i64, results: &[CheckResult]) -> Result<(), ExportError>;
}

/// Maps sink names to implementations, resolved when a caller wires a run's
/// destination.
#[derive(Clone, Default)]
pub struct ExporterRegistry {
    by_name: HashMap<String, Arc<dyn Exporter>>,
}

impl ExporterRegistry {
    pub fn new(exporters: Vec<Arc<dyn Exporter>>) -> Self {
        let mut registry = Self::default();
        for exporter in exporters {
            registry.register(exporter);
        }
        registry
    }

    pub fn register(&mut self, exporter: Arc<dyn Exporter>) {
        self.by_name.insert(exporter.name().to_string(), exporter);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Exporter>, ExportError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ExportError::Sink {
                name: name.to_string(),
                reason: "no exporter registered under this name".to_string(),
            })
    }
}
