use std::collections::HashSet;

use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::require_str;
use crate::table::{column_bytes, column_values, tabular};

/// Counts non-NULL values of `column` with no match in `reference_column`.
/// The in-memory source carries the reference keys as a sibling column;
/// connectors backed by a real database resolve them from the referenced
/// table instead.
pub struct ReferentialIntegrityEvaluator;

#[async_trait]
impl Evaluator for ReferentialIntegrityEvaluator {
    fn kind(&self) -> &'static str {
        "referential_integrity"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let reference_column = require_str(check, "reference_column")?;

        let references = column_values(table, reference_column)?;
        let known: HashSet<String> = references
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| serde_json::to_string(v).unwrap_or_default())
            .collect();

        let values = column_values(table, column)?;
        let orphans = values
            .iter()
            .filter(|v| !v.is_null())
            .filter(|v| {
                let canonical = serde_json::to_string(v).unwrap_or_default();
                !known.contains(&canonical)
            })
            .count();

        Ok(Measurement::new(
            orphans as f64,
            column_bytes(values) + column_bytes(references),
        ))
    }
}
