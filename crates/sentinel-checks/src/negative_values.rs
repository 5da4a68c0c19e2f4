use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::require_str;
use crate::table::{column_bytes, column_values, tabular};

/// Counts values below zero in a numeric column. NULLs and non-numeric
/// values are skipped.
pub struct NegativeValuesEvaluator;

#[async_trait]
impl Evaluator for NegativeValuesEvaluator {
    fn kind(&self) -> &'static str {
        "negative_values"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let values = column_values(table, column)?;

        let violations = values
            .iter()
            .filter_map(|v| v.as_f64())
            .filter(|n| *n < 0.0)
            .count();

        Ok(Measurement::new(violations as f64, column_bytes(values)))
    }
}
