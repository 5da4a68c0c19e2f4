use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::require_str;
use crate::table::{column_bytes, column_values, tabular};

/// Ratio of NULL values to total records in a column (0..=1). An empty
/// column yields 0.
pub struct NullRatioEvaluator;

#[async_trait]
impl Evaluator for NullRatioEvaluator {
    fn kind(&self) -> &'static str {
        "null_ratio"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let values = column_values(table, column)?;

        let ratio = if values.is_empty() {
            0.0
        } else {
            let nulls = values.iter().filter(|v| v.is_null()).count();
            nulls as f64 / values.len() as f64
        };
        Ok(Measurement::new(ratio, column_bytes(values)))
    }
}
