use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::require_str;
use crate::table::{column_bytes, column_values, tabular};

/// Counts NULL values in a column. The value is the number of violations.
pub struct NotNullEvaluator;

#[async_trait]
impl Evaluator for NotNullEvaluator {
    fn kind(&self) -> &'static str {
        "not_null"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let values = column_values(table, column)?;

        let nulls = values.iter().filter(|v| v.is_null()).count();
        Ok(Measurement::new(nulls as f64, column_bytes(values)))
    }
}
