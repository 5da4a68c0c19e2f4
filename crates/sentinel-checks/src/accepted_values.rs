use std::collections::HashSet;

use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::{require_array, require_str};
use crate::table::{column_bytes, column_values, tabular};

/// Counts non-NULL values outside an allowed set (`values` parameter).
pub struct AcceptedValuesEvaluator;

#[async_trait]
impl Evaluator for AcceptedValuesEvaluator {
    fn kind(&self) -> &'static str {
        "accepted_values"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let accepted = require_array(check, "values")?;

        let allowed: HashSet<String> = accepted
            .iter()
            .map(|v| serde_json::to_string(v).unwrap_or_default())
            .collect();

        let values = column_values(table, column)?;
        let violations = values
            .iter()
            .filter(|v| !v.is_null())
            .filter(|v| {
                let canonical = serde_json::to_string(v).unwrap_or_default();
                !allowed.contains(&canonical)
            })
            .count();

        Ok(Measurement::new(violations as f64, column_bytes(values)))
    }
}
