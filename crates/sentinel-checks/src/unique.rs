use std::collections::HashSet;

use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::require_str;
use crate::table::{column_bytes, column_values, tabular};

/// Counts duplicate non-NULL values in a column: total minus distinct.
pub struct UniqueEvaluator;

#[async_trait]
impl Evaluator for UniqueEvaluator {
    fn kind(&self) -> &'static str {
        "unique"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let values = column_values(table, column)?;

        let mut distinct = HashSet::new();
        let mut total = 0usize;
        for v in values.iter().filter(|v| !v.is_null()) {
            total += 1;
            distinct.insert(serde_json::to_string(v).unwrap_or_default());
        }

        let duplicates = total - distinct.len();
        Ok(Measurement::new(duplicates as f64, column_bytes(values)))
    }
}
