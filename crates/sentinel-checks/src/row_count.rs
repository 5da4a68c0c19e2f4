use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::table::tabular;

/// Measures the total number of rows in the source.
pub struct RowCountEvaluator;

#[async_trait]
impl Evaluator for RowCountEvaluator {
    fn kind(&self) -> &'static str {
        "row_count"
    }

    async fn evaluate(
        &self,
        _check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        Ok(Measurement::new(
            table.row_count() as f64,
            table.total_bytes(),
        ))
    }
}
