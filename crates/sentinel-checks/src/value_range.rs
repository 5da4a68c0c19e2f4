use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::{optional_f64, require_str};
use crate::table::{column_bytes, column_values, tabular};

/// Counts values outside an inclusive [min, max] window. NULLs are skipped;
/// non-numeric values count as violations. At least one of `min`/`max` must
/// be given.
pub struct ValueRangeEvaluator;

#[async_trait]
impl Evaluator for ValueRangeEvaluator {
    fn kind(&self) -> &'static str {
        "value_range"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let min = optional_f64(check, "min")?;
        let max = optional_f64(check, "max")?;
        if min.is_none() && max.is_none() {
            return Err(EvalError::InvalidParams(format!(
                "check '{}': at least one of 'min'/'max' is required",
                check.name
            )));
        }

        let values = column_values(table, column)?;
        let violations = values
            .iter()
            .filter(|v| !v.is_null())
            .filter(|v| match v.as_f64() {
                Some(n) => min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m),
                None => true,
            })
            .count();

        Ok(Measurement::new(violations as f64, column_bytes(values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_fixture;
    use crate::table::MemoryTable;
    use serde_json::json;

    #[tokio::test]
    async fn counts_out_of_range_values() {
        let table = MemoryTable::new("t").with_column(
            "revenue",
            vec![json!(10), json!(-5), json!(null), json!(250), json!("n/a")],
        );
        let check = check_fixture(
            "revenue_range",
            "value_range",
            json!({ "column": "revenue", "min": 0, "max": 100 }),
        );
        let m = ValueRangeEvaluator.evaluate(&check, &table).await.unwrap();
        // -5 below min, 250 above max, "n/a" non-numeric
        assert_eq!(m.value, 3.0);
    }

    #[tokio::test]
    async fn single_sided_bounds_work() {
        let table =
            MemoryTable::new("t").with_column("age", vec![json!(-1), json!(0), json!(42)]);
        let check = check_fixture(
            "non_negative",
            "value_range",
            json!({ "column": "age", "min": 0 }),
        );
        let m = ValueRangeEvaluator.evaluate(&check, &table).await.unwrap();
        assert_eq!(m.value, 1.0);
    }

    #[tokio::test]
    async fn requires_at_least_one_bound() {
        let table = MemoryTable::new("t").with_column("age", vec![json!(1)]);
        let check = check_fixture("bad", "value_range", json!({ "column": "age" }));
        let err = ValueRangeEvaluator
            .evaluate(&check, &table)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidParams(_)));
    }
}
