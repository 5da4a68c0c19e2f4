use std::collections::HashSet;

use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::require_str;
use crate::table::{column_bytes, column_values, tabular};

/// Counts extra distinct non-NULL values beyond the first. A constant
/// column yields 0; an empty or all-NULL column yields -1.
pub struct ConstantColumnEvaluator;

#[async_trait]
impl Evaluator for ConstantColumnEvaluator {
    fn kind(&self) -> &'static str {
        "constant_column"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let values = column_values(table, column)?;

        let distinct: HashSet<String> = values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| serde_json::to_string(v).unwrap_or_default())
            .collect();

        Ok(Measurement::new(
            distinct.len() as f64 - 1.0,
            column_bytes(values),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_fixture;
    use crate::table::MemoryTable;
    use serde_json::json;

    #[tokio::test]
    async fn constant_column_yields_zero() {
        let table = MemoryTable::new("t").with_column(
            "currency",
            vec![json!("EUR"), json!("EUR"), json!(null), json!("EUR")],
        );
        let check = check_fixture(
            "single_currency",
            "constant_column",
            json!({ "column": "currency" }),
        );
        let m = ConstantColumnEvaluator
            .evaluate(&check, &table)
            .await
            .unwrap();
        assert_eq!(m.value, 0.0);
    }

    #[tokio::test]
    async fn extra_values_are_counted() {
        let table = MemoryTable::new("t").with_column(
            "currency",
            vec![json!("EUR"), json!("USD"), json!("GBP")],
        );
        let check = check_fixture(
            "single_currency",
            "constant_column",
            json!({ "column": "currency" }),
        );
        let m = ConstantColumnEvaluator
            .evaluate(&check, &table)
            .await
            .unwrap();
        assert_eq!(m.value, 2.0);
    }

    #[tokio::test]
    async fn all_null_column_yields_minus_one() {
        let table = MemoryTable::new("t").with_column("currency", vec![json!(null)]);
        let check = check_fixture(
            "single_currency",
            "constant_column",
            json!({ "column": "currency" }),
        );
        let m = ConstantColumnEvaluator
            .evaluate(&check, &table)
            .await
            .unwrap();
        assert_eq!(m.value, -1.0);
    }
}
