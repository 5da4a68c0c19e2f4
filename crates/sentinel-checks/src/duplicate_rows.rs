use std::collections::HashSet;

use async_trait::async_trait;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;
use serde_json::Value;

use crate::params::require_array;
use crate::table::{column_bytes, column_values, tabular};

/// Counts duplicate rows over a set of key columns (`columns` parameter):
/// total rows minus distinct key combinations. A row shorter than the table
/// contributes NULL for the missing cells.
pub struct DuplicateRowsEvaluator;

#[async_trait]
impl Evaluator for DuplicateRowsEvaluator {
    fn kind(&self) -> &'static str {
        "duplicate_rows"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let names: Vec<&str> = require_array(check, "columns")?
            .iter()
            .map(|v| {
                v.as_str().ok_or_else(|| {
                    EvalError::InvalidParams(format!(
                        "check '{}': 'columns' entries must be strings",
                        check.name
                    ))
                })
            })
            .collect::<Result<_, _>>()?;
        if names.is_empty() {
            return Err(EvalError::InvalidParams(format!(
                "check '{}': 'columns' must name at least one column",
                check.name
            )));
        }

        let columns: Vec<&[Value]> = names
            .iter()
            .map(|name| column_values(table, name))
            .collect::<Result<_, _>>()?;

        let rows = table.row_count();
        let mut distinct = HashSet::new();
        for i in 0..rows {
            let key: Vec<String> = columns
                .iter()
                .map(|col| match col.get(i) {
                    Some(v) => serde_json::to_string(v).unwrap_or_default(),
                    None => "null".to_string(),
                })
                .collect();
            distinct.insert(key);
        }

        let duplicates = rows - distinct.len();
        let bytes = columns.iter().map(|col| column_bytes(col)).sum();
        Ok(Measurement::new(duplicates as f64, bytes))
    }
}
