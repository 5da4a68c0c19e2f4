use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::{optional_str, require_str};
use crate::table::{column_bytes, column_values, tabular};

/// Seconds elapsed since the most recent RFC3339 timestamp in a column.
/// The optional `as_of` parameter pins the reference clock, which keeps
/// threshold comparisons reproducible.
pub struct FreshnessEvaluator;

#[async_trait]
impl Evaluator for FreshnessEvaluator {
    fn kind(&self) -> &'static str {
        "freshness"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let as_of = match optional_str(check, "as_of")? {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map_err(|e| {
                    EvalError::InvalidParams(format!(
                        "check '{}': invalid 'as_of' timestamp '{}': {}",
                        check.name, raw, e
                    ))
                })?
                .with_timezone(&Utc),
            None => Utc::now(),
        };

        let values = column_values(table, column)?;
        let latest = values
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .max()
            .ok_or_else(|| {
                EvalError::InvalidParams(format!(
                    "check '{}': column '{}' has no parseable timestamps",
                    check.name, column
                ))
            })?;

        let age_seconds = (as_of - latest).num_seconds() as f64;
        Ok(Measurement::new(age_seconds, column_bytes(values)))
    }
}
