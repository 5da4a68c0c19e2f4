use async_trait::async_trait;
use regex::Regex;
use sentinel_core::errors::EvalError;
use sentinel_core::evaluator::{Evaluator, Measurement};
use sentinel_core::model::Check;
use sentinel_core::source::DataSource;

use crate::params::require_str;
use crate::table::{column_bytes, column_values, tabular};

/// Counts non-NULL values that do not match `pattern`. Non-string values
/// count as violations.
pub struct RegexMatchEvaluator;

#[async_trait]
impl Evaluator for RegexMatchEvaluator {
    fn kind(&self) -> &'static str {
        "regex_match"
    }

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError> {
        let table = tabular(source)?;
        let column = require_str(check, "column")?;
        let pattern = require_str(check, "pattern")?;

        let re = Regex::new(pattern).map_err(|e| {
            EvalError::InvalidParams(format!(
                "check '{}': invalid regex pattern '{}': {}",
                check.name, pattern, e
            ))
        })?;

        let values = column_values(table, column)?;
        let violations = values
            .iter()
            .filter(|v| !v.is_null())
            .filter(|v| match v.as_str() {
                Some(s) => !re.is_match(s),
                None => true,
            })
            .count();

        Ok(Measurement::new(violations as f64, column_bytes(values)))
    }
}
