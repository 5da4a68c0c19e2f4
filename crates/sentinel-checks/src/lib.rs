use std::sync::Arc;

use sentinel_core::evaluator::Evaluator;

mod accepted_values;
mod constant_column;
mod duplicate_rows;
mod freshness;
mod negative_values;
mod not_null;
mod null_ratio;
mod params;
mod referential_integrity;
mod regex_match;
mod row_count;
pub mod table;
mod unique;
mod value_range;

pub use table::MemoryTable;

/// The builtin check evaluators, ready to register against a runner.
pub fn default_evaluators() -> Vec<Arc<dyn Evaluator>> {
    vec![
        Arc::new(row_count::RowCountEvaluator),
        Arc::new(not_null::NotNullEvaluator),
        Arc::new(null_ratio::NullRatioEvaluator),
        Arc::new(value_range::ValueRangeEvaluator),
        Arc::new(unique::UniqueEvaluator),
        Arc::new(accepted_values::AcceptedValuesEvaluator),
        Arc::new(regex_match::RegexMatchEvaluator),
        Arc::new(freshness::FreshnessEvaluator),
        Arc::new(duplicate_rows::DuplicateRowsEvaluator),
        Arc::new(constant_column::ConstantColumnEvaluator),
        Arc::new(referential_integrity::ReferentialIntegrityEvaluator),
        Arc::new(negative_values::NegativeValuesEvaluator),
    ]
}

#[cfg(test)]
pub(crate) fn check_fixture(
    name: &str,
    kind: &str,
    params: serde_json::Value,
) -> sentinel_core::model::Check {
    let params = match params {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        _ => Default::default(),
    };
    sentinel_core::model::Check {
        name: name.to_string(),
        description: None,
        kind: kind.to_string(),
        params,
        severity: Default::default(),
        threshold: None,
    }
}
