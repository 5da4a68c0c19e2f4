use std::any::Any;
use std::collections::BTreeMap;

use sentinel_core::errors::EvalError;
use sentinel_core::fingerprint::sha256_hex;
use sentinel_core::source::DataSource;
use serde_json::Value;

/// In-memory tabular data source: named columns of nullable JSON scalars.
/// Backs the builtin evaluators and doubles as the test source; production
/// deployments plug real connectors in behind the same `DataSource` trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    name: String,
    columns: BTreeMap<String, Vec<Value>>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.columns.values().map(|v| v.len()).max().unwrap_or(0)
    }

    pub fn total_bytes(&self) -> u64 {
        self.columns.values().map(|v| column_bytes(v)).sum()
    }
}

impl DataSource for MemoryTable {
    /// Content-derived identity: any change to the table name or data yields
    /// a new fingerprint and therefore a cache miss.
    fn fingerprint(&self) -> String {
        let payload = serde_json::to_string(&self.columns).unwrap_or_default();
        sha256_hex(&format!("{}\n{}", self.name, payload))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn column_bytes(values: &[Value]) -> u64 {
    values
        .iter()
        .map(|v| serde_json::to_string(v).map(|s| s.len() as u64).unwrap_or(0))
        .sum()
}

pub(crate) fn tabular(source: &dyn DataSource) -> Result<&MemoryTable, EvalError> {
    source
        .as_any()
        .downcast_ref::<MemoryTable>()
        .ok_or_else(|| {
            EvalError::InvalidParams("check requires an in-memory tabular data source".into())
        })
}

pub(crate) fn column_values<'a>(
    table: &'a MemoryTable,
    column: &str,
) -> Result<&'a [Value], EvalError> {
    table.column(column).ok_or_else(|| {
        EvalError::InvalidParams(format!(
            "column '{}' not found in source '{}'",
            column,
            table.name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MemoryTable {
        MemoryTable::new("orders")
            .with_column("id", vec![json!(1), json!(2), json!(3)])
            .with_column("status", vec![json!("new"), json!(null), json!("done")])
    }

    #[test]
    fn fingerprint_is_stable_for_identical_content() {
        assert_eq!(sample().fingerprint(), sample().fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let base = sample().fingerprint();
        let renamed = MemoryTable::new("orders_v2")
            .with_column("id", vec![json!(1), json!(2), json!(3)])
            .with_column("status", vec![json!("new"), json!(null), json!("done")]);
        assert_ne!(base, renamed.fingerprint());

        let mutated = sample().with_column("id", vec![json!(1), json!(2), json!(99)]);
        assert_ne!(base, mutated.fingerprint());
    }

    #[test]
    fn row_count_uses_longest_column() {
        assert_eq!(sample().row_count(), 3);
        assert_eq!(MemoryTable::new("empty").row_count(), 0);
    }
}
