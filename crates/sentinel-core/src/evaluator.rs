use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{ConfigError, EvalError};
use crate::model::{Check, Suite};
use crate::source::DataSource;

/// Scalar produced by one evaluator invocation, plus the work it cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub bytes_processed: u64,
}

impl Measurement {
    pub fn new(value: f64, bytes_processed: u64) -> Self {
        Self {
            value,
            bytes_processed,
        }
    }
}

/// Measurement logic for one check kind. Pure with respect to the engine:
/// implementations must not mutate suite or check definitions.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Kind string checks declare to bind to this evaluator.
    fn kind(&self) -> &'static str;

    async fn evaluate(
        &self,
        check: &Check,
        source: &dyn DataSource,
    ) -> Result<Measurement, EvalError>;
}

/// Maps declared check kinds to evaluator implementations, resolved at
/// suite-load time.
#[derive(Clone, Default)]
pub struct EvaluatorRegistry {
    by_kind: HashMap<String, Arc<dyn Evaluator>>,
}

impl EvaluatorRegistry {
    pub fn new(evaluators: Vec<Arc<dyn Evaluator>>) -> Self {
        let mut registry = Self::default();
        for evaluator in evaluators {
            registry.register(evaluator);
        }
        registry
    }

    pub fn register(&mut self, evaluator: Arc<dyn Evaluator>) {
        self.by_kind.insert(evaluator.kind().to_string(), evaluator);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Evaluator>> {
        self.by_kind.get(kind).cloned()
    }

    /// Fails fast when a suite declares a kind nothing is registered for.
    pub fn resolve(&self, suite: &Suite) -> Result<(), ConfigError> {
        for check in &suite.checks {
            if !self.by_kind.contains_key(&check.kind) {
                return Err(ConfigError::UnknownCheckKind {
                    check: check.name.clone(),
                    kind: check.kind.clone(),
                });
            }
        }
        Ok(())
    }
}
