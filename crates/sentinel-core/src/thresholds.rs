use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::model::CheckStatus;

/// Numeric bounds for judging a computed value. Both bounds are inclusive;
/// an absent bound leaves that side open. With neither bound present the
/// check is purely observational and always passes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Threshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

impl Threshold {
    /// Single-value limit: lower = upper = value.
    pub fn exact(value: f64) -> Self {
        Self {
            lower: Some(value),
            upper: Some(value),
        }
    }

    pub fn at_least(lower: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    pub fn at_most(upper: f64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    pub fn range(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn validate(&self, check: &str) -> Result<(), ConfigError> {
        if let (Some(lower), Some(upper)) = (self.lower, self.upper) {
            if lower > upper {
                return Err(ConfigError::InvalidThreshold {
                    check: check.to_string(),
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }

    /// Inclusive containment check.
    pub fn is_within(&self, value: f64) -> bool {
        if let Some(lower) = self.lower {
            if value < lower {
                return false;
            }
        }
        if let Some(upper) = self.upper {
            if value > upper {
                return false;
            }
        }
        true
    }

    /// Readable bounds text for result messages.
    pub fn describe(&self) -> String {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) if l == u => format!("threshold = {}", l),
            (lower, upper) => format!(
                "range [{}, {}]",
                lower.map(|v| v.to_string()).unwrap_or_else(|| "-inf".into()),
                upper.map(|v| v.to_string()).unwrap_or_else(|| "+inf".into()),
            ),
        }
    }

    /// Derives a status and a deterministic message for a computed value.
    pub fn judge(&self, check_name: &str, value: f64) -> (CheckStatus, String) {
        if self.is_within(value) {
            (
                CheckStatus::Pass,
                format!("{}: value {} within {}", check_name, value, self.describe()),
            )
        } else {
            (
                CheckStatus::Fail,
                format!("{}: value {} outside {}", check_name, value, self.describe()),
            )
        }
    }
}
