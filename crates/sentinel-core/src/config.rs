use std::collections::HashSet;
use std::path::Path;

use crate::errors::ConfigError;
use crate::model::Suite;

/// Loads a suite definition from a YAML file.
pub fn load_suite(path: &Path) -> Result<Suite, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Parse(format!("failed to read suite {}: {}", path.display(), e))
    })?;
    suite_from_yaml(&raw)
}

pub fn suite_from_yaml(raw: &str) -> Result<Suite, ConfigError> {
    let suite: Suite = serde_yaml::from_str(raw)
        .map_err(|e| ConfigError::Parse(format!("failed to parse YAML: {}", e)))?;
    validate_suite(&suite)?;
    Ok(suite)
}

/// Structural validation applied both at load time and at `start_run`:
/// non-empty suite, unique check names, well-formed thresholds.
pub fn validate_suite(suite: &Suite) -> Result<(), ConfigError> {
    if suite.checks.is_empty() {
        return Err(ConfigError::EmptySuite(suite.name.clone()));
    }

    let mut seen = HashSet::new();
    for check in &suite.checks {
        if !seen.insert(check.name.as_str()) {
            return Err(ConfigError::DuplicateCheck {
                suite: suite.name.clone(),
                check: check.name.clone(),
            });
        }
        if let Some(threshold) = &check.threshold {
            threshold.validate(&check.name)?;
        }
    }
    Ok(())
}
