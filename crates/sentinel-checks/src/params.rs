use sentinel_core::errors::EvalError;
use sentinel_core::model::Check;
use serde_json::Value;

pub(crate) fn require_str<'a>(check: &'a Check, name: &str) -> Result<&'a str, EvalError> {
    match check.param(name) {
        Some(v) => v.as_str().ok_or_else(|| {
            EvalError::InvalidParams(format!(
                "check '{}': parameter '{}' must be a string",
                check.name, name
            ))
        }),
        None => Err(missing(check, name)),
    }
}

pub(crate) fn optional_str<'a>(check: &'a Check, name: &str) -> Result<Option<&'a str>, EvalError> {
    match check.param(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| {
            EvalError::InvalidParams(format!(
                "check '{}': parameter '{}' must be a string",
                check.name, name
            ))
        }),
    }
}

pub(crate) fn optional_f64(check: &Check, name: &str) -> Result<Option<f64>, EvalError> {
    match check.param(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| {
            EvalError::InvalidParams(format!(
                "check '{}': parameter '{}' must be a number",
                check.name, name
            ))
        }),
    }
}

pub(crate) fn require_array<'a>(check: &'a Check, name: &str) -> Result<&'a [Value], EvalError> {
    match check.param(name) {
        Some(v) => v.as_array().map(|a| a.as_slice()).ok_or_else(|| {
            EvalError::InvalidParams(format!(
                "check '{}': parameter '{}' must be an array",
                check.name, name
            ))
        }),
        None => Err(missing(check, name)),
    }
}

fn missing(check: &Check, name: &str) -> EvalError {
    EvalError::InvalidParams(format!(
        "check '{}' missing required parameter '{}'",
        check.name, name
    ))
}
