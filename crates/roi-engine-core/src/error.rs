use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level failure of a calculation request.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

/// Machine-readable kind of a single field violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    Required,
    OutOfRange,
    UnknownId,
    Unsupported,
    TooShort,
    TooLong,
    InvalidCharacters,
}

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: ViolationCode,
    pub message: String,
}

/// Every constraint a request failed. Never constructed empty.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("request failed validation ({} violation(s)): {}", .violations.len(), summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Whether a violation was recorded against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates violations so the resolver reports all of them at once.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn push(&mut self, field: &str, code: ViolationCode, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.to_string(),
            code,
            message: message.into(),
        });
    }

    pub(crate) fn into_result(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

/// Numerical failure downstream of validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("Convergence failure: {function} did not converge after {iterations} iterations (residual: {residual})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        residual: f64,
    },
    #[error("{function} is undefined: cash flows never change sign")]
    NoSignChange { function: String },
    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },
    #[error("Non-finite value produced for {field}")]
    NonFinite { field: String },
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("No exchange rate for {currency}")]
    MissingRate { currency: String },
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CalculationError {
    fn from(e: serde_json::Error) -> Self {
        CalculationError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_field() {
        let mut v = Violations::default();
        v.push("investment", ViolationCode::OutOfRange, "below minimum");
        v.push("timeline_months", ViolationCode::OutOfRange, "above maximum");
        let err = v.into_result().unwrap_err();
        assert_eq!(err.violations.len(), 2);
        assert!(err.has_field("timeline_months"));
        let msg = err.to_string();
        assert!(msg.contains("2 violation(s)"));
        assert!(msg.contains("investment: below minimum"));
    }

    #[test]
    fn test_empty_violations_pass() {
        assert!(Violations::default().into_result().is_ok());
    }
}
