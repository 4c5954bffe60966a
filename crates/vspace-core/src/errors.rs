//! Structured error types shared across the version-space sampling crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`VsError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (dimensions, bounds, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the sampling engine.
///
/// None of these are retried internally; they propagate to the active-learning
/// loop, which decides whether to abort the current labeling iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum VsError {
    /// Non-positive sample counts, chain lengths or iteration caps, and
    /// operations a body does not support.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// No strict interior point exists for the current constraints.
    #[error("infeasible region: {0}")]
    InfeasibleRegion(ErrorInfo),
    /// A geodesic misses the body, touches it at a single point, or is unbounded.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(ErrorInfo),
    /// Ellipsoid cut requested with a hyperplane on the wrong side.
    #[error("invalid cut: {0}")]
    InvalidCut(ErrorInfo),
    /// Vector or matrix lengths do not agree.
    #[error("dimension error: {0}")]
    Dimension(ErrorInfo),
    /// Linear program solver failure other than infeasibility.
    #[error("solver error: {0}")]
    Solver(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl VsError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            VsError::Configuration(info)
            | VsError::InfeasibleRegion(info)
            | VsError::DegenerateGeometry(info)
            | VsError::InvalidCut(info)
            | VsError::Dimension(info)
            | VsError::Solver(info) => info,
        }
    }

    /// Shorthand for a [`VsError::Configuration`] error.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        VsError::Configuration(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`VsError::DegenerateGeometry`] error.
    pub fn degenerate(code: &str, message: impl Into<String>) -> Self {
        VsError::DegenerateGeometry(ErrorInfo::new(code, message))
    }

    /// Builds a [`VsError::Dimension`] error describing a length mismatch.
    pub fn dimension_mismatch(expected: usize, found: usize) -> Self {
        VsError::Dimension(
            ErrorInfo::new("dimension-mismatch", "vector dimension does not match")
                .with_context("expected", expected)
                .with_context("found", found),
        )
    }
}

/// Fails with a configuration error unless `value` is strictly positive.
pub fn ensure_positive(name: &str, value: usize) -> Result<(), VsError> {
    if value == 0 {
        return Err(VsError::Configuration(
            ErrorInfo::new("non-positive-parameter", format!("{name} must be positive"))
                .with_context("parameter", name)
                .with_context("value", value),
        ));
    }
    Ok(())
}

/// Fails with a dimension error unless both lengths agree.
pub fn ensure_dim(expected: usize, found: usize) -> Result<(), VsError> {
    if expected != found {
        return Err(VsError::dimension_mismatch(expected, found));
    }
    Ok(())
}
