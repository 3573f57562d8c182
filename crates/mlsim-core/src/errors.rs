//! Structured error types shared across mlsim crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`MlsimError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, sizes, offending values).
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

/// Canonical error type for the simulation and analysis pipeline.
///
/// Each variant names the pipeline stage that raised it; the payload carries
/// the stable code that tests and callers match on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum MlsimError {
    /// Invalid simulation parameters or malformed observation tables.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Model configuration or sampling failures.
    #[error("fit error: {0}")]
    Fit(ErrorInfo),
    /// Fit cache artefacts that are unreadable, corrupt or incompatible.
    #[error("cache error: {0}")]
    Cache(ErrorInfo),
    /// Posterior reshaping and pairing precondition violations.
    #[error("reshape error: {0}")]
    Reshape(ErrorInfo),
    /// Interval computations on empty or degenerate samples.
    #[error("interval error: {0}")]
    Interval(ErrorInfo),
    /// Chart rendering and figure output errors.
    #[error("plot error: {0}")]
    Plot(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
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

impl MlsimError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            MlsimError::Data(info)
            | MlsimError::Fit(info)
            | MlsimError::Cache(info)
            | MlsimError::Reshape(info)
            | MlsimError::Interval(info)
            | MlsimError::Plot(info)
            | MlsimError::Serde(info) => info,
        }
    }

    /// Shorthand for the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
