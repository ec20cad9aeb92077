//! Conversion errors and their binding error codes
//!
//! Every failure of a conversion call is reported to bindings as a numeric
//! code next to a best-effort result. Inside Rust the same failures are a
//! `UnitsError` that propagates with `?`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Binding error code for a successful call
pub const SUCCESS: i32 = 0;

/// Standard error kinds (machine-readable)
pub mod codes {
    pub const MALFORMED_VALUE: &str = "MALFORMED_VALUE";
    pub const MALFORMED_UNIT: &str = "MALFORMED_UNIT";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const INCOMMENSURABLE: &str = "INCOMMENSURABLE";
    pub const INVALID_HANDLE: &str = "INVALID_HANDLE";
    pub const UNKNOWN_PRESET: &str = "UNKNOWN_PRESET";
}

/// Error type for registry and conversion operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitsError {
    #[error("malformed value: {0}")]
    MalformedValue(String),

    #[error("malformed unit expression: {0}")]
    MalformedUnit(String),

    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("cannot convert {from} to {to}: incommensurable units")]
    Incommensurable { from: String, to: String },

    #[error("invalid unit handle: {0}")]
    InvalidHandle(u32),

    #[error("unknown preset group: {0}")]
    UnknownPreset(String),
}

impl UnitsError {
    /// Numeric code surfaced through bindings.
    ///
    /// All failure classes share one code; callers that need to tell them
    /// apart use `kind()` or match on the variant.
    pub fn code(&self) -> i32 {
        1
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            UnitsError::MalformedValue(_) => codes::MALFORMED_VALUE,
            UnitsError::MalformedUnit(_) => codes::MALFORMED_UNIT,
            UnitsError::UnknownUnit(_) => codes::UNKNOWN_UNIT,
            UnitsError::Incommensurable { .. } => codes::INCOMMENSURABLE,
            UnitsError::InvalidHandle(_) => codes::INVALID_HANDLE,
            UnitsError::UnknownPreset(_) => codes::UNKNOWN_PRESET,
        }
    }

    /// Hint for fixing the call, where one exists
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            UnitsError::MalformedValue(_) => Some("Write the value as a number followed by units, e.g. \"300K\""),
            UnitsError::UnknownUnit(_) => Some("Define the unit or load a preset group first"),
            UnitsError::Incommensurable { .. } => Some("Define a conversion connecting the two units"),
            UnitsError::UnknownPreset(_) => Some("Use list_presets to see the available groups"),
            _ => None,
        }
    }
}

/// Collapse a result into the `(value, code)` shape used by bindings.
///
/// Errors yield the type's default value (empty string, 0.0).
pub fn with_code<T: Default>(result: Result<T, UnitsError>) -> (T, i32) {
    match result {
        Ok(v) => (v, SUCCESS),
        Err(e) => (T::default(), e.code()),
    }
}

/// Structured error for protocol responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Binding error code (never 0)
    pub code: i32,

    /// Machine-readable kind
    pub kind: String,

    /// Human-readable message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorReport {
    pub fn new(code: i32, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl From<&UnitsError> for ErrorReport {
    fn from(err: &UnitsError) -> Self {
        let report = Self::new(err.code(), err.kind(), err.to_string());
        match err.suggestion() {
            Some(s) => report.with_suggestion(s),
            None => report,
        }
    }
}

impl From<UnitsError> for ErrorReport {
    fn from(err: UnitsError) -> Self {
        Self::from(&err)
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}
