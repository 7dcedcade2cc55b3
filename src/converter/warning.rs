//! Non-fatal conversion problems.
//!
//! A field that cannot be coerced is replaced by its empty/absent value and a
//! warning is recorded here, so callers can log or reject the result.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    /// Something was skipped on purpose (e.g. a leaf without a request)
    Info,
    /// Data was dropped or replaced because it had an unexpected shape
    Warning,
}

impl std::fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionWarning {
    /// Tree position of the offending node, e.g. "Auth/Login"
    pub path: String,
    /// Field that was coerced, e.g. "url" or "headers"
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.path, self.field, self.message
        )
    }
}

/// Why a single field could not be coerced
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {found}")]
pub struct CoercionError {
    pub expected: &'static str,
    pub found: &'static str,
}

/// Collector threaded through one conversion call
#[derive(Debug, Default)]
pub struct Warnings {
    entries: Vec<ConversionWarning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, path: &str, field: &str, message: impl Into<String>) {
        self.push(path, field, message.into(), WarningSeverity::Info);
    }

    pub fn warn(&mut self, path: &str, field: &str, message: impl Into<String>) {
        self.push(path, field, message.into(), WarningSeverity::Warning);
    }

    /// Unwrap a coercion result, recording a warning and using `fallback` on failure
    pub fn recover<T>(
        &mut self,
        path: &str,
        field: &str,
        result: Result<T, CoercionError>,
        fallback: T,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                self.warn(path, field, format!("{}; field dropped", err));
                fallback
            }
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|w| w.severity == WarningSeverity::Warning)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<ConversionWarning> {
        self.entries
    }

    fn push(&mut self, path: &str, field: &str, message: String, severity: WarningSeverity) {
        tracing::debug!(path, field, %severity, "{}", message);
        self.entries.push(ConversionWarning {
            path: path.to_string(),
            field: field.to_string(),
            message,
            severity,
        });
    }
}
