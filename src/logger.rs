//! Diagnostics collector.
//!
//! Processing never throws: every problem is recorded here, in one of three
//! independent buckets, and mirrored to `tracing`.

use std::fmt;

use serde::Serialize;

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Processing stopped; the resulting manifest is empty.
    Fatal,
    /// Data was the wrong shape and has been removed.
    ValidationError,
    /// Data is suspicious or a recommended item is missing; nothing removed.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => f.write_str("fatal error"),
            Severity::ValidationError => f.write_str("validation error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A single diagnostic, optionally carrying the offending payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Some(payload) => write!(f, "{} ({})", self.message, payload),
            None => f.write_str(&self.message),
        }
    }
}

/// Accumulates fatal errors, validation errors and warnings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Logger {
    pub fatal_errors: Vec<Diagnostic>,
    pub validation_errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fatal error.
    pub fn fatal(&mut self, message: impl Into<String>, payload: Option<serde_json::Value>) {
        let diagnostic = Diagnostic {
            message: message.into(),
            payload,
        };
        tracing::error!(payload = ?diagnostic.payload, "{}", diagnostic.message);
        self.fatal_errors.push(diagnostic);
    }

    /// Record a validation error: the offending data has been removed.
    pub fn validation_error(
        &mut self,
        message: impl Into<String>,
        payload: Option<serde_json::Value>,
    ) {
        let diagnostic = Diagnostic {
            message: message.into(),
            payload,
        };
        tracing::warn!(payload = ?diagnostic.payload, "{}", diagnostic.message);
        self.validation_errors.push(diagnostic);
    }

    /// Record a warning: data is kept.
    pub fn warning(&mut self, message: impl Into<String>, payload: Option<serde_json::Value>) {
        let diagnostic = Diagnostic {
            message: message.into(),
            payload,
        };
        tracing::info!(payload = ?diagnostic.payload, "{}", diagnostic.message);
        self.warnings.push(diagnostic);
    }

    pub fn has_fatal(&self) -> bool {
        !self.fatal_errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fatal_errors.is_empty() && self.validation_errors.is_empty() && self.warnings.is_empty()
    }

    /// Total number of diagnostics in all buckets.
    pub fn len(&self) -> usize {
        self.fatal_errors.len() + self.validation_errors.len() + self.warnings.len()
    }

    /// Iterate over every diagnostic, most severe bucket first.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, &Diagnostic)> {
        self.fatal_errors
            .iter()
            .map(|d| (Severity::Fatal, d))
            .chain(self.validation_errors.iter().map(|d| (Severity::ValidationError, d)))
            .chain(self.warnings.iter().map(|d| (Severity::Warning, d)))
    }
}

impl fmt::Display for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (severity, diagnostic) in self.iter() {
            writeln!(f, "{severity}: {diagnostic}")?;
        }
        Ok(())
    }
}
