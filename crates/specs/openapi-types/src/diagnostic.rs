//! Non-fatal findings produced while reading or validating a document.

use crate::OpenApiSpecVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Error,
    Warning,
}

/// A structured finding: what is wrong and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub kind: DiagnosticKind,

    /// Name of the validation rule that produced this finding, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// Human-readable message
    pub message: String,

    /// JSON pointer to the offending node, e.g. `#/info/license/name`
    pub pointer: String,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(message: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            rule: None,
            message: message.into(),
            pointer: pointer.into(),
        }
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            rule: None,
            message: message.into(),
            pointer: pointer.into(),
        }
    }

    /// Attach the producing rule name
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule {
            Some(rule) => write!(f, "[{}] {} ({})", rule, self.message, self.pointer),
            None => write!(f, "{} ({})", self.message, self.pointer),
        }
    }
}

/// Everything the reader noticed about a document that did not stop it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpenApiDiagnostic {
    /// Version the document was read as
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<OpenApiSpecVersion>,

    /// Structural errors collected in lenient mode
    pub errors: Vec<Diagnostic>,

    /// Unrecognized fields and other oddities
    pub warnings: Vec<Diagnostic>,
}

impl OpenApiDiagnostic {
    pub fn new(spec_version: OpenApiSpecVersion) -> Self {
        Self {
            spec_version: Some(spec_version),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a diagnostic in the bucket matching its kind
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::Error => self.errors.push(diagnostic),
            DiagnosticKind::Warning => self.warnings.push(diagnostic),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::error("boom", "#/info").with_rule("InfoRequiredFields");
        assert_eq!(diagnostic.to_string(), "[InfoRequiredFields] boom (#/info)");

        let diagnostic = Diagnostic::warning("odd", "#/paths");
        assert_eq!(diagnostic.to_string(), "odd (#/paths)");
        assert!(!diagnostic.is_error());
    }

    #[test]
    fn test_diagnostic_push_routes_by_kind() {
        let mut report = OpenApiDiagnostic::new(OpenApiSpecVersion::V3_0);
        report.push(Diagnostic::error("e", "#/"));
        report.push(Diagnostic::warning("w", "#/"));
        report.push(Diagnostic::warning("w2", "#/"));

        assert!(report.has_errors());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 2);
    }
}
