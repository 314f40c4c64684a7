//! Per-read state: version, error policy, collected diagnostics.

use super::parse_node::ParseNode;
use crate::error::{OpenApiError, OpenApiResult};
use crate::{Diagnostic, OpenApiDiagnostic, OpenApiSpecVersion, Schema};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::trace;

/// A Swagger 2.0 `formData` parameter waiting to become a property of a
/// form request body.
#[derive(Debug, Clone)]
pub(crate) struct FormField {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
}

/// State threaded through every field handler of one read.
///
/// Structural problems go through [`ParsingContext::report`]: in strict
/// mode the first one aborts the read, otherwise they accumulate in the
/// diagnostic returned with the document.
#[derive(Debug)]
pub struct ParsingContext {
    version: OpenApiSpecVersion,
    strict: bool,
    diagnostic: OpenApiDiagnostic,

    /// Swagger 2.0 document-level `consumes`
    pub(crate) global_consumes: Vec<String>,
    /// Swagger 2.0 document-level `produces`
    pub(crate) global_produces: Vec<String>,
    /// Swagger 2.0 top-level parameters declared `in: body`
    pub(crate) body_parameters: HashSet<String>,
    /// Swagger 2.0 top-level parameters declared `in: formData`
    pub(crate) form_parameters: IndexMap<String, FormField>,
}

impl ParsingContext {
    pub fn new(version: OpenApiSpecVersion, strict: bool) -> Self {
        Self {
            version,
            strict,
            diagnostic: OpenApiDiagnostic::new(version),
            global_consumes: Vec::new(),
            global_produces: Vec::new(),
            body_parameters: HashSet::new(),
            form_parameters: IndexMap::new(),
        }
    }

    pub fn version(&self) -> OpenApiSpecVersion {
        self.version
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Report a structural error at `pointer`.
    ///
    /// Strict mode turns it into an [`OpenApiError::Structural`].
    pub fn report(&mut self, pointer: String, message: impl Into<String>) -> OpenApiResult<()> {
        let message = message.into();
        if self.strict {
            return Err(OpenApiError::structural(message, pointer));
        }
        self.diagnostic.push(Diagnostic::error(message, pointer));
        Ok(())
    }

    /// Record a warning; never fatal
    pub fn warn(&mut self, pointer: String, message: impl Into<String>) {
        self.diagnostic.push(Diagnostic::warning(message, pointer));
    }

    /// Report each of `fields` missing from the map `node`
    pub fn require(&mut self, node: &ParseNode<'_>, fields: &[&str], object: &str) -> OpenApiResult<()> {
        for field in fields {
            if node.get(field).is_none() {
                self.report(
                    node.pointer_to(field),
                    format!("The field '{field}' in '{object}' object is REQUIRED."),
                )?;
            }
        }
        Ok(())
    }

    /// Note a field no table recognized
    pub(crate) fn unrecognized(&mut self, node: &ParseNode<'_>, key: &str) {
        trace!("Unrecognized field '{}' at {}", key, node.pointer());
        self.warn(node.pointer(), format!("Unrecognized field '{key}'"));
    }

    pub fn diagnostic(&self) -> &OpenApiDiagnostic {
        &self.diagnostic
    }

    pub fn into_diagnostic(self) -> OpenApiDiagnostic {
        self.diagnostic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_report_accumulates() {
        let mut context = ParsingContext::new(OpenApiSpecVersion::V3_0, false);
        let value = json!({"openapi": "3.0.0"});
        let root = ParseNode::root(&value);

        context.require(&root, &["info", "paths"], "document").unwrap();
        let diagnostic = context.into_diagnostic();
        assert_eq!(diagnostic.errors.len(), 2);
        assert_eq!(diagnostic.errors[0].pointer, "#/info");
        assert_eq!(diagnostic.errors[1].pointer, "#/paths");
    }

    #[test]
    fn test_strict_report_fails_fast() {
        let mut context = ParsingContext::new(OpenApiSpecVersion::V3_0, true);
        let value = json!({});
        let root = ParseNode::root(&value);

        let err = context.require(&root, &["info", "paths"], "document").unwrap_err();
        assert_eq!(err.pointer(), Some("#/info"));
        assert!(context.diagnostic().errors.is_empty());
    }
}
