//! External Documentation Object.

use crate::{Extensions, UnrecognizedFields};
use bon::Builder;
use serde::Serialize;

/// Allows referencing an external resource for extended documentation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct ExternalDocumentation {
    /// A description of the target documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The URL for the target documentation. REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl ExternalDocumentation {
    /// Create a new ExternalDocumentation with required URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_external_docs_serialization() {
        let docs = ExternalDocumentation::new("https://example.com/docs")
            .with_description("More info");
        assert_eq!(
            serde_json::to_value(&docs).unwrap(),
            json!({"description": "More info", "url": "https://example.com/docs"})
        );
    }
}
