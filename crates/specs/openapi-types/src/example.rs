//! Example Object.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{Extensions, UnrecognizedFields};
use bon::Builder;
use serde::Serialize;
use serde_json::Value;

/// An example inline, or a reference to one
pub type ExampleOrReference = ReferenceHolder<Example>;

/// An example of a value, embedded or external.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Example {
    /// Short description for the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Long description for the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Embedded literal example.
    /// The value field and externalValue field are mutually exclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// A URL that points to the literal example.
    #[serde(rename = "externalValue", skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Example {
    /// Create a new Example with embedded value
    pub fn with_value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Create a new Example with external value URL
    pub fn with_external_value(external_value: impl Into<String>) -> Self {
        Self {
            external_value: Some(external_value.into()),
            ..Self::default()
        }
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

referenceable_component!(Example, |target, reference| {
    if let Some(summary) = &reference.summary {
        target.summary = Some(summary.clone());
    }
    if let Some(description) = &reference.description {
        target.description = Some(description.clone());
    }
});

impl ReferenceHolder<Example> {
    pub fn summary(&self) -> Option<String> {
        self.forward_summary(|e| e.summary.clone())
    }

    pub fn description(&self) -> Option<String> {
        self.forward_description(|e| e.description.clone())
    }

    pub fn value(&self) -> Option<Value> {
        self.with_target(|e| e.value.clone()).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_example_creation() {
        let example = Example::with_value(json!({"id": 1})).with_summary("A pet");
        assert_eq!(
            serde_json::to_value(&example).unwrap(),
            json!({"summary": "A pet", "value": {"id": 1}})
        );
    }

    #[test]
    fn test_inline_copy_with_overrides_is_a_plain_clone() {
        let holder = ExampleOrReference::inline(Example::with_value(7));
        let copy = holder
            .copy_reference_as_target_element_with_overrides()
            .unwrap();
        assert_eq!(copy.value, Some(json!(7)));
    }
}
