//! Link Object.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{Extensions, RuntimeExpressionAnyWrapper, Server, UnrecognizedFields};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;

/// A link inline, or a reference to one
pub type LinkOrReference = ReferenceHolder<Link>;

/// The Link object represents a possible design-time link for a response.
///
/// The presence of a link does not guarantee the caller's ability to
/// successfully invoke it, rather it provides a known relationship and
/// traversal mechanism between responses and other operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Link {
    /// A relative or absolute URI reference to an operation.
    /// Mutually exclusive with `operation_id`.
    #[serde(rename = "operationRef", skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,

    /// The name of an existing, resolvable operation.
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    /// Parameters to pass to the linked operation: constants or runtime
    /// expressions.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub parameters: IndexMap<String, RuntimeExpressionAnyWrapper>,

    /// A literal value or runtime expression to use as the request body.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RuntimeExpressionAnyWrapper>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A server object to be used by the target operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

referenceable_component!(Link, |target, reference| {
    if let Some(description) = &reference.description {
        target.description = Some(description.clone());
    }
});

impl ReferenceHolder<Link> {
    pub fn description(&self) -> Option<String> {
        self.forward_description(|l| l.description.clone())
    }

    pub fn operation_id(&self) -> Option<String> {
        self.with_target(|l| l.operation_id.clone()).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuntimeExpression;
    use serde_json::json;

    #[test]
    fn test_link_serialization() {
        let mut link = Link::builder()
            .operation_id("getUser".to_string())
            .build();
        link.parameters.insert(
            "userId".to_string(),
            RuntimeExpressionAnyWrapper::Expression(
                RuntimeExpression::build("$response.body#/id").unwrap(),
            ),
        );
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            json!({
                "operationId": "getUser",
                "parameters": {"userId": "$response.body#/id"}
            })
        );
    }
}
