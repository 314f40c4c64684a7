//! Paths, Path Item and Operation Objects.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{
    CallbackOrReference, Extensions, ExternalDocumentation, ParameterOrReference,
    RequestBodyOrReference, Responses, SecurityRequirement, Server, TagOrReference,
    UnrecognizedFields,
};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;

/// A path item inline, or a reference to one
pub type PathItemOrReference = ReferenceHolder<PathItem>;

/// HTTP methods an operation can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl OperationType {
    pub const ALL: [OperationType; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

/// Relative paths to the individual endpoints and their operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Paths {
    #[serde(flatten)]
    pub entries: IndexMap<String, PathItemOrReference>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, item: impl Into<PathItemOrReference>) -> Self {
        self.entries.insert(path.into(), item.into());
        self
    }

    pub fn get(&self, path: &str) -> Option<&PathItemOrReference> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathItemOrReference)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Describes the operations available on a single path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Operations by HTTP method, in declaration order
    #[serde(flatten)]
    #[builder(default)]
    pub operations: IndexMap<OperationType, Operation>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub servers: Vec<Server>,

    /// Parameters applicable to every operation under this path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub parameters: Vec<ParameterOrReference>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl PathItem {
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_operation(mut self, operation_type: OperationType, operation: Operation) -> Self {
        self.operations.insert(operation_type, operation);
        self
    }
}

referenceable_component!(PathItem, |target, reference| {
    if let Some(summary) = &reference.summary {
        target.summary = Some(summary.clone());
    }
    if let Some(description) = &reference.description {
        target.description = Some(description.clone());
    }
});

impl ReferenceHolder<PathItem> {
    pub fn summary(&self) -> Option<String> {
        self.forward_summary(|p| p.summary.clone())
    }

    pub fn description(&self) -> Option<String> {
        self.forward_description(|p| p.description.clone())
    }

    pub fn operations(&self) -> IndexMap<OperationType, Operation> {
        self.with_target(|p| p.operations.clone()).unwrap_or_default()
    }
}

/// Describes a single API operation on a path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Operation {
    /// Tags for API documentation control, by name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub tags: Vec<TagOrReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,

    /// Unique string used to identify the operation
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub parameters: Vec<ParameterOrReference>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyOrReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Responses>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub callbacks: IndexMap<String, CallbackOrReference>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[builder(default)]
    pub deprecated: bool,

    /// Overrides the document-level security; `Some(vec![])` removes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub servers: Vec<Server>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Operation {
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn with_responses(mut self, responses: Responses) -> Self {
        self.responses = Some(responses);
        self
    }

    pub fn with_parameter(mut self, parameter: impl Into<ParameterOrReference>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn with_tag(mut self, tag: TagOrReference) -> Self {
        self.tags.push(tag);
        self
    }
}
