//! Response Object and the Responses container.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{Extensions, HeaderOrReference, LinkOrReference, MediaType, UnrecognizedFields};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;

/// A response inline, or a reference to one
pub type ResponseOrReference = ReferenceHolder<Response>;

/// Describes a single response from an API operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Response {
    /// A description of the response. REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub headers: IndexMap<String, HeaderOrReference>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub links: IndexMap<String, LinkOrReference>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, media_type: impl Into<String>, content: MediaType) -> Self {
        self.content.insert(media_type.into(), content);
        self
    }
}

referenceable_component!(Response, |target, reference| {
    if let Some(description) = &reference.description {
        target.description = Some(description.clone());
    }
});

impl ReferenceHolder<Response> {
    pub fn description(&self) -> Option<String> {
        self.forward_description(|r| r.description.clone())
    }

    pub fn content(&self) -> IndexMap<String, MediaType> {
        self.with_target(|r| r.content.clone()).unwrap_or_default()
    }
}

/// Expected responses of an operation, keyed by HTTP status code or `default`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Responses {
    #[serde(flatten)]
    pub entries: IndexMap<String, ResponseOrReference>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, status: impl Into<String>, response: impl Into<ResponseOrReference>) -> Self {
        self.insert(status, response);
        self
    }

    pub fn insert(&mut self, status: impl Into<String>, response: impl Into<ResponseOrReference>) {
        self.entries.insert(status.into(), response.into());
    }

    pub fn get(&self, status: &str) -> Option<&ResponseOrReference> {
        self.entries.get(status)
    }

    /// The `default` response
    pub fn default_response(&self) -> Option<&ResponseOrReference> {
        self.get("default")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResponseOrReference)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
