//! Request Body Object.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{Extensions, MediaType, UnrecognizedFields};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;

/// A request body inline, or a reference to one
pub type RequestBodyOrReference = ReferenceHolder<RequestBody>;

/// Describes a single request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Media type or media type range to its content. REQUIRED.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[builder(default)]
    pub required: bool,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

referenceable_component!(RequestBody, |target, reference| {
    if let Some(description) = &reference.description {
        target.description = Some(description.clone());
    }
});

impl ReferenceHolder<RequestBody> {
    pub fn description(&self) -> Option<String> {
        self.forward_description(|b| b.description.clone())
    }

    pub fn content(&self) -> IndexMap<String, MediaType> {
        self.with_target(|b| b.content.clone()).unwrap_or_default()
    }
}
