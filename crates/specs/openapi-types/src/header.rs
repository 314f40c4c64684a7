//! Header Object.
//!
//! Follows the structure of the Parameter Object, without `name` and `in`.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{
    ExampleOrReference, Extensions, MediaType, ParameterStyle, SchemaOrReference,
    UnrecognizedFields,
};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A header inline, or a reference to one
pub type HeaderOrReference = ReferenceHolder<Header>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[builder(default)]
    pub required: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[builder(default)]
    pub deprecated: bool,

    #[serde(rename = "allowEmptyValue", skip_serializing_if = "std::ops::Not::not")]
    #[builder(default)]
    pub allow_empty_value: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(rename = "allowReserved", skip_serializing_if = "std::ops::Not::not")]
    #[builder(default)]
    pub allow_reserved: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub examples: IndexMap<String, ExampleOrReference>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub content: IndexMap<String, MediaType>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

referenceable_component!(Header, |target, reference| {
    if let Some(description) = &reference.description {
        target.description = Some(description.clone());
    }
});

impl ReferenceHolder<Header> {
    pub fn description(&self) -> Option<String> {
        self.forward_description(|h| h.description.clone())
    }

    pub fn schema(&self) -> Option<SchemaOrReference> {
        self.with_target(|h| h.schema.clone()).flatten()
    }
}
