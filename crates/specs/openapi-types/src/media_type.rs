//! Media Type Object and Encoding Object.

use crate::{
    ExampleOrReference, Extensions, HeaderOrReference, ParameterStyle, SchemaOrReference,
    UnrecognizedFields,
};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Provides schema and examples for the media type identified by its key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct MediaType {
    /// The schema defining the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrReference>,

    /// Example of the media type, interpreted against `schema`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Named examples, each value interpreted against `schema`
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub examples: IndexMap<String, ExampleOrReference>,

    /// Property name to encoding information
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub encoding: IndexMap<String, Encoding>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl MediaType {
    pub fn with_schema(schema: impl Into<SchemaOrReference>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::default()
        }
    }
}

/// A single encoding definition applied to a single schema property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Encoding {
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub headers: IndexMap<String, HeaderOrReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(rename = "allowReserved", skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}
