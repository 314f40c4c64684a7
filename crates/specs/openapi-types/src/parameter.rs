//! Parameter Object.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{
    ExampleOrReference, Extensions, MediaType, SchemaOrReference, UnrecognizedFields,
};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A parameter inline, or a reference to one
pub type ParameterOrReference = ReferenceHolder<Parameter>;

/// The location of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterLocation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "path" => Some(Self::Path),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// How a parameter value is serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    Matrix,
    Label,
    Form,
    Simple,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl ParameterStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        let style = match name {
            "matrix" => Self::Matrix,
            "label" => Self::Label,
            "form" => Self::Form,
            "simple" => Self::Simple,
            "spaceDelimited" => Self::SpaceDelimited,
            "pipeDelimited" => Self::PipeDelimited,
            "deepObject" => Self::DeepObject,
            _ => return None,
        };
        Some(style)
    }
}

/// Describes a single operation parameter.
///
/// A unique parameter is defined by a combination of a name and location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Parameter {
    /// The name of the parameter. REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The location of the parameter. REQUIRED.
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// MUST be true for path parameters
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

impl Parameter {
    /// Create a parameter with its identifying pair
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: Some(name.into()),
            required: location == ParameterLocation::Path,
            location: Some(location),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<SchemaOrReference>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

referenceable_component!(Parameter, |target, reference| {
    if let Some(description) = &reference.description {
        target.description = Some(description.clone());
    }
});

impl ReferenceHolder<Parameter> {
    pub fn name(&self) -> Option<String> {
        self.with_target(|p| p.name.clone()).flatten()
    }

    pub fn location(&self) -> Option<ParameterLocation> {
        self.with_target(|p| p.location).flatten()
    }

    pub fn description(&self) -> Option<String> {
        self.forward_description(|p| p.description.clone())
    }

    pub fn required(&self) -> bool {
        self.with_target(|p| p.required).unwrap_or_default()
    }

    pub fn schema(&self) -> Option<SchemaOrReference> {
        self.with_target(|p| p.schema.clone()).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reference, ReferenceType, Schema};
    use serde_json::json;

    #[test]
    fn test_path_parameter_defaults_to_required() {
        let parameter = Parameter::new("petId", ParameterLocation::Path);
        assert!(parameter.required);
        let parameter = Parameter::new("limit", ParameterLocation::Query);
        assert!(!parameter.required);
    }

    #[test]
    fn test_parameter_serialization() {
        let parameter = Parameter::new("limit", ParameterLocation::Query)
            .with_schema(Schema::integer())
            .with_description("Page size");
        assert_eq!(
            serde_json::to_value(&parameter).unwrap(),
            json!({
                "name": "limit",
                "in": "query",
                "description": "Page size",
                "schema": {"type": "integer"}
            })
        );
    }

    #[test]
    fn test_unresolved_parameter_accessors() {
        let holder = ParameterOrReference::from_reference(
            Reference::new("limit", ReferenceType::Parameter).unwrap(),
        );
        assert_eq!(holder.name(), None);
        assert_eq!(holder.location(), None);
        assert!(!holder.required());
        assert!(holder.schema().is_none());
    }

    #[test]
    fn test_style_names() {
        assert_eq!(
            ParameterStyle::from_name("deepObject"),
            Some(ParameterStyle::DeepObject)
        );
        assert_eq!(ParameterStyle::from_name("DeepObject"), None);
        assert_eq!(
            serde_json::to_value(ParameterStyle::SpaceDelimited).unwrap(),
            json!("spaceDelimited")
        );
    }
}
