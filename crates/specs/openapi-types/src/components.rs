//! Components Object - holds reusable objects for different aspects of the OAS.

use crate::{
    CallbackOrReference, ExampleOrReference, Extensions, HeaderOrReference, LinkOrReference,
    ParameterOrReference, PathItemOrReference, RequestBodyOrReference, ResponseOrReference,
    SchemaOrReference, SecuritySchemeOrReference, UnrecognizedFields,
};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;

/// Holds a set of reusable objects for different aspects of the OAS.
/// All objects defined within the components object will have no effect on the API
/// unless they are explicitly referenced from properties outside the components object.
///
/// All the fixed fields declared below are objects that MUST use keys that match
/// the regular expression: `^[a-zA-Z0-9\.\-_]+$`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Components {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub schemas: IndexMap<String, SchemaOrReference>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub responses: IndexMap<String, ResponseOrReference>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub parameters: IndexMap<String, ParameterOrReference>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub examples: IndexMap<String, ExampleOrReference>,

    #[serde(rename = "requestBodies", skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub request_bodies: IndexMap<String, RequestBodyOrReference>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub headers: IndexMap<String, HeaderOrReference>,

    #[serde(rename = "securitySchemes", skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub security_schemes: IndexMap<String, SecuritySchemeOrReference>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub links: IndexMap<String, LinkOrReference>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub callbacks: IndexMap<String, CallbackOrReference>,

    /// Reusable path items (3.1)
    #[serde(rename = "pathItems", skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub path_items: IndexMap<String, PathItemOrReference>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Components {
    /// Create empty components
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema
    pub fn with_schema(mut self, name: impl Into<String>, schema: impl Into<SchemaOrReference>) -> Self {
        self.schemas.insert(name.into(), schema.into());
        self
    }

    /// Add a response
    pub fn with_response(
        mut self,
        name: impl Into<String>,
        response: impl Into<ResponseOrReference>,
    ) -> Self {
        self.responses.insert(name.into(), response.into());
        self
    }

    /// Add a parameter
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        parameter: impl Into<ParameterOrReference>,
    ) -> Self {
        self.parameters.insert(name.into(), parameter.into());
        self
    }

    /// Add an example
    pub fn with_example(mut self, name: impl Into<String>, example: impl Into<ExampleOrReference>) -> Self {
        self.examples.insert(name.into(), example.into());
        self
    }

    /// Add a security scheme
    pub fn with_security_scheme(
        mut self,
        name: impl Into<String>,
        scheme: impl Into<SecuritySchemeOrReference>,
    ) -> Self {
        self.security_schemes.insert(name.into(), scheme.into());
        self
    }

    /// Get a schema by name
    pub fn get_schema(&self, name: &str) -> Option<&SchemaOrReference> {
        self.schemas.get(name)
    }

    /// Bucket names paired with their keys, for every populated bucket
    pub fn keys(&self) -> Vec<(&'static str, Vec<&str>)> {
        fn names<V>(map: &IndexMap<String, V>) -> Vec<&str> {
            map.keys().map(String::as_str).collect()
        }
        [
            ("schemas", names(&self.schemas)),
            ("responses", names(&self.responses)),
            ("parameters", names(&self.parameters)),
            ("examples", names(&self.examples)),
            ("requestBodies", names(&self.request_bodies)),
            ("headers", names(&self.headers)),
            ("securitySchemes", names(&self.security_schemes)),
            ("links", names(&self.links)),
            ("callbacks", names(&self.callbacks)),
            ("pathItems", names(&self.path_items)),
        ]
        .into_iter()
        .filter(|(_, keys)| !keys.is_empty())
        .collect()
    }

    /// Check if components is empty
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.responses.is_empty()
            && self.parameters.is_empty()
            && self.examples.is_empty()
            && self.request_bodies.is_empty()
            && self.headers.is_empty()
            && self.security_schemes.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
            && self.path_items.is_empty()
            && self.extensions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parameter, ParameterLocation, Schema};

    #[test]
    fn test_components_creation() {
        let components = Components::new();
        assert!(components.is_empty());
        assert!(components.keys().is_empty());
    }

    #[test]
    fn test_components_keys() {
        let components = Components::new()
            .with_schema("Pet", Schema::object())
            .with_schema("Error", Schema::object())
            .with_parameter("limit", Parameter::new("limit", ParameterLocation::Query));

        assert!(!components.is_empty());
        assert_eq!(
            components.keys(),
            vec![
                ("schemas", vec!["Pet", "Error"]),
                ("parameters", vec!["limit"]),
            ]
        );
        assert!(components.get_schema("Pet").is_some());
        assert!(components.get_schema("pet").is_none());
    }
}
