//! Server Object and Server Variable Object.

use crate::{Extensions, UnrecognizedFields};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;

/// An object representing a Server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Server {
    /// A URL to the target host. REQUIRED.
    /// Supports Server Variables in `{braces}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// An optional string describing the host designated by the URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A map between a variable name and its value, used for substitution
    /// in the server's URL template.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub variables: IndexMap<String, ServerVariable>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Server {
    /// Create a new Server with required URL
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

    /// Add a server variable
    pub fn with_variable(mut self, name: impl Into<String>, variable: ServerVariable) -> Self {
        self.variables.insert(name.into(), variable);
        self
    }

    /// Substitute every variable's default into the URL template.
    pub fn interpolated_url(&self) -> Option<String> {
        let mut url = self.url.clone()?;
        for (name, variable) in &self.variables {
            if let Some(default) = &variable.default {
                url = url.replace(&format!("{{{name}}}"), default);
            }
        }
        Some(url)
    }
}

/// An object representing a Server Variable for server URL template substitution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct ServerVariable {
    /// An enumeration of string values to be used if the substitution
    /// options are from a limited set.
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub enum_values: Vec<String>,

    /// The default value to use for substitution. REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// An optional description for the server variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl ServerVariable {
    /// Create a new ServerVariable with required default value
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            ..Self::default()
        }
    }

    /// Set the enum values
    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enum_values = values;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_interpolation() {
        let server = Server::new("https://{env}.example.com:{port}/v1")
            .with_variable("env", ServerVariable::new("api"))
            .with_variable(
                "port",
                ServerVariable::new("443").with_enum(vec!["443".into(), "8443".into()]),
            );
        assert_eq!(
            server.interpolated_url().as_deref(),
            Some("https://api.example.com:443/v1")
        );
    }

    #[test]
    fn test_server_serialization() {
        let server = Server::new("https://example.com").with_description("Production");
        assert_eq!(
            serde_json::to_value(&server).unwrap(),
            json!({"url": "https://example.com", "description": "Production"})
        );
    }
}
