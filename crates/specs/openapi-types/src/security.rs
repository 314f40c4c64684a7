//! Security Scheme, OAuth Flows and Security Requirement Objects.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{Extensions, ParameterLocation, UnrecognizedFields};
use bon::Builder;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A security scheme inline, or a reference to one by name
pub type SecuritySchemeOrReference = ReferenceHolder<SecurityScheme>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "openIdConnect")]
    OpenIdConnect,
    #[serde(rename = "mutualTLS")]
    MutualTls,
}

impl SecuritySchemeType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "apiKey" => Some(Self::ApiKey),
            "http" => Some(Self::Http),
            "oauth2" => Some(Self::OAuth2),
            "openIdConnect" => Some(Self::OpenIdConnect),
            "mutualTLS" => Some(Self::MutualTls),
            _ => None,
        }
    }
}

/// Defines a security scheme that can be used by the operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct SecurityScheme {
    /// The type of the security scheme. REQUIRED.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<SecuritySchemeType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Name of the header, query or cookie parameter (apiKey)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Location of the API key (apiKey)
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,

    /// HTTP authorization scheme (http)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    /// Supported flows (oauth2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,

    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

referenceable_component!(SecurityScheme, |target, reference| {
    if let Some(description) = &reference.description {
        target.description = Some(description.clone());
    }
});

impl ReferenceHolder<SecurityScheme> {
    pub fn scheme_type(&self) -> Option<SecuritySchemeType> {
        self.with_target(|s| s.scheme_type).flatten()
    }

    pub fn description(&self) -> Option<String> {
        self.forward_description(|s| s.description.clone())
    }
}

/// Configuration of the supported OAuth flows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,

    #[serde(rename = "clientCredentials", skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,

    #[serde(rename = "authorizationCode", skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl OAuthFlows {
    /// Flows paired with their field names, skipping the absent ones
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OAuthFlow)> {
        [
            ("implicit", self.implicit.as_ref()),
            ("password", self.password.as_ref()),
            ("clientCredentials", self.client_credentials.as_ref()),
            ("authorizationCode", self.authorization_code.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, flow)| flow.map(|flow| (name, flow)))
    }
}

/// Configuration details for a supported OAuth flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct OAuthFlow {
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,

    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(rename = "refreshUrl", skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,

    /// Scope name to a short description. REQUIRED, may be empty.
    #[builder(default)]
    pub scopes: IndexMap<String, String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

/// One scheme a security requirement names, with the scopes it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityRequirementEntry {
    /// Reference to the scheme by name
    pub scheme: SecuritySchemeOrReference,
    pub scopes: Vec<String>,
}

/// Security mechanisms that must all be satisfied together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SecurityRequirement {
    pub entries: Vec<SecurityRequirementEntry>,
}

impl SecurityRequirement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, scheme: SecuritySchemeOrReference, scopes: Vec<String>) -> Self {
        self.entries.push(SecurityRequirementEntry { scheme, scopes });
        self
    }

    /// Scheme names in declaration order
    pub fn scheme_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.scheme.as_reference().map(|r| r.id.as_str()))
    }
}

impl Serialize for SecurityRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            if let Some(reference) = entry.scheme.as_reference() {
                map.serialize_entry(&reference.id, &entry.scopes)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reference, ReferenceType};
    use serde_json::json;

    #[test]
    fn test_security_requirement_serialization() {
        let requirement = SecurityRequirement::new().with(
            SecuritySchemeOrReference::from_reference(
                Reference::new("petstore_auth", ReferenceType::SecurityScheme).unwrap(),
            ),
            vec!["write:pets".to_string()],
        );
        assert_eq!(
            requirement.scheme_names().collect::<Vec<_>>(),
            vec!["petstore_auth"]
        );
        assert_eq!(
            serde_json::to_value(&requirement).unwrap(),
            json!({"petstore_auth": ["write:pets"]})
        );
    }

    #[test]
    fn test_oauth_flows_iter() {
        let flows = OAuthFlows::builder()
            .implicit(
                OAuthFlow::builder()
                    .authorization_url("https://example.com/auth".to_string())
                    .build(),
            )
            .build();
        let names: Vec<_> = flows.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["implicit"]);
    }
}
