//! Info Object and related types.
//!
//! The Info object provides metadata about the API.

use crate::{Extensions, UnrecognizedFields};
use bon::Builder;
use serde::Serialize;

/// The object provides metadata about the API.
/// The metadata MAY be used by the clients if needed, and MAY be presented
/// in editing or documentation generation tools for convenience.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Info {
    /// The title of the API. REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// A short summary of the API (3.1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// A description of the API.
    /// CommonMark syntax MAY be used for rich text representation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A URL to the Terms of Service for the API.
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,

    /// The contact information for the exposed API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    /// The license information for the exposed API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,

    /// The version of the API document. REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    /// Fields not modeled for the declared version
    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Info {
    /// Create a new Info object with required fields
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the contact information
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Set the license information
    pub fn with_license(mut self, license: License) -> Self {
        self.license = Some(license);
        self
    }

    /// Add an extension field
    pub fn with_extension(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extensions.insert(key, value);
        self
    }
}

/// Contact information for the exposed API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Contact {
    /// The identifying name of the contact person/organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The URL pointing to the contact information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The email address of the contact person/organization.
    /// MUST be in the format of an email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Contact {
    /// Create a new empty Contact
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the contact name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the contact URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// License information for the exposed API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct License {
    /// The license name used for the API. REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// An SPDX license expression (3.1). Mutually exclusive with `url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// A URL to the license used for the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl License {
    /// Create a new License with required name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the license URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the SPDX identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_info_creation() {
        let info = Info::new("Test API", "1.0.0");
        assert_eq!(info.title.as_deref(), Some("Test API"));
        assert_eq!(info.version.as_deref(), Some("1.0.0"));
        assert!(info.description.is_none());
    }

    #[test]
    fn test_info_builder() {
        let info = Info::builder()
            .title("Test API".to_string())
            .version("1.0.0".to_string())
            .summary("Short".to_string())
            .build();

        assert_eq!(info.summary.as_deref(), Some("Short"));
        assert!(info.extensions.is_empty());
    }

    #[test]
    fn test_info_serialization() {
        let info = Info::new("Test API", "1.0.0")
            .with_contact(Contact::new().with_email("api@example.com"))
            .with_license(License::new("MIT").with_identifier("MIT"))
            .with_extension("x-audience", "public");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            json!({
                "title": "Test API",
                "contact": {"email": "api@example.com"},
                "license": {"name": "MIT", "identifier": "MIT"},
                "version": "1.0.0",
                "x-audience": "public"
            })
        );
    }

    #[test]
    fn test_unrecognized_fields_are_emitted() {
        let mut license = License::new("MIT");
        license
            .unrecognized_fields
            .insert("spdx", json!("MIT"));
        let json = serde_json::to_value(&license).unwrap();
        assert_eq!(json, json!({"name": "MIT", "spdx": "MIT"}));
    }
}
