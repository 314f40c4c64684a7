//! Tag Object and tag references.
//!
//! Operations refer to tags by bare name. Those names become
//! [`TagOrReference`] references which resolve against the host document's
//! top-level `tags` list rather than the workspace registry.

use crate::reference::{Reference, ReferenceHolder, ReferenceType, Referenceable};
use crate::workspace::Component;
use crate::{Extensions, ExternalDocumentation, UnrecognizedFields};
use bon::Builder;
use serde::Serialize;

/// Adds metadata to a single tag that is used by the Operation Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Tag {
    /// The name of the tag. REQUIRED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A description for the tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Additional external documentation for this tag.
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Tag {
    /// Create a new Tag with required name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the external documentation
    pub fn with_external_docs(mut self, external_docs: ExternalDocumentation) -> Self {
        self.external_docs = Some(external_docs);
        self
    }
}

/// A tag inline, or a tag named by an operation
pub type TagOrReference = ReferenceHolder<Tag>;

impl Referenceable for Tag {
    const REFERENCE_TYPE: ReferenceType = ReferenceType::Tag;

    fn from_component(_component: &Component) -> Option<ReferenceHolder<Self>> {
        None
    }

    fn into_component(_holder: ReferenceHolder<Self>) -> Option<Component> {
        None
    }

    /// Find the host document tag whose name equals the id, case-sensitively.
    fn resolve_reference(reference: &Reference) -> Option<ReferenceHolder<Self>> {
        let document = reference.host_document()?;
        document
            .tags
            .iter()
            .find(|tag| tag.name.as_deref() == Some(reference.id.as_str()))
            .map(|tag| ReferenceHolder::inline(tag.clone()))
    }

    fn apply_overrides(&mut self, reference: &Reference) {
        if let Some(description) = &reference.description {
            self.description = Some(description.clone());
        }
    }
}

impl ReferenceHolder<Tag> {
    /// Reference a tag by name
    pub fn named(name: &str) -> crate::OpenApiResult<Self> {
        Ok(Self::from_reference(Reference::tag(name)?))
    }

    /// The tag name; falls back to the reference id when unresolved.
    pub fn name(&self) -> Option<String> {
        match self {
            Self::Inline(tag) => tag.name.clone(),
            Self::Reference(reference) => self
                .with_target(|tag| tag.name.clone())
                .flatten()
                .or_else(|| Some(reference.id.clone())),
        }
    }

    pub fn description(&self) -> Option<String> {
        self.forward_description(|tag| tag.description.clone())
    }

    pub fn external_docs(&self) -> Option<ExternalDocumentation> {
        self.with_target(|tag| tag.external_docs.clone()).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_creation() {
        let tag = Tag::new("pets").with_description("Everything about pets");
        assert_eq!(tag.name.as_deref(), Some("pets"));
        assert_eq!(
            serde_json::to_value(&tag).unwrap(),
            json!({"name": "pets", "description": "Everything about pets"})
        );
    }

    #[test]
    fn test_unresolved_tag_reference_falls_back_to_id() {
        let tag = TagOrReference::named("pets").unwrap();
        assert_eq!(tag.name().as_deref(), Some("pets"));
        assert_eq!(tag.description(), None);
        assert_eq!(tag.external_docs(), None);
        assert_eq!(serde_json::to_value(&tag).unwrap(), json!("pets"));
    }

    #[test]
    fn test_inline_tag_accessors() {
        let tag = TagOrReference::inline(Tag::new("store").with_description("Orders"));
        assert_eq!(tag.name().as_deref(), Some("store"));
        assert_eq!(tag.description().as_deref(), Some("Orders"));
    }
}
