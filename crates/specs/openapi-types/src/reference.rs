//! Reference Object and the reference/inline duality.
//!
//! Any composite element of a document can appear inline or as a `$ref` to a
//! component defined elsewhere. [`ReferenceHolder`] carries either shape
//! behind one type; [`ReferenceHolder::target`] resolves the reference shape
//! lazily through the owning document's [`crate::Workspace`].
//!
//! Resolution never fails. A reference that has no host document, points at
//! a location nothing is registered under, or chains back onto itself simply
//! has no target, and every forwarding accessor degrades to `None`.

use crate::document::OpenApiDocument;
use crate::error::{OpenApiError, OpenApiResult, check_argument_not_empty};
use crate::location::{self, unescape_pointer_segment};
use crate::version::OpenApiSpecVersion;
use crate::workspace::Component;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::{Arc, OnceLock, Weak};

/// Kinds of element a reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReferenceType {
    Schema,
    Response,
    Parameter,
    Example,
    RequestBody,
    Header,
    SecurityScheme,
    Link,
    Callback,
    PathItem,
    Tag,
}

impl ReferenceType {
    /// Name of the `components` bucket holding this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Schema => "schemas",
            Self::Response => "responses",
            Self::Parameter => "parameters",
            Self::Example => "examples",
            Self::RequestBody => "requestBodies",
            Self::Header => "headers",
            Self::SecurityScheme => "securitySchemes",
            Self::Link => "links",
            Self::Callback => "callbacks",
            Self::PathItem => "pathItems",
            Self::Tag => "tags",
        }
    }

    /// Inverse of [`ReferenceType::display_name`]
    pub fn from_display_name(name: &str) -> Option<Self> {
        let kind = match name {
            "schemas" => Self::Schema,
            "responses" => Self::Response,
            "parameters" => Self::Parameter,
            "examples" => Self::Example,
            "requestBodies" => Self::RequestBody,
            "headers" => Self::Header,
            "securitySchemes" => Self::SecurityScheme,
            "links" => Self::Link,
            "callbacks" => Self::Callback,
            "pathItems" => Self::PathItem,
            "tags" => Self::Tag,
            _ => return None,
        };
        Some(kind)
    }

    /// Swagger 2.0 top-level section holding this kind, if it has one
    pub fn v2_display_name(&self) -> Option<&'static str> {
        match self {
            Self::Schema => Some("definitions"),
            Self::Parameter => Some("parameters"),
            Self::Response => Some("responses"),
            Self::SecurityScheme => Some("securityDefinitions"),
            _ => None,
        }
    }

    fn from_v2_display_name(name: &str) -> Option<Self> {
        match name {
            "definitions" => Some(Self::Schema),
            "parameters" => Some(Self::Parameter),
            "responses" => Some(Self::Response),
            "securityDefinitions" => Some(Self::SecurityScheme),
            _ => None,
        }
    }

    /// Tags and security schemes are referenced by bare name, not by `$ref`
    pub fn is_named_only(&self) -> bool {
        matches!(self, Self::Tag | Self::SecurityScheme)
    }
}

/// A pointer to a component, possibly in another document.
///
/// `id` is the component key (`Pet`) for whole components, or a `#/...`
/// fragment for locations nested inside a schema. The host document is a
/// non-owning back-reference, set at most once.
#[derive(Debug, Clone)]
pub struct Reference {
    /// Component key, or `#`-prefixed fragment for nested schema locations
    pub id: String,

    /// Kind of the referenced element
    pub reference_type: ReferenceType,

    /// Document the component lives in, when not the host document
    pub external_resource: Option<String>,

    /// Summary override (3.1)
    pub summary: Option<String>,

    /// Description override (3.1)
    pub description: Option<String>,

    host_document: OnceLock<Weak<OpenApiDocument>>,
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.reference_type == other.reference_type
            && self.external_resource == other.external_resource
            && self.summary == other.summary
            && self.description == other.description
    }
}

impl Reference {
    /// Create a reference to a component by key.
    pub fn new(id: impl Into<String>, reference_type: ReferenceType) -> OpenApiResult<Self> {
        let id = id.into();
        check_argument_not_empty("id", &id)?;
        Ok(Self {
            id,
            reference_type,
            external_resource: None,
            summary: None,
            description: None,
            host_document: OnceLock::new(),
        })
    }

    /// Create a reference to a schema component
    pub fn schema(name: &str) -> OpenApiResult<Self> {
        Self::new(name, ReferenceType::Schema)
    }

    /// Create a reference to a tag by name
    pub fn tag(name: &str) -> OpenApiResult<Self> {
        Self::new(name, ReferenceType::Tag)
    }

    pub fn with_external_resource(mut self, resource: impl Into<String>) -> Self {
        self.external_resource = Some(resource.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse a raw `$ref` string read from a document of the given version.
    ///
    /// Recognized shapes:
    /// - `#/components/<bucket>/<key>` (3.x) or `#/definitions/<key>`,
    ///   `#/parameters/<key>`, `#/responses/<key>` (2.0)
    /// - `#/components/schemas/<key>/<nested path>` for locations inside a schema
    /// - `<resource>#<fragment>` and bare `<resource>` for external documents
    ///
    /// Anything else is a [`OpenApiError::ReferenceFormat`] error.
    pub fn parse(
        raw: &str,
        reference_type: ReferenceType,
        version: OpenApiSpecVersion,
    ) -> OpenApiResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(OpenApiError::reference_format(
                "reference cannot be empty",
                raw,
            ));
        }

        let (resource, fragment) = location::split_fragment(trimmed);
        let external_resource = (!resource.is_empty()).then(|| resource.to_string());

        let Some(fragment) = fragment else {
            // A whole external document.
            let mut reference = Self::new(trimmed, reference_type)?;
            reference.external_resource = external_resource;
            return Ok(reference);
        };

        if !fragment.starts_with('/') {
            return Err(OpenApiError::reference_format(
                "fragment must be a JSON pointer starting with '/'",
                raw,
            ));
        }

        let segments = location::fragment_segments(fragment);
        let id = match segments.as_slice() {
            [] | ["components"] | ["components", _] => {
                return Err(OpenApiError::reference_format(
                    "fragment does not name a component",
                    raw,
                ));
            }
            ["components", _, key] => unescape_pointer_segment(key).into_owned(),
            ["components", "schemas", _, ..] => format!("#{fragment}"),
            [section, key] if version.is_v2() && ReferenceType::from_v2_display_name(section).is_some() => {
                unescape_pointer_segment(key).into_owned()
            }
            ["definitions", _, ..] if version.is_v2() => {
                format!("#{}schemas/{}", location::COMPONENTS_SEGMENT, segments[1..].join("/"))
            }
            _ => format!("#{fragment}"),
        };

        if id.trim().is_empty() {
            return Err(OpenApiError::reference_format(
                "component key cannot be empty",
                raw,
            ));
        }

        let mut reference = Self::new(id, reference_type)?;
        reference.external_resource = external_resource;
        Ok(reference)
    }

    /// Whether the reference points into another document
    pub fn is_external(&self) -> bool {
        self.external_resource.is_some()
    }

    /// Whether the id is a fragment nested below a component
    pub fn is_fragment(&self) -> bool {
        self.id.starts_with('#')
    }

    /// The owning document, if it is set and still alive
    pub fn host_document(&self) -> Option<Arc<OpenApiDocument>> {
        self.host_document.get()?.upgrade()
    }

    pub fn has_host_document(&self) -> bool {
        self.host_document.get().is_some()
    }

    /// Set the host document unless one is already set.
    ///
    /// Returns whether this call set it. Later calls are no-ops.
    pub fn ensure_host_document_is_set(&self, document: &Arc<OpenApiDocument>) -> bool {
        self.host_document.set(Arc::downgrade(document)).is_ok()
    }

    /// Absolute location of the target, computed from the host document.
    pub fn location(&self) -> Option<String> {
        let document = self.host_document()?;
        self.location_in(&document)
    }

    /// Absolute location of the target as seen from `document`.
    pub fn location_in(&self, document: &OpenApiDocument) -> Option<String> {
        let mut base = match &self.external_resource {
            Some(resource) => match document.workspace.document_id(resource) {
                Some(url) => url,
                None => location::to_location_url(&document.base_uri, resource)?,
            },
            None => document.base_uri.clone(),
        };
        base.set_fragment(None);
        let base = base.as_str();

        if self.is_fragment() {
            return Some(format!("{base}{}", self.id));
        }
        if self.external_resource.as_deref() == Some(self.id.as_str()) {
            return Some(base.to_string());
        }
        Some(location::component_location(
            base,
            self.reference_type.display_name(),
            &self.id,
        ))
    }

    /// Render as a 3.x `$ref` string
    pub fn reference_v3(&self) -> String {
        let external = self.external_resource.as_deref().unwrap_or("");
        if self.is_fragment() {
            return format!("{external}{}", self.id);
        }
        if !self.is_external() && self.reference_type.is_named_only() {
            return self.id.clone();
        }
        if self.external_resource.as_deref() == Some(self.id.as_str()) {
            return self.id.clone();
        }
        format!(
            "{external}#{}{}/{}",
            location::COMPONENTS_SEGMENT,
            self.reference_type.display_name(),
            self.id
        )
    }

    /// Render as a Swagger 2.0 `$ref` string
    pub fn reference_v2(&self) -> String {
        let external = self.external_resource.as_deref().unwrap_or("");
        if self.is_fragment() {
            let fragment = self
                .id
                .strip_prefix(location::SCHEMA_COMPONENTS_SEGMENT)
                .map(|rest| format!("#/definitions/{rest}"))
                .unwrap_or_else(|| self.id.clone());
            return format!("{external}{fragment}");
        }
        if !self.is_external() && self.reference_type.is_named_only() {
            return self.id.clone();
        }
        match self.reference_type.v2_display_name() {
            Some(section) => format!("{external}#/{section}/{}", self.id),
            None => self.reference_v3(),
        }
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.reference_type == ReferenceType::Tag {
            return serializer.serialize_str(&self.id);
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("$ref", &self.reference_v3())?;
        if let Some(summary) = &self.summary {
            map.serialize_entry("summary", summary)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        map.end()
    }
}

/// An element that can stand behind a [`ReferenceHolder`].
pub trait Referenceable: Clone + Send + Sync + 'static {
    /// The kind references to this element carry
    const REFERENCE_TYPE: ReferenceType;

    /// View a registered component as this kind, if it is one
    fn from_component(component: &Component) -> Option<ReferenceHolder<Self>>;

    /// Wrap into a registrable component; `None` for kinds without a bucket
    fn into_component(holder: ReferenceHolder<Self>) -> Option<Component>;

    /// Look up the element a reference points at.
    fn resolve_reference(reference: &Reference) -> Option<ReferenceHolder<Self>> {
        let document = reference.host_document()?;
        let location = reference.location_in(&document)?;
        document.workspace.resolve_reference::<Self>(&location)
    }

    /// Apply reference-level overrides onto a materialized copy of the target.
    fn apply_overrides(&mut self, _reference: &Reference) {}
}

/// Either a reference to an element or the element itself.
#[derive(Debug)]
pub enum ReferenceHolder<T> {
    /// A `$ref` to an element defined elsewhere
    Reference(Arc<Reference>),
    /// The element, inline
    Inline(Arc<T>),
}

impl<T> Clone for ReferenceHolder<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Reference(reference) => Self::Reference(Arc::clone(reference)),
            Self::Inline(value) => Self::Inline(Arc::clone(value)),
        }
    }
}

impl<T: PartialEq> PartialEq for ReferenceHolder<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Reference(a), Self::Reference(b)) => a == b,
            (Self::Inline(a), Self::Inline(b)) => a == b,
            _ => false,
        }
    }
}

impl<T: Serialize> Serialize for ReferenceHolder<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Reference(reference) => Reference::serialize(reference, serializer),
            Self::Inline(value) => T::serialize(value, serializer),
        }
    }
}

impl<T: Referenceable> From<T> for ReferenceHolder<T> {
    fn from(value: T) -> Self {
        Self::inline(value)
    }
}

impl<T> ReferenceHolder<T> {
    /// Address of the shared value behind this holder.
    ///
    /// Two holders share an identity exactly when one is a (shallow) copy of
    /// the other.
    pub fn identity(&self) -> usize {
        match self {
            Self::Reference(reference) => Arc::as_ptr(reference) as *const () as usize,
            Self::Inline(value) => Arc::as_ptr(value) as *const () as usize,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    pub fn as_reference(&self) -> Option<&Arc<Reference>> {
        match self {
            Self::Reference(reference) => Some(reference),
            Self::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&Arc<T>> {
        match self {
            Self::Reference(_) => None,
            Self::Inline(value) => Some(value),
        }
    }

    /// A new holder sharing the same reference or inline value.
    pub fn create_shallow_copy(&self) -> Self {
        self.clone()
    }
}

impl<T: Referenceable> ReferenceHolder<T> {
    pub fn inline(value: T) -> Self {
        Self::Inline(Arc::new(value))
    }

    pub fn from_reference(reference: Reference) -> Self {
        Self::Reference(Arc::new(reference))
    }

    /// The resolved element.
    ///
    /// Inline holders return their value. Reference holders follow the chain
    /// of references through the workspace until an inline element is found;
    /// a missing link or a chain that revisits itself yields `None`.
    pub fn target(&self) -> Option<Arc<T>> {
        let mut current = self.clone();
        let mut seen: Vec<usize> = Vec::new();
        loop {
            match current {
                Self::Inline(value) => return Some(value),
                Self::Reference(reference) => {
                    let identity = Arc::as_ptr(&reference) as usize;
                    if seen.contains(&identity) {
                        tracing::debug!("Reference chain loops back on {}", reference.id);
                        return None;
                    }
                    seen.push(identity);
                    current = T::resolve_reference(&reference)?;
                }
            }
        }
    }

    /// Apply `f` to the resolved element
    pub fn with_target<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.target().map(|target| f(&target))
    }

    /// Materialize the resolved element as an owned copy, with the
    /// reference's summary/description overrides applied.
    ///
    /// The shared component is left untouched, so the copy can be edited
    /// locally.
    pub fn copy_reference_as_target_element_with_overrides(&self) -> Option<T> {
        match self {
            Self::Inline(value) => Some(T::clone(value)),
            Self::Reference(reference) => {
                let mut copy = T::clone(&*self.target()?);
                copy.apply_overrides(reference);
                Some(copy)
            }
        }
    }

    /// Mutable access to an inline value, copying it first if shared.
    pub fn make_inline_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Reference(_) => None,
            Self::Inline(value) => Some(Arc::make_mut(value)),
        }
    }

    /// Description, preferring the reference's own override
    pub(crate) fn forward_description(&self, get: impl FnOnce(&T) -> Option<String>) -> Option<String> {
        if let Self::Reference(reference) = self {
            if let Some(description) = &reference.description {
                return Some(description.clone());
            }
        }
        self.with_target(get).flatten()
    }

    /// Summary, preferring the reference's own override
    pub(crate) fn forward_summary(&self, get: impl FnOnce(&T) -> Option<String>) -> Option<String> {
        if let Self::Reference(reference) = self {
            if let Some(summary) = &reference.summary {
                return Some(summary.clone());
            }
        }
        self.with_target(get).flatten()
    }
}

/// Implement [`Referenceable`] for a type stored in the `components` bucket
/// of the same name, with the given override application.
macro_rules! referenceable_component {
    ($ty:ident, |$target:ident, $reference:ident| $overrides:block) => {
        impl $crate::reference::Referenceable for $ty {
            const REFERENCE_TYPE: $crate::reference::ReferenceType =
                $crate::reference::ReferenceType::$ty;

            fn from_component(
                component: &$crate::workspace::Component,
            ) -> Option<$crate::reference::ReferenceHolder<Self>> {
                match component {
                    $crate::workspace::Component::$ty(holder) => Some(holder.clone()),
                    _ => None,
                }
            }

            fn into_component(
                holder: $crate::reference::ReferenceHolder<Self>,
            ) -> Option<$crate::workspace::Component> {
                Some($crate::workspace::Component::$ty(holder))
            }

            fn apply_overrides(&mut self, reference: &$crate::reference::Reference) {
                let $target = self;
                let $reference = reference;
                $overrides
            }
        }
    };
}

pub(crate) use referenceable_component;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Schema, SchemaOrReference};

    #[test]
    fn test_reference_requires_id() {
        assert!(Reference::new("Pet", ReferenceType::Schema).is_ok());
        assert!(matches!(
            Reference::new("", ReferenceType::Schema),
            Err(OpenApiError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_parse_component_reference() {
        let reference =
            Reference::parse("#/components/schemas/Pet", ReferenceType::Schema, OpenApiSpecVersion::V3_0)
                .unwrap();
        assert_eq!(reference.id, "Pet");
        assert_eq!(reference.external_resource, None);
        assert_eq!(reference.reference_v3(), "#/components/schemas/Pet");
        assert_eq!(reference.reference_v2(), "#/definitions/Pet");
    }

    #[test]
    fn test_parse_nested_schema_reference() {
        let reference = Reference::parse(
            "#/components/schemas/Person/properties/address",
            ReferenceType::Schema,
            OpenApiSpecVersion::V3_1,
        )
        .unwrap();
        assert_eq!(reference.id, "#/components/schemas/Person/properties/address");
        assert!(reference.is_fragment());
        assert_eq!(
            reference.reference_v2(),
            "#/definitions/Person/properties/address"
        );
    }

    #[test]
    fn test_parse_v2_references() {
        let reference =
            Reference::parse("#/definitions/Pet", ReferenceType::Schema, OpenApiSpecVersion::V2_0)
                .unwrap();
        assert_eq!(reference.id, "Pet");

        let reference = Reference::parse(
            "#/definitions/Pet/properties/name",
            ReferenceType::Schema,
            OpenApiSpecVersion::V2_0,
        )
        .unwrap();
        assert_eq!(reference.id, "#/components/schemas/Pet/properties/name");

        let reference =
            Reference::parse("#/parameters/limit", ReferenceType::Parameter, OpenApiSpecVersion::V2_0)
                .unwrap();
        assert_eq!(reference.reference_v3(), "#/components/parameters/limit");
    }

    #[test]
    fn test_parse_external_references() {
        let reference = Reference::parse(
            "common.yaml#/components/schemas/Error",
            ReferenceType::Schema,
            OpenApiSpecVersion::V3_0,
        )
        .unwrap();
        assert_eq!(reference.id, "Error");
        assert_eq!(reference.external_resource.as_deref(), Some("common.yaml"));
        assert_eq!(
            reference.reference_v3(),
            "common.yaml#/components/schemas/Error"
        );

        let reference =
            Reference::parse("pet.json", ReferenceType::Schema, OpenApiSpecVersion::V3_0).unwrap();
        assert_eq!(reference.id, "pet.json");
        assert_eq!(reference.reference_v3(), "pet.json");
    }

    #[test]
    fn test_parse_rejects_malformed_references() {
        for raw in ["", "   ", "#", "#Pet", "#/components/schemas/"] {
            assert!(
                matches!(
                    Reference::parse(raw, ReferenceType::Schema, OpenApiSpecVersion::V3_0),
                    Err(OpenApiError::ReferenceFormat { .. })
                ),
                "expected format error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_equality_ignores_host_document() {
        let a = Reference::schema("Pet").unwrap();
        let b = a.clone().with_description("A pet");
        assert_ne!(a, b);
        assert_eq!(a, Reference::schema("Pet").unwrap());
    }

    #[test]
    fn test_serialize_reference_and_tag() {
        let reference = Reference::schema("Pet").unwrap().with_summary("pet");
        assert_eq!(
            serde_json::to_value(&reference).unwrap(),
            serde_json::json!({"$ref": "#/components/schemas/Pet", "summary": "pet"})
        );

        let tag = Reference::tag("pets").unwrap();
        assert_eq!(serde_json::to_value(&tag).unwrap(), serde_json::json!("pets"));
    }

    #[test]
    fn test_unhosted_reference_has_no_target() {
        let holder = SchemaOrReference::from_reference(Reference::schema("Pet").unwrap());
        assert!(holder.is_reference());
        assert!(holder.target().is_none());
        assert!(holder.copy_reference_as_target_element_with_overrides().is_none());
        assert!(holder.as_reference().unwrap().location().is_none());
    }

    #[test]
    fn test_shallow_copy_shares_identity() {
        let holder = SchemaOrReference::from_reference(Reference::schema("Pet").unwrap());
        let copy = holder.create_shallow_copy();
        assert_eq!(holder.identity(), copy.identity());

        let inline = SchemaOrReference::inline(Schema::string());
        assert_eq!(inline.identity(), inline.create_shallow_copy().identity());
        assert_ne!(inline.identity(), SchemaOrReference::inline(Schema::string()).identity());
    }

    #[test]
    fn test_make_inline_mut_copies_on_write() {
        let mut holder = SchemaOrReference::inline(Schema::string());
        let shared = holder.create_shallow_copy();
        holder.make_inline_mut().unwrap().title = Some("changed".to_string());

        assert_eq!(holder.target().unwrap().title.as_deref(), Some("changed"));
        assert_eq!(shared.target().unwrap().title, None);
    }
}
