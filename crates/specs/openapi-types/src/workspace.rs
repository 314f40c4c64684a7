//! Workspace: the registry references resolve through.
//!
//! A [`Workspace`] maps absolute component locations to the components
//! registered under them, for one or more documents. Lookups normalize the
//! given location against the workspace base URL; a workspace created with
//! [`Workspace::unanchored`] resolves nothing.
//!
//! Registration is first-write-wins: a second registration at an occupied
//! location is skipped and reported as `false`.
//!
//! ```rust
//! use openapi_types::{Components, Info, OpenApiDocument, Schema, Workspace};
//!
//! let document = OpenApiDocument::new(Info::new("Pets", "1.0.0"))
//!     .with_components(Components::new().with_schema("Pet", Schema::object()));
//! let workspace = Workspace::new();
//! assert_eq!(workspace.register_components(&document), 1);
//!
//! let location = format!("{}#/components/schemas/Pet", document.base_location());
//! assert!(workspace.contains(&location));
//! ```

use crate::error::{OpenApiError, OpenApiResult, check_argument_not_empty};
use crate::location::{self, SCHEMA_COMPONENTS_SEGMENT, default_registry_url, unescape_pointer_segment};
use crate::reference::{Reference, ReferenceHolder, ReferenceType, Referenceable};
use crate::{
    CallbackOrReference, ExampleOrReference, HeaderOrReference, LinkOrReference, OpenApiDocument,
    ParameterOrReference, PathItemOrReference, RequestBodyOrReference, ResponseOrReference, Schema,
    SchemaOrReference, SecuritySchemeOrReference,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

/// A component registered in a [`Workspace`].
#[derive(Debug, Clone)]
pub enum Component {
    Schema(SchemaOrReference),
    Response(ResponseOrReference),
    Parameter(ParameterOrReference),
    Example(ExampleOrReference),
    RequestBody(RequestBodyOrReference),
    Header(HeaderOrReference),
    SecurityScheme(SecuritySchemeOrReference),
    Link(LinkOrReference),
    Callback(CallbackOrReference),
    PathItem(PathItemOrReference),
}

impl Component {
    pub fn reference_type(&self) -> ReferenceType {
        match self {
            Self::Schema(_) => ReferenceType::Schema,
            Self::Response(_) => ReferenceType::Response,
            Self::Parameter(_) => ReferenceType::Parameter,
            Self::Example(_) => ReferenceType::Example,
            Self::RequestBody(_) => ReferenceType::RequestBody,
            Self::Header(_) => ReferenceType::Header,
            Self::SecurityScheme(_) => ReferenceType::SecurityScheme,
            Self::Link(_) => ReferenceType::Link,
            Self::Callback(_) => ReferenceType::Callback,
            Self::PathItem(_) => ReferenceType::PathItem,
        }
    }
}

/// Registry of components, documents and artifacts keyed by absolute location.
#[derive(Debug)]
pub struct Workspace {
    base_url: Option<Url>,
    document_ids: DashMap<String, Url>,
    referenceables: DashMap<String, Component>,
    artifacts: DashMap<String, Arc<[u8]>>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A workspace anchored at the default in-memory registry URL
    pub fn new() -> Self {
        Self::with_base_url(default_registry_url())
    }

    /// A workspace that normalizes relative locations against `base_url`
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
            document_ids: DashMap::new(),
            referenceables: DashMap::new(),
            artifacts: DashMap::new(),
        }
    }

    /// A workspace without a base URL; every lookup is absent
    pub fn unanchored() -> Self {
        Self {
            base_url: None,
            document_ids: DashMap::new(),
            referenceables: DashMap::new(),
            artifacts: DashMap::new(),
        }
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    fn normalize(&self, location: &str) -> Option<String> {
        let Some(base_url) = &self.base_url else {
            debug!("Workspace has no base URL, cannot resolve {}", location);
            return None;
        };
        location::to_location_url(base_url, location).map(String::from)
    }

    /// Register every named component of `document` under its location.
    ///
    /// Schemas carrying an `$id` are registered under that id instead.
    /// Returns how many components were newly registered.
    pub fn register_components(&self, document: &OpenApiDocument) -> usize {
        let Some(components) = &document.components else {
            return 0;
        };
        let base = document.base_location();

        let mut registered = 0;
        for (key, schema) in &components.schemas {
            let location = match schema.as_inline().and_then(|s| s.id.clone()) {
                Some(id) => id,
                None => location::component_location(&base, "schemas", key),
            };
            if self.register_component(&location, Component::Schema(schema.clone())) {
                registered += 1;
            }
        }
        registered += self.register_bucket(&base, &components.responses);
        registered += self.register_bucket(&base, &components.parameters);
        registered += self.register_bucket(&base, &components.examples);
        registered += self.register_bucket(&base, &components.request_bodies);
        registered += self.register_bucket(&base, &components.headers);
        registered += self.register_bucket(&base, &components.security_schemes);
        registered += self.register_bucket(&base, &components.links);
        registered += self.register_bucket(&base, &components.callbacks);
        registered += self.register_bucket(&base, &components.path_items);

        debug!(
            "Registered {} components from {}",
            registered, document.base_uri
        );
        registered
    }

    fn register_bucket<T: Referenceable>(
        &self,
        base: &str,
        bucket: &IndexMap<String, ReferenceHolder<T>>,
    ) -> usize {
        bucket
            .iter()
            .filter(|(key, holder)| {
                let Some(component) = T::into_component((*holder).clone()) else {
                    return false;
                };
                let location =
                    location::component_location(base, T::REFERENCE_TYPE.display_name(), key);
                self.register_component(&location, component)
            })
            .count()
    }

    /// Register a single component of `document` under `id` in the bucket
    /// its kind belongs to.
    pub fn register_component_for_document<T: Referenceable>(
        &self,
        document: &OpenApiDocument,
        component: ReferenceHolder<T>,
        id: &str,
    ) -> OpenApiResult<bool> {
        check_argument_not_empty("id", id)?;
        let Some(component) = T::into_component(component) else {
            return Err(OpenApiError::invalid_component_type(
                T::REFERENCE_TYPE.display_name(),
            ));
        };
        let location = location::component_location(
            &document.base_location(),
            T::REFERENCE_TYPE.display_name(),
            id,
        );
        Ok(self.register_component(&location, component))
    }

    /// Register `component` at `location`; `false` if the location is taken
    /// or cannot be normalized.
    pub fn register_component(&self, location: &str, component: Component) -> bool {
        let Some(key) = self.normalize(location) else {
            return false;
        };
        match self.referenceables.entry(key) {
            Entry::Occupied(entry) => {
                debug!("Component already registered at {}, skipping", entry.key());
                false
            }
            Entry::Vacant(entry) => {
                trace!(
                    "Registered {:?} component at {}",
                    component.reference_type(),
                    entry.key()
                );
                entry.insert(component);
                true
            }
        }
    }

    /// Register an opaque resource; first-write-wins like components
    pub fn register_artifact(&self, location: &str, artifact: impl Into<Arc<[u8]>>) -> bool {
        let Some(key) = self.normalize(location) else {
            return false;
        };
        match self.artifacts.entry(key) {
            Entry::Occupied(entry) => {
                debug!("Artifact already registered at {}, skipping", entry.key());
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(artifact.into());
                true
            }
        }
    }

    pub fn resolve_artifact(&self, location: &str) -> Option<Arc<[u8]>> {
        let key = self.normalize(location)?;
        self.artifacts.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    /// Map a short document key (as written in external references) to the
    /// document's location. Empty or already-mapped keys are ignored.
    pub fn add_document_id(&self, key: &str, location: Url) -> bool {
        if key.trim().is_empty() {
            return false;
        }
        match self.document_ids.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(location);
                true
            }
        }
    }

    pub fn document_id(&self, key: &str) -> Option<Url> {
        self.document_ids.get(key).map(|entry| entry.value().clone())
    }

    /// Whether a component or artifact is registered at `location`
    pub fn contains(&self, location: &str) -> bool {
        self.normalize(location).is_some_and(|key| {
            self.referenceables.contains_key(&key) || self.artifacts.contains_key(&key)
        })
    }

    /// Number of registered components and artifacts
    pub fn components_count(&self) -> usize {
        self.referenceables.len() + self.artifacts.len()
    }

    /// The component registered at `location`, if it is a `T`.
    pub fn resolve_reference<T: Referenceable>(&self, location: &str) -> Option<ReferenceHolder<T>> {
        let key = self.normalize(location)?;
        let component = self.referenceables.get(&key)?;
        T::from_component(component.value())
    }

    /// Resolve a location pointing inside a registered schema, such as
    /// `#/components/schemas/Person/properties/address`.
    ///
    /// The walk descends through `properties/<name>`, `items`,
    /// `additionalProperties` and `allOf|anyOf|oneOf/<index>`. Any other
    /// segment, an out-of-range index or a missing property yields `Ok(None)`.
    ///
    /// `parent` is the schema the reference was found in; descending back
    /// through it, or through any schema already on the walk, is a
    /// [`OpenApiError::CircularReference`]. A location whose last segment
    /// refers back to such a schema resolves to that reference.
    pub fn resolve_json_schema_reference(
        &self,
        location: &str,
        parent: Option<&SchemaOrReference>,
    ) -> OpenApiResult<Option<SchemaOrReference>> {
        let mut visited = Vec::new();
        if let Some(parent) = parent.and_then(|parent| parent.target()) {
            visited.push(Arc::as_ptr(&parent) as usize);
        }
        self.walk_schema_location(location, &mut visited)
    }

    fn walk_schema_location(
        &self,
        location: &str,
        visited: &mut Vec<usize>,
    ) -> OpenApiResult<Option<SchemaOrReference>> {
        let Some(start) = location.find(SCHEMA_COMPONENTS_SEGMENT) else {
            return Err(OpenApiError::reference_format(
                "location does not point into component schemas",
                location,
            ));
        };
        let document = &location[..start];
        let segments = location::fragment_segments(&location[start..]);
        let [_, _, root_name, rest @ ..] = segments.as_slice() else {
            return Ok(None);
        };

        let root_location = location::component_location(
            document,
            ReferenceType::Schema.display_name(),
            &unescape_pointer_segment(root_name),
        );
        let Some(root) = self.resolve_reference::<Schema>(&root_location) else {
            return Ok(None);
        };
        self.descend(root, rest, visited, location)
    }

    fn descend(
        &self,
        holder: SchemaOrReference,
        segments: &[&str],
        visited: &mut Vec<usize>,
        location: &str,
    ) -> OpenApiResult<Option<SchemaOrReference>> {
        // The last segment names the holder itself, even when it points
        // back at a schema on the walk.
        let Some((segment, rest)) = segments.split_first() else {
            return Ok(Some(holder));
        };
        let Some(schema) = self.schema_target(&holder, visited, location)? else {
            return Ok(None);
        };
        let identity = Arc::as_ptr(&schema) as usize;
        if visited.contains(&identity) {
            return Err(OpenApiError::circular_reference(location));
        }
        visited.push(identity);

        let next = match *segment {
            "properties" => rest.split_first().and_then(|(name, rest)| {
                let name = unescape_pointer_segment(name);
                schema
                    .properties
                    .get(name.as_ref())
                    .map(|child| (child.clone(), rest))
            }),
            "items" => schema.items.clone().map(|child| (child, rest)),
            "additionalProperties" => schema.additional_properties.clone().map(|child| (child, rest)),
            "allOf" | "anyOf" | "oneOf" => {
                let list = match *segment {
                    "allOf" => &schema.all_of,
                    "anyOf" => &schema.any_of,
                    _ => &schema.one_of,
                };
                rest.split_first().and_then(|(index, rest)| {
                    let index = index.parse::<usize>().ok()?;
                    list.get(index).map(|child| (child.clone(), rest))
                })
            }
            _ => None,
        };

        match next {
            Some((child, rest)) => self.descend(child, rest, visited, location),
            None => Ok(None),
        }
    }

    /// The concrete schema behind `holder`, following references.
    ///
    /// Nested fragment references walk with the same visited stack, so a
    /// fragment that leads back onto the current path is caught.
    fn schema_target(
        &self,
        holder: &SchemaOrReference,
        visited: &mut Vec<usize>,
        location: &str,
    ) -> OpenApiResult<Option<Arc<Schema>>> {
        let mut current = holder.clone();
        let mut chain: Vec<usize> = Vec::new();
        loop {
            let reference = match current {
                ReferenceHolder::Inline(schema) => return Ok(Some(schema)),
                ReferenceHolder::Reference(reference) => reference,
            };
            let identity = Arc::as_ptr(&reference) as usize;
            if chain.contains(&identity) {
                return Err(OpenApiError::circular_reference(location));
            }
            chain.push(identity);

            let Some(next) = self.follow(&reference, visited)? else {
                return Ok(None);
            };
            current = next;
        }
    }

    fn follow(
        &self,
        reference: &Reference,
        visited: &mut Vec<usize>,
    ) -> OpenApiResult<Option<SchemaOrReference>> {
        let Some(target_location) = reference.location() else {
            return Ok(None);
        };
        if !reference.is_fragment() {
            return Ok(self.resolve_reference::<Schema>(&target_location));
        }
        let mark = visited.len();
        let found = self.walk_schema_location(&target_location, visited);
        visited.truncate(mark);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Components, Info, Parameter, ParameterLocation, Tag};

    fn document(components: Components) -> OpenApiDocument {
        OpenApiDocument::new(Info::new("Test", "1.0.0")).with_components(components)
    }

    fn schema_location(document: &OpenApiDocument, fragment: &str) -> String {
        format!("{}{}{}", document.base_location(), SCHEMA_COMPONENTS_SEGMENT, fragment)
    }

    #[test]
    fn test_register_and_resolve() {
        let document = document(Components::new().with_schema("Pet", Schema::object()));
        let workspace = Workspace::new();
        assert_eq!(workspace.register_components(&document), 1);

        let location = schema_location(&document, "Pet");
        assert!(workspace.contains(&location));
        assert!(workspace.resolve_reference::<Schema>(&location).is_some());
        assert!(workspace.resolve_reference::<Parameter>(&location).is_none());
        assert_eq!(workspace.components_count(), 1);
    }

    #[test]
    fn test_first_write_wins() {
        let workspace = Workspace::new();
        let location = "https://example.com/api#/components/schemas/Pet";
        let first = SchemaOrReference::inline(Schema::object().with_title("first"));
        let second = SchemaOrReference::inline(Schema::object().with_title("second"));

        assert!(workspace.register_component(location, Component::Schema(first)));
        assert!(!workspace.register_component(location, Component::Schema(second)));

        let resolved = workspace.resolve_reference::<Schema>(location).unwrap();
        assert_eq!(resolved.title().as_deref(), Some("first"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let document = document(Components::new().with_schema("Pet", Schema::object()));
        let workspace = Workspace::new();
        workspace.register_components(&document);

        assert!(workspace.contains(&schema_location(&document, "Pet")));
        assert!(!workspace.contains(&schema_location(&document, "pet")));
    }

    #[test]
    fn test_unanchored_workspace_resolves_nothing() {
        let workspace = Workspace::unanchored();
        let location = "https://example.com/api#/components/schemas/Pet";
        assert!(!workspace.register_component(
            location,
            Component::Schema(SchemaOrReference::inline(Schema::object()))
        ));
        assert!(!workspace.contains(location));
        assert!(workspace.resolve_reference::<Schema>(location).is_none());
    }

    #[test]
    fn test_register_component_for_document() {
        let document = document(Components::new());
        let workspace = Workspace::new();

        let parameter = ParameterOrReference::inline(Parameter::new("limit", ParameterLocation::Query));
        assert!(workspace
            .register_component_for_document(&document, parameter.clone(), "limit")
            .unwrap());
        let location = format!("{}#/components/parameters/limit", document.base_location());
        assert!(workspace.resolve_reference::<Parameter>(&location).is_some());

        assert!(matches!(
            workspace.register_component_for_document(&document, parameter, ""),
            Err(OpenApiError::InvalidArgument { .. })
        ));
        assert!(matches!(
            workspace.register_component_for_document(
                &document,
                ReferenceHolder::inline(Tag::new("pets")),
                "pets"
            ),
            Err(OpenApiError::InvalidComponentType { .. })
        ));
    }

    #[test]
    fn test_schema_with_id_registers_under_id() {
        let mut schema = Schema::object();
        schema.id = Some("https://example.com/schemas/pet".to_string());
        let document = document(Components::new().with_schema("Pet", schema));
        let workspace = Workspace::new();
        workspace.register_components(&document);

        assert!(workspace.contains("https://example.com/schemas/pet"));
        assert!(!workspace.contains(&schema_location(&document, "Pet")));
    }

    #[test]
    fn test_nested_schema_resolution() {
        let address = SchemaOrReference::inline(Schema::object().with_title("Address"));
        let base = SchemaOrReference::inline(Schema::object().with_title("Base"));
        let person = Schema::object()
            .with_property("address", address.clone())
            .with_all_of(base.clone());
        let document = document(Components::new().with_schema("Person", person));
        let workspace = Workspace::new();
        workspace.register_components(&document);

        let found = workspace
            .resolve_json_schema_reference(
                &schema_location(&document, "Person/properties/address"),
                None,
            )
            .unwrap()
            .unwrap();
        assert_eq!(found.identity(), address.identity());

        let found = workspace
            .resolve_json_schema_reference(&schema_location(&document, "Person/allOf/0"), None)
            .unwrap()
            .unwrap();
        assert_eq!(found.identity(), base.identity());

        for fragment in [
            "Person/allOf/1",
            "Person/allOf/x",
            "Person/properties/missing",
            "Person/unknown",
            "Missing/items",
        ] {
            assert!(
                workspace
                    .resolve_json_schema_reference(&schema_location(&document, fragment), None)
                    .unwrap()
                    .is_none(),
                "expected no schema at {fragment}"
            );
        }
    }

    #[test]
    fn test_nested_resolution_requires_schema_segment() {
        let workspace = Workspace::new();
        assert!(matches!(
            workspace.resolve_json_schema_reference("#/components/parameters/limit", None),
            Err(OpenApiError::ReferenceFormat { .. })
        ));
    }

    #[test]
    fn test_parent_schema_is_on_the_stack() {
        let person = SchemaOrReference::inline(
            Schema::object().with_property("name", Schema::string()),
        );
        let document = document(Components::new().with_schema("Person", person.clone()));
        let workspace = Workspace::new();
        workspace.register_components(&document);

        let location = schema_location(&document, "Person/properties/name");
        assert!(matches!(
            workspace.resolve_json_schema_reference(&location, Some(&person)),
            Err(OpenApiError::CircularReference { .. })
        ));
    }

    #[test]
    fn test_artifacts_and_document_ids() {
        let workspace = Workspace::new();
        let location = "https://example.com/files/logo.png";

        assert!(workspace.register_artifact(location, b"png".to_vec()));
        assert!(!workspace.register_artifact(location, b"other".to_vec()));
        assert_eq!(workspace.resolve_artifact(location).as_deref(), Some(&b"png"[..]));
        assert!(workspace.contains(location));
        assert_eq!(workspace.components_count(), 1);

        let pets: Url = "https://example.com/pets.yaml".parse().unwrap();
        assert!(workspace.add_document_id("pets", pets.clone()));
        assert!(!workspace.add_document_id("pets", "https://example.com/other.yaml".parse().unwrap()));
        assert!(!workspace.add_document_id("  ", pets.clone()));
        assert_eq!(workspace.document_id("pets"), Some(pets));
        assert_eq!(workspace.document_id("Pets"), None);
    }
}
