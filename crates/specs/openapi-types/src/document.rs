//! OpenAPI Document - the root object of an API description.

use crate::host_document::ReferenceHostDocumentSetter;
use crate::location::synthetic_base_url;
use crate::version::OpenApiSpecVersion;
use crate::workspace::Workspace;
use crate::{
    Components, Extensions, ExternalDocumentation, Info, PathItemOrReference, Paths,
    SecurityRequirement, Server, Tag, UnrecognizedFields,
};
use bon::Builder;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// This is the root object of the OpenAPI document.
///
/// Besides the serialized fields, a document carries the base URI its
/// component locations are built from and the [`Workspace`] its references
/// resolve through. Neither is serialized.
#[derive(Debug, Clone, Serialize, Builder)]
pub struct OpenApiDocument {
    /// Base location of this document; component locations hang off it
    #[serde(skip)]
    #[builder(default = synthetic_base_url())]
    pub base_uri: Url,

    /// Registry references in this document resolve through
    #[serde(skip)]
    #[builder(default = Arc::new(Workspace::new()))]
    pub workspace: Arc<Workspace>,

    /// Version the document was read from
    #[serde(skip)]
    pub spec_version: Option<OpenApiSpecVersion>,

    /// Declared OpenAPI version string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,

    /// Provides metadata about the API. REQUIRED.
    pub info: Info,

    /// Default JSON Schema dialect for schemas in this document (3.1)
    #[serde(rename = "jsonSchemaDialect", skip_serializing_if = "Option::is_none")]
    pub json_schema_dialect: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub servers: Vec<Server>,

    /// The available paths and operations for the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Paths>,

    /// Incoming webhooks the API consumer may receive (3.1)
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub webhooks: IndexMap<String, PathItemOrReference>,

    /// An element to hold various reusable objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub security: Vec<SecurityRequirement>,

    /// Tags used by the document, referenced by name from operations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub tags: Vec<Tag>,

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

impl Default for OpenApiDocument {
    fn default() -> Self {
        Self {
            base_uri: synthetic_base_url(),
            workspace: Arc::new(Workspace::new()),
            spec_version: None,
            openapi: None,
            info: Info::default(),
            json_schema_dialect: None,
            servers: Vec::new(),
            paths: None,
            webhooks: IndexMap::new(),
            components: None,
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
            extensions: Extensions::new(),
            unrecognized_fields: UnrecognizedFields::new(),
        }
    }
}

impl OpenApiDocument {
    /// Create a new document with the given info
    pub fn new(info: Info) -> Self {
        Self {
            info,
            ..Self::default()
        }
    }

    /// Resolve references through `workspace` instead of a private one
    pub fn with_workspace(mut self, workspace: Arc<Workspace>) -> Self {
        self.workspace = workspace;
        self
    }

    pub fn with_base_uri(mut self, base_uri: Url) -> Self {
        self.base_uri = base_uri;
        self
    }

    pub fn with_paths(mut self, paths: Paths) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn with_components(mut self, components: Components) -> Self {
        self.components = Some(components);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    /// The base URI with any fragment removed
    pub fn base_location(&self) -> String {
        let mut base = self.base_uri.clone();
        base.set_fragment(None);
        base.into()
    }

    /// Share the document, register its components in its workspace and
    /// point every reference in it back at it.
    ///
    /// References resolve only after this (or the equivalent reader
    /// settings) has run.
    pub fn into_shared(self) -> Arc<Self> {
        let document = Arc::new(self);
        document.workspace.register_components(&document);
        document.set_reference_host_document();
        document
    }

    /// Set the host document of every reference not yet bound to one.
    ///
    /// Returns how many references were bound by this call; a second run
    /// binds none.
    pub fn set_reference_host_document(self: &Arc<Self>) -> usize {
        ReferenceHostDocumentSetter::new(Arc::clone(self)).run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reference, Schema, SchemaOrReference};
    use serde_json::json;

    #[test]
    fn test_document_serialization_skips_runtime_state() {
        let document = OpenApiDocument::builder()
            .openapi("3.1.0".to_string())
            .info(Info::new("Pets", "1.0.0"))
            .build();

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({"openapi": "3.1.0", "info": {"title": "Pets", "version": "1.0.0"}})
        );
        assert!(document.base_uri.as_str().starts_with("https://openapi.net/"));
    }

    #[test]
    fn test_base_location_drops_fragment() {
        let document = OpenApiDocument::default()
            .with_base_uri(Url::parse("https://example.com/api.json#/info").unwrap());
        assert_eq!(document.base_location(), "https://example.com/api.json");
    }

    #[test]
    fn test_into_shared_binds_references() {
        let document = OpenApiDocument::new(Info::new("Pets", "1.0.0")).with_components(
            Components::new()
                .with_schema("Pet", Schema::object().with_title("Pet"))
                .with_schema(
                    "Pets",
                    Schema::array(SchemaOrReference::from_reference(
                        Reference::schema("Pet").unwrap(),
                    )),
                ),
        );
        let document = document.into_shared();

        let pets = document.components.as_ref().unwrap().get_schema("Pets").unwrap();
        let items = pets.items().unwrap();
        assert_eq!(items.title().as_deref(), Some("Pet"));
        assert_eq!(document.set_reference_host_document(), 0);
    }
}
