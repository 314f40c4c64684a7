//! Reading JSON or YAML text into the document model.
//!
//! The declared version (`swagger: "2.0"`, `openapi: 3.0.x` or `3.1.x`)
//! selects a set of field tables; each version's tables read into the same
//! model, with Swagger 2.0 constructs upgraded on the way in. After parsing,
//! the reader registers the document's components in its workspace and binds
//! every reference to the document, so references resolve straight away.
//!
//! ```rust
//! use openapi_types::reader::OpenApiReader;
//!
//! let input = r#"
//! openapi: 3.0.3
//! info:
//!   title: Pets
//!   version: 1.0.0
//! paths: {}
//! components:
//!   schemas:
//!     Pet:
//!       type: object
//!     Pets:
//!       type: array
//!       items:
//!         $ref: '#/components/schemas/Pet'
//! "#;
//!
//! let read = OpenApiReader::default().read_str(input).unwrap();
//! assert!(!read.diagnostic.has_errors());
//! let pets = read.document.components.as_ref().unwrap().get_schema("Pets").unwrap();
//! assert!(pets.items().unwrap().target().is_some());
//! ```

/// Fixed-field handler assigning the parsed value to `target.$field`
macro_rules! set_field {
    ($field:ident, $parse:expr) => {
        |target, node, context| {
            target.$field = $parse(node, context)?;
            Ok(())
        }
    };
}

/// Fixed-field handler wrapping the loaded element in `Some`
macro_rules! set_some {
    ($field:ident, $load:expr) => {
        |target, node, context| {
            target.$field = Some($load(node, context)?);
            Ok(())
        }
    };
}

/// Fixed-field handler for a plain `bool` field
macro_rules! set_flag {
    ($field:ident) => {
        |target, node, context| {
            target.$field = $crate::reader::field_map::boolean(node, context)?.unwrap_or_default();
            Ok(())
        }
    };
}

/// Fixed-field handler keeping the raw value
macro_rules! set_any {
    ($field:ident) => {
        |target, node, _context| {
            target.$field = Some(node.value().clone());
            Ok(())
        }
    };
}

mod any;
mod context;
mod field_map;
mod parse_node;
mod v2;
mod v3;
mod v31;

pub use any::coerce_any;
pub use context::ParsingContext;
pub use field_map::{FixedFieldMap, PatternFieldMap};
pub use parse_node::ParseNode;

use crate::error::{OpenApiError, OpenApiResult};
use crate::reference::{Reference, ReferenceHolder, Referenceable};
use crate::{
    OpenApiDiagnostic, OpenApiDocument, OpenApiSpecVersion, Schema, SchemaOrReference, Workspace,
};
use bon::Builder;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Text syntax of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// JSON when the first non-blank character opens an object or array
    pub fn detect(input: &str) -> Self {
        match input.trim_start().chars().next() {
            Some('{') | Some('[') => Self::Json,
            _ => Self::Yaml,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Options for one [`OpenApiReader`].
#[derive(Debug, Clone, PartialEq, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    /// Fail on the first structural error instead of collecting them
    #[serde(default)]
    #[builder(default)]
    pub strict: bool,

    /// Location the document is read from; a synthetic one otherwise
    #[serde(default)]
    pub base_url: Option<Url>,

    /// Register components in the workspace after parsing
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub register_components: bool,

    /// Bind every reference to the new document after parsing
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub set_host_document: bool,

    /// Input syntax; detected from the text when unset
    #[serde(default)]
    pub format: Option<InputFormat>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A parsed document and what the reader noticed along the way.
#[derive(Debug, Clone)]
pub struct ReadResult {
    pub document: Arc<OpenApiDocument>,
    pub diagnostic: OpenApiDiagnostic,
}

/// Reads documents of any supported version into a shared workspace.
#[derive(Debug, Clone)]
pub struct OpenApiReader {
    settings: ReaderSettings,
    workspace: Arc<Workspace>,
}

impl Default for OpenApiReader {
    fn default() -> Self {
        Self::new(ReaderSettings::default())
    }
}

impl OpenApiReader {
    /// A reader with its own workspace
    pub fn new(settings: ReaderSettings) -> Self {
        let workspace = match &settings.base_url {
            Some(base) => Workspace::with_base_url(base.clone()),
            None => Workspace::new(),
        };
        Self {
            settings,
            workspace: Arc::new(workspace),
        }
    }

    /// Read into `workspace`, shared with other readers or documents
    pub fn with_workspace(mut self, workspace: Arc<Workspace>) -> Self {
        self.workspace = workspace;
        self
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    /// Parse `input` and build the document.
    ///
    /// Fails on unparseable text, an undeclared or unsupported version, a
    /// malformed `$ref`, and in strict mode on the first structural error.
    pub fn read_str(&self, input: &str) -> OpenApiResult<ReadResult> {
        let format = self
            .settings
            .format
            .unwrap_or_else(|| InputFormat::detect(input));
        let root = match format {
            InputFormat::Json => serde_json::from_str::<Value>(input)?,
            InputFormat::Yaml => yaml_to_json(serde_yaml::from_str(input)?)?,
        };
        self.read_value(&root)
    }

    /// Build the document from an already parsed tree
    pub fn read_value(&self, root: &Value) -> OpenApiResult<ReadResult> {
        let version = OpenApiSpecVersion::detect(root)?;
        debug!("Reading OpenAPI {} document", version);

        let mut context = ParsingContext::new(version, self.settings.strict);
        let node = ParseNode::root(root);
        let mut document = match version {
            OpenApiSpecVersion::V2_0 => v2::load_document(&node, &mut context)?,
            OpenApiSpecVersion::V3_0 => v3::load_document(&node, &mut context)?,
            OpenApiSpecVersion::V3_1 => v31::load_document(&node, &mut context)?,
        };
        document.spec_version = Some(version);
        document.workspace = Arc::clone(&self.workspace);
        if let Some(base) = &self.settings.base_url {
            document.base_uri = base.clone();
        }

        let document = Arc::new(document);
        if self.settings.register_components {
            self.workspace.register_components(&document);
        }
        if self.settings.set_host_document {
            document.set_reference_host_document();
        }

        let diagnostic = context.into_diagnostic();
        info!(
            "Read OpenAPI {} document with {} errors and {} warnings",
            version,
            diagnostic.errors.len(),
            diagnostic.warnings.len()
        );
        Ok(ReadResult {
            document,
            diagnostic,
        })
    }
}

/// Convert a YAML tree to JSON; non-string keys are rendered as strings
fn yaml_to_json(value: serde_yaml::Value) -> OpenApiResult<Value> {
    use serde_yaml::Value as Yaml;

    let converted = match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<OpenApiResult<_>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Null => "null".to_string(),
                    other => {
                        return Err(OpenApiError::Yaml {
                            message: format!("Unsupported mapping key: {other:?}"),
                        });
                    }
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    };
    Ok(converted)
}

/// Read an element or a `$ref` to one.
///
/// A malformed `$ref` is fatal regardless of strictness. In 3.1 the
/// reference's `summary` and `description` siblings become overrides.
pub(crate) fn load_holder<T: Referenceable>(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
    load: fn(&ParseNode<'_>, &mut ParsingContext) -> OpenApiResult<T>,
) -> OpenApiResult<ReferenceHolder<T>> {
    let Some(raw) = node.reference() else {
        return load(node, context).map(ReferenceHolder::inline);
    };
    let mut reference = Reference::parse(raw, T::REFERENCE_TYPE, context.version())?;
    if context.version() == OpenApiSpecVersion::V3_1 {
        reference.summary = node.get("summary").and_then(|n| n.as_string());
        reference.description = node.get("description").and_then(|n| n.as_string());
    }
    Ok(ReferenceHolder::from_reference(reference))
}

/// Read a schema with the tables of the document's version
pub(crate) fn load_schema(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Schema> {
    match context.version() {
        OpenApiSpecVersion::V2_0 => v2::load_schema(node, context),
        OpenApiSpecVersion::V3_0 => v3::load_schema(node, context),
        OpenApiSpecVersion::V3_1 => v31::load_schema(node, context),
    }
}

pub(crate) fn load_schema_holder(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<SchemaOrReference> {
    load_holder(node, context, load_schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_format() {
        assert_eq!(InputFormat::detect("  {\"openapi\": \"3.0.0\"}"), InputFormat::Json);
        assert_eq!(InputFormat::detect("openapi: 3.0.0"), InputFormat::Yaml);
    }

    #[test]
    fn test_settings_from_json() {
        let settings: ReaderSettings = serde_json::from_value(json!({
            "strict": true,
            "baseUrl": "https://example.com/api/openapi.yaml"
        }))
        .unwrap();
        assert!(settings.strict);
        assert!(settings.register_components);
        assert!(settings.set_host_document);
        assert_eq!(
            settings.base_url.unwrap().as_str(),
            "https://example.com/api/openapi.yaml"
        );
        assert_eq!(ReaderSettings::default().format, None);
    }

    #[test]
    fn test_yaml_keys_become_strings() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("responses:\n  200:\n    description: ok\n").unwrap();
        assert_eq!(
            yaml_to_json(yaml).unwrap(),
            json!({"responses": {"200": {"description": "ok"}}})
        );
    }

    #[test]
    fn test_unsupported_version_is_fatal() {
        let err = OpenApiReader::default()
            .read_str(r#"{"openapi": "4.0.0", "info": {}}"#)
            .unwrap_err();
        assert!(matches!(err, OpenApiError::UnsupportedVersion { .. }));

        let err = OpenApiReader::default().read_str("info: {}").unwrap_err();
        assert!(matches!(err, OpenApiError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_malformed_input_is_fatal() {
        let err = OpenApiReader::default().read_str("{ not json").unwrap_err();
        assert!(matches!(err, OpenApiError::Json { .. }));
    }

    #[test]
    fn test_malformed_reference_is_fatal() {
        let input = json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "components": {"schemas": {"A": {"$ref": "#/components"}}}
        });
        let err = OpenApiReader::default().read_value(&input).unwrap_err();
        assert!(matches!(err, OpenApiError::ReferenceFormat { .. }));
    }

    #[test]
    fn test_reader_shares_workspace() {
        let workspace = Arc::new(Workspace::new());
        let reader = OpenApiReader::default().with_workspace(Arc::clone(&workspace));
        let input = json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1"},
            "components": {"schemas": {"Pet": {"type": "object"}}}
        });
        let read = reader.read_value(&input).unwrap();
        assert!(Arc::ptr_eq(&read.document.workspace, &workspace));
        assert_eq!(workspace.components_count(), 1);
    }
}
