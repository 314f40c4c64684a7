//! Schema Object.
//!
//! The Schema Object allows the definition of input and output data types.
//! Schemas may refer to each other, and to themselves, through
//! [`SchemaOrReference`]; cycles are only ever closed by references, so an
//! inline schema tree is always finite.

use crate::reference::{Reference, ReferenceHolder, ReferenceType, Referenceable};
use crate::workspace::Component;
use crate::{Extensions, ExternalDocumentation, UnrecognizedFields};
use bon::Builder;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A schema inline, or a reference to one
pub type SchemaOrReference = ReferenceHolder<Schema>;

/// JSON Schema primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonSchemaType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Object,
    Array,
}

impl JsonSchemaType {
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "null" => Self::Null,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "string" => Self::String,
            "object" => Self::Object,
            "array" => Self::Array,
            // Swagger 2.0 response schemas
            "file" => Self::String,
            _ => return None,
        };
        Some(kind)
    }
}

fn serialize_schema_type<S: Serializer>(
    types: &[JsonSchemaType],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match types {
        [single] => single.serialize(serializer),
        many => many.serialize(serializer),
    }
}

/// The Schema Object allows the definition of input and output data types.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Schema {
    /// Stable identifier (3.1 `$id`); used as the registration location
    #[serde(rename = "$id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Dialect (3.1 `$schema`)
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(rename = "$comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared types. More than one only in 3.1 (`type: [string, "null"]`)
    #[serde(
        rename = "type",
        serialize_with = "serialize_schema_type",
        skip_serializing_if = "Vec::is_empty"
    )]
    #[builder(default)]
    pub schema_type: Vec<JsonSchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// 3.0 nullable flag
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[builder(default)]
    pub nullable: bool,

    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Exclusive upper bound. A 3.0 `exclusiveMaximum: true` is read into
    /// this field from `maximum`.
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(rename = "maxProperties", skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,

    #[serde(rename = "minProperties", skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,

    /// Required property names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub required: Vec<String>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub enum_values: Vec<Value>,

    /// 3.1 `const`
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// 3.1 `examples` array
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub examples: Vec<Value>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(rename = "writeOnly", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(rename = "allOf", skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub all_of: Vec<SchemaOrReference>,

    #[serde(rename = "anyOf", skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub any_of: Vec<SchemaOrReference>,

    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub one_of: Vec<SchemaOrReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<SchemaOrReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaOrReference>,

    /// Object properties, in declaration order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub properties: IndexMap<String, SchemaOrReference>,

    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<SchemaOrReference>,

    /// `Some(false)` when `additionalProperties: false` was declared
    #[serde(skip)]
    pub additional_properties_allowed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<Xml>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,

    /// 3.1 `$defs`
    #[serde(rename = "$defs", skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub definitions: IndexMap<String, SchemaOrReference>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Schema {
    /// A schema of a single primitive type
    pub fn of_type(schema_type: JsonSchemaType) -> Self {
        Self {
            schema_type: vec![schema_type],
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of_type(JsonSchemaType::String)
    }

    pub fn integer() -> Self {
        Self::of_type(JsonSchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::of_type(JsonSchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::of_type(JsonSchemaType::Boolean)
    }

    pub fn object() -> Self {
        Self::of_type(JsonSchemaType::Object)
    }

    pub fn array(items: impl Into<SchemaOrReference>) -> Self {
        Self {
            items: Some(items.into()),
            ..Self::of_type(JsonSchemaType::Array)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Add a property
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        schema: impl Into<SchemaOrReference>,
    ) -> Self {
        self.properties.insert(name.into(), schema.into());
        self
    }

    /// Mark a property as required
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    pub fn with_all_of(mut self, schema: impl Into<SchemaOrReference>) -> Self {
        self.all_of.push(schema.into());
        self
    }

    /// The first declared type that is not `null`
    pub fn primary_type(&self) -> Option<JsonSchemaType> {
        self.schema_type
            .iter()
            .copied()
            .find(|t| *t != JsonSchemaType::Null)
    }

    /// Whether `null` is an accepted value
    pub fn is_nullable(&self) -> bool {
        self.nullable || self.schema_type.contains(&JsonSchemaType::Null)
    }
}

impl Referenceable for Schema {
    const REFERENCE_TYPE: ReferenceType = ReferenceType::Schema;

    fn from_component(component: &Component) -> Option<ReferenceHolder<Self>> {
        match component {
            Component::Schema(holder) => Some(holder.clone()),
            _ => None,
        }
    }

    fn into_component(holder: ReferenceHolder<Self>) -> Option<Component> {
        Some(Component::Schema(holder))
    }

    /// Whole-component ids go through the registry; fragment ids walk into
    /// the registered root schema.
    fn resolve_reference(reference: &Reference) -> Option<ReferenceHolder<Self>> {
        let document = reference.host_document()?;
        let location = reference.location_in(&document)?;
        if !reference.is_fragment() {
            return document.workspace.resolve_reference::<Self>(&location);
        }
        match document
            .workspace
            .resolve_json_schema_reference(&location, None)
        {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!("Schema reference {} did not resolve: {}", location, err);
                None
            }
        }
    }

    /// A reference's summary stands in for the schema title.
    fn apply_overrides(&mut self, reference: &Reference) {
        if let Some(summary) = &reference.summary {
            self.title = Some(summary.clone());
        }
        if let Some(description) = &reference.description {
            self.description = Some(description.clone());
        }
    }
}

impl ReferenceHolder<Schema> {
    pub fn title(&self) -> Option<String> {
        self.forward_summary(|schema| schema.title.clone())
    }

    pub fn description(&self) -> Option<String> {
        self.forward_description(|schema| schema.description.clone())
    }

    pub fn schema_type(&self) -> Vec<JsonSchemaType> {
        self.with_target(|schema| schema.schema_type.clone())
            .unwrap_or_default()
    }

    pub fn primary_type(&self) -> Option<JsonSchemaType> {
        self.with_target(Schema::primary_type).flatten()
    }

    pub fn format(&self) -> Option<String> {
        self.with_target(|schema| schema.format.clone()).flatten()
    }

    pub fn properties(&self) -> IndexMap<String, SchemaOrReference> {
        self.with_target(|schema| schema.properties.clone())
            .unwrap_or_default()
    }

    pub fn items(&self) -> Option<SchemaOrReference> {
        self.with_target(|schema| schema.items.clone()).flatten()
    }

    pub fn additional_properties(&self) -> Option<SchemaOrReference> {
        self.with_target(|schema| schema.additional_properties.clone())
            .flatten()
    }

    pub fn all_of(&self) -> Vec<SchemaOrReference> {
        self.with_target(|schema| schema.all_of.clone())
            .unwrap_or_default()
    }

    pub fn required(&self) -> Vec<String> {
        self.with_target(|schema| schema.required.clone())
            .unwrap_or_default()
    }

    pub fn default_value(&self) -> Option<Value> {
        self.with_target(|schema| schema.default.clone()).flatten()
    }

    pub fn enum_values(&self) -> Vec<Value> {
        self.with_target(|schema| schema.enum_values.clone())
            .unwrap_or_default()
    }
}

/// Aids in serialization, deserialization, and validation when request bodies
/// or response payloads may be one of a number of different schemas.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Discriminator {
    /// The name of the property in the payload that holds the discriminator
    /// value. REQUIRED.
    #[serde(rename = "propertyName", skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,

    /// Payload values to schema names or references
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub mapping: IndexMap<String, String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

/// XML representation metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder)]
pub struct Xml {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    #[builder(default)]
    pub unrecognized_fields: UnrecognizedFields,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_constructors() {
        let schema = Schema::object()
            .with_property("id", Schema::integer().with_format("int64"))
            .with_property("name", Schema::string())
            .with_required("id");

        assert_eq!(schema.primary_type(), Some(JsonSchemaType::Object));
        assert_eq!(schema.properties.len(), 2);
        assert_eq!(
            schema.properties.get_index(0).map(|(k, _)| k.as_str()),
            Some("id")
        );
    }

    #[test]
    fn test_schema_serialization() {
        let schema = Schema::array(Schema::string());
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "array", "items": {"type": "string"}})
        );

        let schema = Schema {
            schema_type: vec![JsonSchemaType::String, JsonSchemaType::Null],
            ..Schema::default()
        };
        assert!(schema.is_nullable());
        assert_eq!(schema.primary_type(), Some(JsonSchemaType::String));
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": ["string", "null"]})
        );
    }

    #[test]
    fn test_schema_reference_serialization() {
        let schema = Schema::object().with_property(
            "owner",
            SchemaOrReference::from_reference(Reference::schema("User").unwrap()),
        );
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {"owner": {"$ref": "#/components/schemas/User"}}
            })
        );
    }

    #[test]
    fn test_unresolved_schema_accessors_are_absent() {
        let holder = SchemaOrReference::from_reference(Reference::schema("Missing").unwrap());
        assert_eq!(holder.title(), None);
        assert_eq!(holder.description(), None);
        assert!(holder.schema_type().is_empty());
        assert!(holder.properties().is_empty());
        assert!(holder.items().is_none());
        assert!(holder.all_of().is_empty());
        assert!(holder.default_value().is_none());
    }

    #[test]
    fn test_reference_description_override_wins() {
        let holder = SchemaOrReference::from_reference(
            Reference::schema("Missing")
                .unwrap()
                .with_description("Local description"),
        );
        assert_eq!(holder.description().as_deref(), Some("Local description"));
    }

    #[test]
    fn test_override_copy_matches_reference_accessors() {
        use crate::{Components, Info, OpenApiDocument};

        let owner = SchemaOrReference::from_reference(
            Reference::schema("Pet")
                .unwrap()
                .with_summary("Local summary")
                .with_description("Local description"),
        );
        let _document = OpenApiDocument::new(Info::new("Pets", "1.0.0"))
            .with_components(
                Components::new()
                    .with_schema(
                        "Pet",
                        Schema::object()
                            .with_title("PetTitle")
                            .with_description("A pet"),
                    )
                    .with_schema("Owner", Schema::object().with_property("pet", owner.clone())),
            )
            .into_shared();

        assert_eq!(owner.title().as_deref(), Some("Local summary"));
        let copy = owner
            .copy_reference_as_target_element_with_overrides()
            .unwrap();
        assert_eq!(copy.title, owner.title());
        assert_eq!(copy.description, owner.description());
        assert_eq!(copy.primary_type(), Some(JsonSchemaType::Object));

        // The shared component keeps its own title
        assert_eq!(owner.target().unwrap().title.as_deref(), Some("PetTitle"));
    }
}
