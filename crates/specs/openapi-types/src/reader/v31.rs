//! Field tables for OpenAPI 3.1 documents.
//!
//! 3.1 reuses the 3.0 tables and extends the ones whose shape changed:
//! `webhooks`, `jsonSchemaDialect`, info `summary`, license `identifier`,
//! `components.pathItems`, and JSON Schema 2020-12 keywords.

use super::context::ParsingContext;
use super::field_map::{FixedFieldMap, list, map, number, string};
use super::parse_node::ParseNode;
use super::v3::{self, finish_schema, load_object, schema_type};
use super::{load_holder, load_schema_holder};
use crate::error::OpenApiResult;
use crate::{Components, Info, License, OpenApiDocument, Schema};
use once_cell::sync::Lazy;

static DOCUMENT_FIELDS: Lazy<FixedFieldMap<OpenApiDocument>> = Lazy::new(|| {
    v3::document_fields()
        .field("info", |document, node, context| {
            document.info = load_info(node, context)?;
            Ok(())
        })
        .field("jsonSchemaDialect", set_field!(json_schema_dialect, string))
        .field(
            "webhooks",
            set_field!(webhooks, |n, c| map(n, c, |n, c| load_holder(n, c, v3::load_path_item))),
        )
        .field("components", set_some!(components, load_components))
});

/// `paths` is optional in 3.1
pub(super) fn load_document(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<OpenApiDocument> {
    context.require(node, &["info"], "document")?;
    load_object(node, context, "document", &DOCUMENT_FIELDS)
}

static INFO_FIELDS: Lazy<FixedFieldMap<Info>> = Lazy::new(|| {
    v3::info_fields()
        .field("summary", set_field!(summary, string))
        .field("license", set_some!(license, load_license))
});

fn load_info(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Info> {
    load_object(node, context, "info", &INFO_FIELDS)
}

static LICENSE_FIELDS: Lazy<FixedFieldMap<License>> = Lazy::new(|| {
    v3::license_fields().field("identifier", set_field!(identifier, string))
});

fn load_license(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<License> {
    load_object(node, context, "license", &LICENSE_FIELDS)
}

static COMPONENTS_FIELDS: Lazy<FixedFieldMap<Components>> = Lazy::new(|| {
    v3::components_fields().field(
        "pathItems",
        set_field!(path_items, |n, c| map(n, c, |n, c| load_holder(n, c, v3::load_path_item))),
    )
});

fn load_components(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Components> {
    load_object(node, context, "components", &COMPONENTS_FIELDS)
}

static SCHEMA_FIELDS: Lazy<FixedFieldMap<Schema>> = Lazy::new(|| {
    v3::schema_fields()
        .without("nullable")
        .field("$id", set_field!(id, string))
        .field("$schema", set_field!(schema, string))
        .field("$comment", set_field!(comment, string))
        .field("$defs", set_field!(definitions, |n, c| map(n, c, load_schema_holder)))
        .field("type", |schema, node, context| {
            schema.schema_type = match node.items() {
                Some(_) => list(node, context, schema_type)?.into_iter().flatten().collect(),
                None => schema_type(node, context)?.into_iter().collect(),
            };
            Ok(())
        })
        .field("exclusiveMaximum", set_field!(exclusive_maximum, number))
        .field("exclusiveMinimum", set_field!(exclusive_minimum, number))
        .field("const", |schema, node, _context| {
            schema.const_value = Some(node.value().clone());
            Ok(())
        })
        .field("examples", |schema, node, context| {
            schema.examples = list(node, context, |n, _| Ok(n.value().clone()))?;
            Ok(())
        })
});

pub(super) fn load_schema(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Schema> {
    let schema: Schema = load_object(node, context, "schema", &SCHEMA_FIELDS)?;
    Ok(finish_schema(schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JsonSchemaType, OpenApiSpecVersion};
    use serde_json::json;

    fn context() -> ParsingContext {
        ParsingContext::new(OpenApiSpecVersion::V3_1, false)
    }

    #[test]
    fn test_schema_keywords() {
        let value = json!({
            "$id": "https://example.com/schemas/pet",
            "type": ["string", "null"],
            "exclusiveMaximum": 5,
            "const": "cat",
            "examples": ["cat", "dog"],
            "nullable": true,
            "$defs": {"Name": {"type": "string"}}
        });
        let mut context = context();
        let schema = load_schema(&ParseNode::root(&value), &mut context).unwrap();

        assert_eq!(schema.id.as_deref(), Some("https://example.com/schemas/pet"));
        assert_eq!(
            schema.schema_type,
            vec![JsonSchemaType::String, JsonSchemaType::Null]
        );
        assert!(schema.is_nullable());
        assert!(!schema.nullable);
        assert_eq!(schema.exclusive_maximum, Some(5.0));
        assert_eq!(schema.const_value, Some(json!("cat")));
        assert_eq!(schema.examples.len(), 2);
        assert_eq!(schema.definitions.len(), 1);
        assert_eq!(schema.unrecognized_fields.get("nullable"), Some(&json!(true)));
    }

    #[test]
    fn test_document_fields() {
        let value = json!({
            "openapi": "3.1.0",
            "info": {"title": "Pets", "version": "1", "summary": "pets", "license": {"name": "MIT", "identifier": "MIT"}},
            "jsonSchemaDialect": "https://spec.openapis.org/oas/3.1/dialect/base",
            "webhooks": {"newPet": {"post": {"responses": {"200": {"description": "ok"}}}}},
            "components": {"pathItems": {"Pets": {"get": {}}}}
        });
        let mut context = context();
        let document = load_document(&ParseNode::root(&value), &mut context).unwrap();

        assert!(!context.diagnostic().has_errors());
        assert_eq!(document.info.summary.as_deref(), Some("pets"));
        assert_eq!(
            document.info.license.as_ref().unwrap().identifier.as_deref(),
            Some("MIT")
        );
        assert!(document.json_schema_dialect.is_some());
        assert_eq!(document.webhooks.len(), 1);
        assert_eq!(document.components.unwrap().path_items.len(), 1);
        assert!(document.paths.is_none());
    }
}
