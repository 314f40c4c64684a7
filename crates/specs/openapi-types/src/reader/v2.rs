//! Field tables for Swagger 2.0 documents.
//!
//! 2.0 is upgraded into the 3.x model while it is read. Several 2.0
//! constructs only make sense once their surroundings are known (body and
//! form parameters need the operation's `consumes`, response schemas need
//! its `produces`), so those are parsed into drafts first and converted
//! when the enclosing object is complete.
//!
//! | Swagger 2.0                       | Upgraded to                                   |
//! |-----------------------------------|-----------------------------------------------|
//! | `host`, `basePath`, `schemes`     | `servers`                                     |
//! | `definitions`                     | `components.schemas`                          |
//! | `parameters` (`in: body`)         | `components.requestBodies`                    |
//! | `responses`                       | `components.responses`                        |
//! | `securityDefinitions`             | `components.securitySchemes`                  |
//! | `in: body` parameter              | request body, one media type per `consumes`   |
//! | `in: formData` parameters         | one form request body with an object schema   |
//! | `type`, `format`, `items`, limits | the parameter's or header's own schema        |
//! | `collectionFormat`                | `style` and `explode`                         |

use super::context::{FormField, ParsingContext};
use super::field_map::{
    Extensible, FixedFieldMap, PatternFieldMap, list, map, parse_map, string, string_list,
};
use super::load_schema_holder;
use super::parse_node::ParseNode;
use super::v3::{
    self, finish_schema, fold_exclusive_bounds, load_object, parameter_location, schema_type,
};
use crate::error::OpenApiResult;
use crate::extensions::is_extension_key;
use crate::reference::{Reference, ReferenceHolder, ReferenceType};
use crate::{
    Components, Discriminator, Extensions, Header, HeaderOrReference, JsonSchemaType, MediaType,
    OAuthFlow, OAuthFlows, OpenApiDocument, Operation, OperationType, Parameter, ParameterLocation,
    ParameterOrReference, ParameterStyle, PathItem, Paths, RequestBody, RequestBodyOrReference,
    Response, ResponseOrReference, Responses, Schema, SchemaOrReference, SecurityScheme,
    SecuritySchemeType, Server, UnrecognizedFields,
};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM: &str = "multipart/form-data";

/// Name of the upgraded body parameter, kept on the request body
const BODY_NAME_EXTENSION: &str = "x-bodyName";

fn is_form_media_type(media_type: &str) -> bool {
    media_type == FORM_URL_ENCODED || media_type == MULTIPART_FORM
}

macro_rules! delegate_extensible {
    ($draft:ty, $inner:ident) => {
        impl Extensible for $draft {
            fn extensions_mut(&mut self) -> &mut Extensions {
                self.$inner.extensions_mut()
            }

            fn unrecognized_fields_mut(&mut self) -> Option<&mut UnrecognizedFields> {
                self.$inner.unrecognized_fields_mut()
            }
        }
    };
}

/// Drafts carrying a schema built from 2.0 primitive fields
trait PrimitiveDraft {
    fn primitive_mut(&mut self) -> &mut Schema;
}

/// Route the 2.0 primitive keywords of a parameter, header or items object
/// into the draft's schema
fn primitive_patterns<T: PrimitiveDraft>() -> PatternFieldMap<T> {
    PatternFieldMap::<T>::new().pattern(
        |name| PRIMITIVE_FIELDS.get(name).is_some(),
        |draft, name, node, context| match PRIMITIVE_FIELDS.get(name) {
            Some(handler) => handler(draft.primitive_mut(), node, context),
            None => Ok(()),
        },
    )
}

// Schemas

/// `type`, accepting the 2.0-only `file` as a binary string
fn file_aware_type(schema: &mut Schema, node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<()> {
    if node.as_string().as_deref() == Some("file") {
        schema.schema_type = vec![JsonSchemaType::String];
        schema.format.get_or_insert_with(|| "binary".to_string());
        return Ok(());
    }
    schema.schema_type = schema_type(node, context)?.into_iter().collect();
    Ok(())
}

static SCHEMA_FIELDS: Lazy<FixedFieldMap<Schema>> = Lazy::new(|| {
    v3::schema_fields()
        .without("nullable")
        .without("oneOf")
        .without("anyOf")
        .without("not")
        .without("writeOnly")
        .field("type", file_aware_type)
        .field("discriminator", |schema, node, context| {
            schema.discriminator = string(node, context)?.map(|property_name| Discriminator {
                property_name: Some(property_name),
                ..Discriminator::default()
            });
            Ok(())
        })
});

pub(super) fn load_schema(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Schema> {
    let mut schema: Schema = load_object(node, context, "schema", &SCHEMA_FIELDS)?;
    fold_exclusive_bounds(node, &mut schema);
    Ok(finish_schema(schema))
}

fn primitive_fields() -> FixedFieldMap<Schema> {
    v3::schema_fields()
        .retain(&[
            "format",
            "default",
            "maximum",
            "exclusiveMaximum",
            "minimum",
            "exclusiveMinimum",
            "maxLength",
            "minLength",
            "pattern",
            "maxItems",
            "minItems",
            "uniqueItems",
            "enum",
            "multipleOf",
        ])
        .field("type", file_aware_type)
        .field("items", |schema, node, context| {
            schema.items = Some(SchemaOrReference::inline(load_items(node, context)?));
            Ok(())
        })
}

static PRIMITIVE_FIELDS: Lazy<FixedFieldMap<Schema>> = Lazy::new(primitive_fields);

static ITEMS_FIELDS: Lazy<FixedFieldMap<Schema>> =
    Lazy::new(|| primitive_fields().field("collectionFormat", |_, _, _| Ok(())));

fn load_items(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Schema> {
    let mut schema: Schema = load_object(node, context, "items", &ITEMS_FIELDS)?;
    fold_exclusive_bounds(node, &mut schema);
    Ok(finish_schema(schema))
}

// Parameters

#[derive(Debug, Clone, Default)]
struct ParameterDraft {
    parameter: Parameter,
    /// Raw `in`, which may be `body` or `formData`
    location: Option<String>,
    schema: Schema,
    body_schema: Option<SchemaOrReference>,
    collection_format: Option<String>,
    pointer: String,
}

delegate_extensible!(ParameterDraft, parameter);

impl PrimitiveDraft for ParameterDraft {
    fn primitive_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }
}

impl ParameterDraft {
    fn is_body(&self) -> bool {
        self.location.as_deref() == Some("body")
    }

    fn is_form(&self) -> bool {
        self.location.as_deref() == Some("formData")
    }

    fn into_form_field(self) -> FormField {
        let mut schema = self.schema;
        if schema.description.is_none() {
            schema.description = self.parameter.description;
        }
        FormField {
            name: self.parameter.name.unwrap_or_default(),
            schema,
            required: self.parameter.required,
        }
    }

    /// A request body with the body schema under each non-form media type
    fn into_request_body(self, consumes: &[String]) -> RequestBody {
        let mut media_types: Vec<&str> = consumes
            .iter()
            .map(String::as_str)
            .filter(|media_type| !is_form_media_type(media_type))
            .collect();
        if media_types.is_empty() {
            media_types.push(DEFAULT_MEDIA_TYPE);
        }

        let mut body = RequestBody {
            description: self.parameter.description,
            required: self.parameter.required,
            extensions: self.parameter.extensions,
            unrecognized_fields: self.parameter.unrecognized_fields,
            ..RequestBody::default()
        };
        for media_type in media_types {
            let content = MediaType {
                schema: self.body_schema.clone(),
                ..MediaType::default()
            };
            body.content.insert(media_type.to_string(), content);
        }
        if let Some(name) = self.parameter.name {
            body.extensions.insert(BODY_NAME_EXTENSION, name);
        }
        body
    }

    fn into_parameter(self, context: &mut ParsingContext) -> OpenApiResult<Parameter> {
        let mut parameter = self.parameter;
        if let Some(name) = self.location.as_deref() {
            match ParameterLocation::from_name(name) {
                Some(location) => parameter.location = Some(location),
                None => {
                    context.report(
                        format!("{}/in", self.pointer.trim_end_matches('/')),
                        format!("Unknown parameter location '{name}'"),
                    )?;
                }
            }
        }

        let is_array = self.schema.primary_type() == Some(JsonSchemaType::Array);
        let collection_format = self
            .collection_format
            .as_deref()
            .or(is_array.then_some("csv"));
        if let Some(format) = collection_format {
            match collection_style(format, parameter.location) {
                Some((style, explode)) => {
                    parameter.style = Some(style);
                    parameter.explode = Some(explode);
                }
                None => context.warn(
                    self.pointer.clone(),
                    format!("Collection format '{format}' has no OpenAPI 3 equivalent"),
                ),
            }
        }

        parameter.schema = Some(SchemaOrReference::inline(self.schema));
        Ok(parameter)
    }
}

fn collection_style(format: &str, location: Option<ParameterLocation>) -> Option<(ParameterStyle, bool)> {
    let style = match format {
        "csv" => match location {
            Some(ParameterLocation::Query) | Some(ParameterLocation::Cookie) => (ParameterStyle::Form, false),
            _ => (ParameterStyle::Simple, false),
        },
        "multi" => (ParameterStyle::Form, true),
        "ssv" => (ParameterStyle::SpaceDelimited, false),
        "pipes" => (ParameterStyle::PipeDelimited, false),
        _ => return None,
    };
    Some(style)
}

static PARAMETER_FIELDS: Lazy<FixedFieldMap<ParameterDraft>> = Lazy::new(|| {
    FixedFieldMap::<ParameterDraft>::new()
        .field("name", |draft, node, context| {
            draft.parameter.name = string(node, context)?;
            Ok(())
        })
        .field("in", set_field!(location, string))
        .field("description", |draft, node, context| {
            draft.parameter.description = string(node, context)?;
            Ok(())
        })
        .field("required", |draft, node, context| {
            draft.parameter.required = super::field_map::boolean(node, context)?.unwrap_or_default();
            Ok(())
        })
        .field("allowEmptyValue", |draft, node, context| {
            draft.parameter.allow_empty_value = super::field_map::boolean(node, context)?.unwrap_or_default();
            Ok(())
        })
        .field("schema", set_some!(body_schema, load_schema_holder))
        .field("collectionFormat", set_field!(collection_format, string))
});

static PARAMETER_PATTERNS: Lazy<PatternFieldMap<ParameterDraft>> = Lazy::new(primitive_patterns);

fn load_parameter_draft(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<ParameterDraft> {
    let mut draft = ParameterDraft {
        pointer: node.pointer(),
        ..ParameterDraft::default()
    };
    parse_map(node, &mut draft, "parameter", &PARAMETER_FIELDS, &PARAMETER_PATTERNS, context)?;
    context.require(node, &["name", "in"], "parameter")?;
    if draft.is_body() {
        context.require(node, &["schema"], "parameter")?;
    }
    fold_exclusive_bounds(node, &mut draft.schema);
    draft.schema = finish_schema(draft.schema);
    Ok(draft)
}

#[derive(Debug, Clone)]
enum ParameterEntry {
    Reference(Reference),
    Inline(ParameterDraft),
}

fn load_parameter_entry(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<ParameterEntry> {
    match node.reference() {
        Some(raw) => Ok(ParameterEntry::Reference(Reference::parse(
            raw,
            ReferenceType::Parameter,
            context.version(),
        )?)),
        None => load_parameter_draft(node, context).map(ParameterEntry::Inline),
    }
}

/// Where an upgraded request body comes from
#[derive(Debug, Clone)]
enum BodySource {
    Reference(Reference),
    Inline(ParameterDraft),
}

/// A parameter list split into what stays a parameter and what becomes the
/// request body.
#[derive(Debug, Clone, Default)]
struct UpgradedParameters {
    parameters: Vec<ParameterOrReference>,
    body: Option<BodySource>,
    form: Vec<FormField>,
}

impl UpgradedParameters {
    fn has_body(&self) -> bool {
        self.body.is_some() || !self.form.is_empty()
    }

    fn take_request_body(&mut self, consumes: &[String]) -> OpenApiResult<Option<RequestBodyOrReference>> {
        match self.body.take() {
            Some(BodySource::Reference(reference)) => {
                let mut body_reference = Reference::new(reference.id, ReferenceType::RequestBody)?;
                body_reference.external_resource = reference.external_resource;
                Ok(Some(ReferenceHolder::from_reference(body_reference)))
            }
            Some(BodySource::Inline(draft)) => Ok(Some(draft.into_request_body(consumes).into())),
            None if self.form.is_empty() => Ok(None),
            None => Ok(Some(form_request_body(std::mem::take(&mut self.form), consumes).into())),
        }
    }
}

/// All form fields as properties of one object schema, under each form
/// media type the operation consumes
fn form_request_body(fields: Vec<FormField>, consumes: &[String]) -> RequestBody {
    let mut schema = Schema::object();
    let mut required = false;
    for field in fields {
        if field.required {
            schema = schema.with_required(field.name.clone());
            required = true;
        }
        schema = schema.with_property(field.name, field.schema);
    }

    let mut media_types: Vec<&str> = consumes
        .iter()
        .map(String::as_str)
        .filter(|media_type| is_form_media_type(media_type))
        .collect();
    if media_types.is_empty() {
        media_types.push(FORM_URL_ENCODED);
    }

    let mut body = RequestBody {
        required,
        ..RequestBody::default()
    };
    for media_type in media_types {
        body.content
            .insert(media_type.to_string(), MediaType::with_schema(schema.clone()));
    }
    body
}

fn upgrade_parameters(
    entries: Vec<ParameterEntry>,
    context: &mut ParsingContext,
) -> OpenApiResult<UpgradedParameters> {
    let mut upgraded = UpgradedParameters::default();
    for entry in entries {
        match entry {
            ParameterEntry::Reference(reference) if context.body_parameters.contains(&reference.id) => {
                upgraded.body = Some(BodySource::Reference(reference));
            }
            ParameterEntry::Reference(reference) => match context.form_parameters.get(&reference.id) {
                Some(field) => upgraded.form.push(field.clone()),
                None => upgraded
                    .parameters
                    .push(ReferenceHolder::from_reference(reference)),
            },
            ParameterEntry::Inline(draft) if draft.is_body() => {
                upgraded.body = Some(BodySource::Inline(draft));
            }
            ParameterEntry::Inline(draft) if draft.is_form() => {
                upgraded.form.push(draft.into_form_field());
            }
            ParameterEntry::Inline(draft) => {
                let parameter = draft.into_parameter(context)?;
                upgraded.parameters.push(parameter.into());
            }
        }
    }
    if upgraded.body.is_some() && !upgraded.form.is_empty() {
        debug!("Dropping form parameters next to a body parameter");
        upgraded.form.clear();
    }
    Ok(upgraded)
}

// Headers

#[derive(Debug, Default)]
struct HeaderDraft {
    header: Header,
    schema: Schema,
}

delegate_extensible!(HeaderDraft, header);

impl PrimitiveDraft for HeaderDraft {
    fn primitive_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }
}

static HEADER_FIELDS: Lazy<FixedFieldMap<HeaderDraft>> = Lazy::new(|| {
    FixedFieldMap::<HeaderDraft>::new()
        .field("description", |draft, node, context| {
            draft.header.description = string(node, context)?;
            Ok(())
        })
        // Headers only serialize as `simple`
        .field("collectionFormat", |_, _, _| Ok(()))
});

static HEADER_PATTERNS: Lazy<PatternFieldMap<HeaderDraft>> = Lazy::new(primitive_patterns);

fn load_header(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<HeaderOrReference> {
    let mut draft = HeaderDraft::default();
    parse_map(node, &mut draft, "header", &HEADER_FIELDS, &HEADER_PATTERNS, context)?;
    fold_exclusive_bounds(node, &mut draft.schema);
    let mut header = draft.header;
    header.schema = Some(SchemaOrReference::inline(finish_schema(draft.schema)));
    Ok(header.into())
}

// Responses

#[derive(Debug, Default)]
struct ResponseDraft {
    response: Response,
    schema: Option<SchemaOrReference>,
    examples: IndexMap<String, Value>,
}

delegate_extensible!(ResponseDraft, response);

impl ResponseDraft {
    /// The schema under each produced media type, plus any media type only
    /// named by an example
    fn finish(self, produces: &[String]) -> Response {
        let mut response = self.response;
        let mut examples = self.examples;
        if self.schema.is_some() {
            let defaults = [DEFAULT_MEDIA_TYPE.to_string()];
            let media_types = if produces.is_empty() { &defaults[..] } else { produces };
            for media_type in media_types {
                let content = MediaType {
                    schema: self.schema.clone(),
                    example: examples.shift_remove(media_type),
                    ..MediaType::default()
                };
                response.content.insert(media_type.clone(), content);
            }
        }
        for (media_type, example) in examples {
            let content = MediaType {
                schema: self.schema.clone(),
                example: Some(example),
                ..MediaType::default()
            };
            response.content.insert(media_type, content);
        }
        response
    }
}

static RESPONSE_FIELDS: Lazy<FixedFieldMap<ResponseDraft>> = Lazy::new(|| {
    FixedFieldMap::<ResponseDraft>::new()
        .field("description", |draft, node, context| {
            draft.response.description = string(node, context)?;
            Ok(())
        })
        .field("schema", set_some!(schema, load_schema_holder))
        .field("headers", |draft, node, context| {
            draft.response.headers = map(node, context, load_header)?;
            Ok(())
        })
        .field("examples", |draft, node, context| {
            draft.examples = map(node, context, |n, _| Ok(n.value().clone()))?;
            Ok(())
        })
});

fn load_response_draft(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<ResponseDraft> {
    load_object(node, context, "response", &RESPONSE_FIELDS)
}

#[derive(Debug)]
enum ResponseEntry {
    Reference(Reference),
    Inline(ResponseDraft),
}

impl ResponseEntry {
    fn finish(self, produces: &[String]) -> ResponseOrReference {
        match self {
            Self::Reference(reference) => ReferenceHolder::from_reference(reference),
            Self::Inline(draft) => draft.finish(produces).into(),
        }
    }
}

fn load_response_entry(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<ResponseEntry> {
    match node.reference() {
        Some(raw) => Ok(ResponseEntry::Reference(Reference::parse(
            raw,
            ReferenceType::Response,
            context.version(),
        )?)),
        None => load_response_draft(node, context).map(ResponseEntry::Inline),
    }
}

#[derive(Debug, Default)]
struct ResponsesDraft {
    entries: Vec<(String, ResponseEntry)>,
    extensions: Extensions,
}

impl Extensible for ResponsesDraft {
    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    fn unrecognized_fields_mut(&mut self) -> Option<&mut UnrecognizedFields> {
        None
    }
}

impl ResponsesDraft {
    fn finish(self, produces: &[String]) -> Responses {
        let mut responses = Responses {
            extensions: self.extensions,
            ..Responses::default()
        };
        for (status, entry) in self.entries {
            responses.insert(status, entry.finish(produces));
        }
        responses
    }
}

static RESPONSES_PATTERNS: Lazy<PatternFieldMap<ResponsesDraft>> = Lazy::new(|| {
    PatternFieldMap::<ResponsesDraft>::new().pattern(
        |name| !is_extension_key(name),
        |draft, name, node, context| {
            let entry = load_response_entry(node, context)?;
            draft.entries.push((name.to_string(), entry));
            Ok(())
        },
    )
});

fn load_responses(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<ResponsesDraft> {
    let mut draft = ResponsesDraft::default();
    parse_map(
        node,
        &mut draft,
        "responses",
        &FixedFieldMap::new(),
        &RESPONSES_PATTERNS,
        context,
    )?;
    Ok(draft)
}

// Operations and paths

#[derive(Debug, Default)]
struct OperationDraft {
    operation: Operation,
    consumes: Option<Vec<String>>,
    produces: Option<Vec<String>>,
    parameters: Vec<ParameterEntry>,
    responses: Option<ResponsesDraft>,
}

delegate_extensible!(OperationDraft, operation);

impl OperationDraft {
    /// Apply the media types in scope; path-level body and form parameters
    /// fill in when the operation declares none of its own
    fn finish(self, shared: &UpgradedParameters, context: &mut ParsingContext) -> OpenApiResult<Operation> {
        let consumes = self.consumes.unwrap_or_else(|| context.global_consumes.clone());
        let produces = self.produces.unwrap_or_else(|| context.global_produces.clone());

        let mut upgraded = upgrade_parameters(self.parameters, context)?;
        if !upgraded.has_body() {
            upgraded.body = shared.body.clone();
            upgraded.form = shared.form.clone();
        }

        let mut operation = self.operation;
        operation.request_body = upgraded.take_request_body(&consumes)?;
        operation.parameters = upgraded.parameters;
        operation.responses = self.responses.map(|responses| responses.finish(&produces));
        Ok(operation)
    }
}

static OPERATION_FIELDS: Lazy<FixedFieldMap<OperationDraft>> = Lazy::new(|| {
    FixedFieldMap::<OperationDraft>::new()
        .field("tags", |draft, node, context| {
            draft.operation.tags = v3::operation_tags(node, context)?;
            Ok(())
        })
        .field("summary", |draft, node, context| {
            draft.operation.summary = string(node, context)?;
            Ok(())
        })
        .field("description", |draft, node, context| {
            draft.operation.description = string(node, context)?;
            Ok(())
        })
        .field("externalDocs", |draft, node, context| {
            draft.operation.external_docs = Some(v3::load_external_docs(node, context)?);
            Ok(())
        })
        .field("operationId", |draft, node, context| {
            draft.operation.operation_id = string(node, context)?;
            Ok(())
        })
        .field("consumes", set_some!(consumes, string_list))
        .field("produces", set_some!(produces, string_list))
        .field("parameters", set_field!(parameters, |n, c| list(n, c, load_parameter_entry)))
        .field("responses", set_some!(responses, load_responses))
        // Covered by the document-level servers
        .field("schemes", |_, _, _| Ok(()))
        .field("deprecated", |draft, node, context| {
            draft.operation.deprecated = super::field_map::boolean(node, context)?.unwrap_or_default();
            Ok(())
        })
        .field("security", |draft, node, context| {
            draft.operation.security = Some(list(node, context, v3::load_security_requirement)?);
            Ok(())
        })
});

fn load_operation(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<OperationDraft> {
    load_object(node, context, "operation", &OPERATION_FIELDS)
}

#[derive(Debug, Default)]
struct PathItemDraft {
    item: PathItem,
    operations: Vec<(OperationType, OperationDraft)>,
    parameters: Vec<ParameterEntry>,
}

delegate_extensible!(PathItemDraft, item);

impl PathItemDraft {
    fn finish(self, context: &mut ParsingContext) -> OpenApiResult<PathItem> {
        let mut shared = upgrade_parameters(self.parameters, context)?;
        let mut item = self.item;
        item.parameters = std::mem::take(&mut shared.parameters);
        for (operation_type, draft) in self.operations {
            let operation = draft.finish(&shared, context)?;
            item.operations.insert(operation_type, operation);
        }
        Ok(item)
    }
}

fn operation_field(operation_type: OperationType) -> super::field_map::FieldHandler<PathItemDraft> {
    macro_rules! handler {
        ($op:expr) => {
            |draft: &mut PathItemDraft, node: &ParseNode<'_>, context: &mut ParsingContext| {
                let operation = load_operation(node, context)?;
                draft.operations.push(($op, operation));
                Ok(())
            }
        };
    }
    match operation_type {
        OperationType::Get => handler!(OperationType::Get),
        OperationType::Put => handler!(OperationType::Put),
        OperationType::Post => handler!(OperationType::Post),
        OperationType::Delete => handler!(OperationType::Delete),
        OperationType::Options => handler!(OperationType::Options),
        OperationType::Head => handler!(OperationType::Head),
        OperationType::Patch => handler!(OperationType::Patch),
        OperationType::Trace => handler!(OperationType::Trace),
    }
}

static PATH_ITEM_FIELDS: Lazy<FixedFieldMap<PathItemDraft>> = Lazy::new(|| {
    let fields = FixedFieldMap::<PathItemDraft>::new()
        .field("parameters", set_field!(parameters, |n, c| list(n, c, load_parameter_entry)));
    OperationType::ALL
        .into_iter()
        .filter(|op| *op != OperationType::Trace)
        .fold(fields, |fields, op| fields.field(op.as_str(), operation_field(op)))
});

fn load_path_item(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<PathItem> {
    let draft: PathItemDraft = load_object(node, context, "path item", &PATH_ITEM_FIELDS)?;
    draft.finish(context)
}

static PATHS_PATTERNS: Lazy<PatternFieldMap<Paths>> = Lazy::new(|| {
    PatternFieldMap::<Paths>::new().pattern(
        |name| name.starts_with('/'),
        |paths, name, node, context| {
            let item = super::load_holder(node, context, load_path_item)?;
            paths.entries.insert(name.to_string(), item);
            Ok(())
        },
    )
});

fn load_paths(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Paths> {
    let mut paths = Paths::default();
    parse_map(node, &mut paths, "paths", &FixedFieldMap::new(), &PATHS_PATTERNS, context)?;
    Ok(paths)
}

// Security

#[derive(Debug, Default)]
struct SecuritySchemeDraft {
    scheme: SecurityScheme,
    kind: Option<String>,
    flow: Option<String>,
    oauth: OAuthFlow,
}

delegate_extensible!(SecuritySchemeDraft, scheme);

impl SecuritySchemeDraft {
    fn finish(self, node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<SecurityScheme> {
        let mut scheme = self.scheme;
        match self.kind.as_deref() {
            Some("basic") => {
                scheme.scheme_type = Some(SecuritySchemeType::Http);
                scheme.scheme = Some("basic".to_string());
            }
            Some("apiKey") => scheme.scheme_type = Some(SecuritySchemeType::ApiKey),
            Some("oauth2") => {
                scheme.scheme_type = Some(SecuritySchemeType::OAuth2);
                let mut flows = OAuthFlows::default();
                let flow = Some(self.oauth);
                match self.flow.as_deref() {
                    Some("implicit") => flows.implicit = flow,
                    Some("password") => flows.password = flow,
                    Some("application") => flows.client_credentials = flow,
                    Some("accessCode") => flows.authorization_code = flow,
                    other => context.report(
                        node.pointer_to("flow"),
                        format!("Unknown OAuth2 flow '{}'", other.unwrap_or_default()),
                    )?,
                }
                scheme.flows = Some(flows);
            }
            Some(other) => context.report(
                node.pointer_to("type"),
                format!("Unknown security scheme type '{other}'"),
            )?,
            None => {}
        }
        Ok(scheme)
    }
}

static SECURITY_SCHEME_FIELDS: Lazy<FixedFieldMap<SecuritySchemeDraft>> = Lazy::new(|| {
    FixedFieldMap::<SecuritySchemeDraft>::new()
        .field("type", set_field!(kind, string))
        .field("description", |draft, node, context| {
            draft.scheme.description = string(node, context)?;
            Ok(())
        })
        .field("name", |draft, node, context| {
            draft.scheme.name = string(node, context)?;
            Ok(())
        })
        .field("in", |draft, node, context| {
            draft.scheme.location = parameter_location(node, context)?;
            Ok(())
        })
        .field("flow", set_field!(flow, string))
        .field("authorizationUrl", |draft, node, context| {
            draft.oauth.authorization_url = string(node, context)?;
            Ok(())
        })
        .field("tokenUrl", |draft, node, context| {
            draft.oauth.token_url = string(node, context)?;
            Ok(())
        })
        .field("scopes", |draft, node, context| {
            draft.oauth.scopes = map(node, context, string)?
                .into_iter()
                .map(|(scope, description)| (scope, description.unwrap_or_default()))
                .collect();
            Ok(())
        })
});

fn load_security_scheme(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<SecurityScheme> {
    let draft: SecuritySchemeDraft = load_object(node, context, "securityScheme", &SECURITY_SCHEME_FIELDS)?;
    draft.finish(node, context)
}

// Document

#[derive(Debug, Default)]
struct DocumentDraft {
    document: OpenApiDocument,
    host: Option<String>,
    base_path: Option<String>,
    schemes: Vec<String>,
}

delegate_extensible!(DocumentDraft, document);

impl DocumentDraft {
    fn components(&mut self) -> &mut Components {
        self.document.components.get_or_insert_with(Components::default)
    }

    /// One server per scheme; a scheme-relative or relative URL otherwise
    fn servers(&self) -> Vec<Server> {
        if self.host.is_none() && self.base_path.is_none() {
            return Vec::new();
        }
        let host = self.host.as_deref().unwrap_or_default();
        let base_path = self.base_path.as_deref().unwrap_or_default();
        if host.is_empty() {
            let path = if base_path.is_empty() { "/" } else { base_path };
            return vec![Server::new(path)];
        }
        if self.schemes.is_empty() {
            return vec![Server::new(format!("//{host}{base_path}"))];
        }
        self.schemes
            .iter()
            .map(|scheme| Server::new(format!("{scheme}://{host}{base_path}")))
            .collect()
    }
}

static DOCUMENT_FIELDS: Lazy<FixedFieldMap<DocumentDraft>> = Lazy::new(|| {
    FixedFieldMap::<DocumentDraft>::new()
        .field("swagger", |_, _, _| Ok(()))
        .field("info", |draft, node, context| {
            draft.document.info = v3::load_info(node, context)?;
            Ok(())
        })
        .field("host", set_field!(host, string))
        .field("basePath", set_field!(base_path, string))
        .field("schemes", set_field!(schemes, string_list))
        // Read up front; every body and response depends on them
        .field("consumes", |_, _, _| Ok(()))
        .field("produces", |_, _, _| Ok(()))
        .field("paths", |draft, node, context| {
            draft.document.paths = Some(load_paths(node, context)?);
            Ok(())
        })
        .field("definitions", |draft, node, context| {
            draft.components().schemas = map(node, context, load_schema_holder)?;
            Ok(())
        })
        .field("parameters", |draft, node, context| {
            for (name, child) in node.entries() {
                if child.get("in").and_then(|n| n.as_string()).as_deref() == Some("formData") {
                    continue;
                }
                let parameter = load_parameter_draft(&child, context)?;
                if parameter.is_body() {
                    let consumes = context.global_consumes.clone();
                    let body = parameter.into_request_body(&consumes);
                    draft.components().request_bodies.insert(name.to_string(), body.into());
                } else {
                    let parameter = parameter.into_parameter(context)?;
                    draft.components().parameters.insert(name.to_string(), parameter.into());
                }
            }
            Ok(())
        })
        .field("responses", |draft, node, context| {
            let produces = context.global_produces.clone();
            for (name, child) in node.entries() {
                let response = load_response_draft(&child, context)?.finish(&produces);
                draft.components().responses.insert(name.to_string(), response.into());
            }
            Ok(())
        })
        .field("securityDefinitions", |draft, node, context| {
            for (name, child) in node.entries() {
                let scheme = load_security_scheme(&child, context)?;
                draft.components().security_schemes.insert(name.to_string(), scheme.into());
            }
            Ok(())
        })
        .field("security", |draft, node, context| {
            draft.document.security = list(node, context, v3::load_security_requirement)?;
            Ok(())
        })
        .field("tags", |draft, node, context| {
            draft.document.tags = list(node, context, v3::load_tag)?;
            Ok(())
        })
        .field("externalDocs", |draft, node, context| {
            draft.document.external_docs = Some(v3::load_external_docs(node, context)?);
            Ok(())
        })
});

/// Record the document-wide state the upgrade needs before any operation
/// is read: media types and which top-level parameters are bodies or forms
fn scan_globals(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<()> {
    if let Some(consumes) = node.get("consumes") {
        context.global_consumes = string_list(&consumes, context)?;
    }
    if let Some(produces) = node.get("produces") {
        context.global_produces = string_list(&produces, context)?;
    }
    let Some(parameters) = node.get("parameters").filter(|n| n.is_map()) else {
        return Ok(());
    };
    for (name, child) in parameters.entries() {
        match child.get("in").and_then(|n| n.as_string()).as_deref() {
            Some("body") => {
                context.body_parameters.insert(name.to_string());
            }
            Some("formData") => {
                let field = load_parameter_draft(&child, context)?.into_form_field();
                context.form_parameters.insert(name.to_string(), field);
            }
            _ => {}
        }
    }
    Ok(())
}

pub(super) fn load_document(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<OpenApiDocument> {
    context.require(node, &["info", "paths"], "document")?;
    scan_globals(node, context)?;
    let draft: DocumentDraft = load_object(node, context, "document", &DOCUMENT_FIELDS)?;
    let servers = draft.servers();
    let mut document = draft.document;
    document.servers = servers;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpenApiSpecVersion;
    use serde_json::json;

    fn context() -> ParsingContext {
        ParsingContext::new(OpenApiSpecVersion::V2_0, false)
    }

    fn petstore() -> Value {
        json!({
            "swagger": "2.0",
            "info": {"title": "Pets", "version": "1.0.0"},
            "host": "petstore.example.com",
            "basePath": "/v1",
            "schemes": ["https", "http"],
            "consumes": ["application/json"],
            "produces": ["application/json", "application/xml"],
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "parameters": [
                            {"name": "tags", "in": "query", "type": "array", "items": {"type": "string"}},
                            {"name": "limit", "in": "query", "type": "integer", "maximum": 100, "exclusiveMaximum": true, "default": "20"}
                        ],
                        "responses": {
                            "200": {
                                "description": "pets",
                                "schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}},
                                "headers": {"X-Rate-Limit": {"type": "integer"}}
                            },
                            "default": {"$ref": "#/responses/Error"}
                        }
                    },
                    "post": {
                        "operationId": "createPet",
                        "parameters": [{"$ref": "#/parameters/PetBody"}],
                        "responses": {"201": {"description": "created"}}
                    }
                },
                "/pets/{id}/photo": {
                    "parameters": [{"name": "id", "in": "path", "required": true, "type": "string"}],
                    "put": {
                        "consumes": ["multipart/form-data"],
                        "parameters": [
                            {"name": "file", "in": "formData", "type": "file", "required": true},
                            {"$ref": "#/parameters/Caption"}
                        ],
                        "responses": {"204": {"description": "stored"}}
                    }
                }
            },
            "definitions": {
                "Pet": {"type": "object", "discriminator": "petType", "properties": {"petType": {"type": "string"}}}
            },
            "parameters": {
                "PetBody": {"name": "pet", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Pet"}},
                "Caption": {"name": "caption", "in": "formData", "type": "string"},
                "Limit": {"name": "limit", "in": "query", "type": "integer"}
            },
            "responses": {
                "Error": {"description": "error", "schema": {"type": "string"}}
            },
            "securityDefinitions": {
                "basicAuth": {"type": "basic"},
                "petstoreAuth": {
                    "type": "oauth2",
                    "flow": "accessCode",
                    "authorizationUrl": "https://auth.example.com/authorize",
                    "tokenUrl": "https://auth.example.com/token",
                    "scopes": {"read:pets": "read your pets"}
                }
            }
        })
    }

    fn load() -> (OpenApiDocument, ParsingContext) {
        let value = petstore();
        let mut context = context();
        let document = load_document(&ParseNode::root(&value), &mut context).unwrap();
        (document, context)
    }

    #[test]
    fn test_servers_and_components() {
        let (document, context) = load();
        assert!(!context.diagnostic().has_errors());
        assert_eq!(document.openapi, None);

        let urls: Vec<_> = document.servers.iter().filter_map(|s| s.url.as_deref()).collect();
        assert_eq!(
            urls,
            vec!["https://petstore.example.com/v1", "http://petstore.example.com/v1"]
        );

        let components = document.components.as_ref().unwrap();
        let pet = components.schemas["Pet"].as_inline().unwrap();
        assert_eq!(
            pet.discriminator.as_ref().unwrap().property_name.as_deref(),
            Some("petType")
        );
        assert!(components.request_bodies.contains_key("PetBody"));
        assert!(components.parameters.contains_key("Limit"));
        assert!(!components.parameters.contains_key("Caption"));

        let error = components.responses["Error"].as_inline().unwrap();
        assert_eq!(
            error.content.keys().collect::<Vec<_>>(),
            vec!["application/json", "application/xml"]
        );

        let basic = components.security_schemes["basicAuth"].as_inline().unwrap();
        assert_eq!(basic.scheme_type, Some(SecuritySchemeType::Http));
        assert_eq!(basic.scheme.as_deref(), Some("basic"));
        let oauth = components.security_schemes["petstoreAuth"].as_inline().unwrap();
        let flow = oauth.flows.as_ref().unwrap().authorization_code.as_ref().unwrap();
        assert_eq!(flow.token_url.as_deref(), Some("https://auth.example.com/token"));
        assert_eq!(flow.scopes["read:pets"], "read your pets");
    }

    #[test]
    fn test_parameters_are_upgraded() {
        let (document, _) = load();
        let paths = document.paths.as_ref().unwrap();
        let pets = paths.get("/pets").unwrap().as_inline().unwrap();
        let list = &pets.operations[&OperationType::Get];

        let tags = list.parameters[0].as_inline().unwrap();
        assert_eq!(tags.location, Some(ParameterLocation::Query));
        assert_eq!(tags.style, Some(ParameterStyle::Form));
        assert_eq!(tags.explode, Some(false));

        let limit = list.parameters[1].as_inline().unwrap();
        let schema = limit.schema.as_ref().unwrap().as_inline().unwrap();
        assert_eq!(schema.exclusive_maximum, Some(100.0));
        assert_eq!(schema.default, Some(json!(20)));

        let response = list.responses.as_ref().unwrap().get("200").unwrap().as_inline().unwrap();
        assert_eq!(response.content.len(), 2);
        let items = response.content["application/xml"]
            .schema
            .as_ref()
            .unwrap()
            .as_inline()
            .unwrap()
            .items
            .clone()
            .unwrap();
        assert_eq!(items.as_reference().unwrap().id, "Pet");
        assert!(response.headers.contains_key("X-Rate-Limit"));

        let default = list.responses.as_ref().unwrap().get("default").unwrap();
        assert_eq!(default.as_reference().unwrap().id, "Error");
    }

    #[test]
    fn test_body_parameter_reference_becomes_request_body() {
        let (document, _) = load();
        let pets = document.paths.as_ref().unwrap().get("/pets").unwrap().as_inline().unwrap();
        let create = &pets.operations[&OperationType::Post];

        assert!(create.parameters.is_empty());
        let body = create.request_body.as_ref().unwrap().as_reference().unwrap();
        assert_eq!(body.id, "PetBody");
        assert_eq!(body.reference_type, ReferenceType::RequestBody);

        let components = document.components.as_ref().unwrap();
        let stored = components.request_bodies["PetBody"].as_inline().unwrap();
        assert!(stored.required);
        assert_eq!(stored.extensions.get(BODY_NAME_EXTENSION), Some(&json!("pet")));
        assert!(stored.content.contains_key("application/json"));
    }

    #[test]
    fn test_form_parameters_become_form_body() {
        let (document, _) = load();
        let photo = document
            .paths
            .as_ref()
            .unwrap()
            .get("/pets/{id}/photo")
            .unwrap()
            .as_inline()
            .unwrap();
        assert_eq!(photo.parameters.len(), 1);

        let upload = &photo.operations[&OperationType::Put];
        assert!(upload.parameters.is_empty());
        let body = upload.request_body.as_ref().unwrap().as_inline().unwrap();
        assert!(body.required);
        let schema = body.content["multipart/form-data"]
            .schema
            .as_ref()
            .unwrap()
            .as_inline()
            .unwrap();
        assert_eq!(schema.required, vec!["file".to_string()]);
        assert_eq!(
            schema.properties.keys().collect::<Vec<_>>(),
            vec!["file", "caption"]
        );
        let file = schema.properties["file"].as_inline().unwrap();
        assert_eq!(file.format.as_deref(), Some("binary"));
    }

    #[test]
    fn test_unsupported_collection_format_warns() {
        let value = json!({"name": "ids", "in": "query", "type": "array", "items": {"type": "integer"}, "collectionFormat": "tsv"});
        let mut context = context();
        let draft = load_parameter_draft(&ParseNode::root(&value), &mut context).unwrap();
        let parameter = draft.into_parameter(&mut context).unwrap();

        assert_eq!(parameter.style, None);
        assert_eq!(context.diagnostic().warnings.len(), 1);
        assert!(!context.diagnostic().has_errors());
    }

    #[test]
    fn test_unknown_oauth_flow_is_reported() {
        let value = json!({"type": "oauth2", "flow": "device"});
        let mut context = context();
        let scheme = load_security_scheme(&ParseNode::root(&value), &mut context).unwrap();

        assert_eq!(scheme.scheme_type, Some(SecuritySchemeType::OAuth2));
        assert_eq!(context.diagnostic().errors[0].pointer, "#/flow");
    }

    #[test]
    fn test_header_primitive_fields_fold_into_schema() {
        let value = json!({
            "description": "Remaining calls",
            "type": "integer",
            "format": "int32",
            "default": 5,
            "enum": [7, 8, 9],
            "maximum": 9,
            "x-origin": "gateway"
        });
        let mut context = context();
        let header = load_header(&ParseNode::root(&value), &mut context).unwrap();
        assert!(!context.diagnostic().has_errors());

        let header = header.as_inline().unwrap();
        assert_eq!(header.description.as_deref(), Some("Remaining calls"));
        assert_eq!(header.extensions.get("x-origin"), Some(&json!("gateway")));

        let schema = header.schema.as_ref().unwrap().as_inline().unwrap();
        assert_eq!(schema.primary_type(), Some(JsonSchemaType::Integer));
        assert_eq!(schema.format.as_deref(), Some("int32"));
        assert_eq!(schema.default, Some(json!(5)));
        assert_eq!(schema.enum_values, vec![json!(7), json!(8), json!(9)]);
        assert_eq!(schema.maximum, Some(9.0));
    }
}
