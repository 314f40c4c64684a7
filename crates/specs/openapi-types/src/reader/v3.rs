//! Field tables for OpenAPI 3.0 documents.
//!
//! The table builders are shared with 3.1, which extends a few of them.

use super::context::ParsingContext;
use super::field_map::{
    AnyFieldMap, AnyFieldMapParameter, AnyMapFieldMap, AnyMapFieldMapParameter, FixedFieldMap,
    PatternFieldMap, boolean, list, map, number, parse_map, process_any_fields,
    process_any_map_fields, string, string_list, unsigned,
};
use super::parse_node::ParseNode;
use super::{load_holder, load_schema_holder};
use crate::error::OpenApiResult;
use crate::extensions::is_extension_key;
use crate::reader::any::coerce_any;
use crate::reference::{Reference, ReferenceType};
use crate::{
    Callback, Components, Contact, Discriminator, Encoding, Example, ExternalDocumentation, Header,
    Info, JsonSchemaType, License, Link, MediaType, OAuthFlow, OAuthFlows, OpenApiDocument,
    Operation, OperationType, Parameter, ParameterLocation, ParameterStyle, PathItem, Paths,
    RequestBody, Response, Responses, RuntimeExpression, RuntimeExpressionAnyWrapper, Schema,
    SecurityRequirement, SecurityScheme, SecuritySchemeOrReference, SecuritySchemeType, Server,
    ServerVariable, Tag, TagOrReference, Xml,
};
use once_cell::sync::Lazy;

/// Parse `node` into a fresh `T` with the given fixed fields
pub(super) fn load_object<T: Default + super::field_map::Extensible>(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
    object: &str,
    fixed: &FixedFieldMap<T>,
) -> OpenApiResult<T> {
    let mut target = T::default();
    parse_map(node, &mut target, object, fixed, &PatternFieldMap::new(), context)?;
    Ok(target)
}

pub(super) fn parameter_location(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<Option<ParameterLocation>> {
    let Some(name) = string(node, context)? else {
        return Ok(None);
    };
    match ParameterLocation::from_name(&name) {
        Some(location) => Ok(Some(location)),
        None => {
            context.report(node.pointer(), format!("Unknown parameter location '{name}'"))?;
            Ok(None)
        }
    }
}

pub(super) fn parameter_style(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<Option<ParameterStyle>> {
    let Some(name) = string(node, context)? else {
        return Ok(None);
    };
    match ParameterStyle::from_name(&name) {
        Some(style) => Ok(Some(style)),
        None => {
            context.report(node.pointer(), format!("Unknown parameter style '{name}'"))?;
            Ok(None)
        }
    }
}

pub(super) fn schema_type(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<Option<JsonSchemaType>> {
    let Some(name) = string(node, context)? else {
        return Ok(None);
    };
    match JsonSchemaType::from_name(&name) {
        Some(kind) => Ok(Some(kind)),
        None => {
            context.report(node.pointer(), format!("Unknown schema type '{name}'"))?;
            Ok(None)
        }
    }
}

// Document

pub(super) fn document_fields() -> FixedFieldMap<OpenApiDocument> {
    FixedFieldMap::<OpenApiDocument>::new()
        .field("openapi", set_field!(openapi, string))
        .field("info", |document, node, context| {
            document.info = load_info(node, context)?;
            Ok(())
        })
        .field("servers", set_field!(servers, |n, c| list(n, c, load_server)))
        .field("paths", set_some!(paths, load_paths))
        .field("components", set_some!(components, load_components))
        .field(
            "security",
            set_field!(security, |n, c| list(n, c, load_security_requirement)),
        )
        .field("tags", set_field!(tags, |n, c| list(n, c, load_tag)))
        .field("externalDocs", set_some!(external_docs, load_external_docs))
}

static DOCUMENT_FIELDS: Lazy<FixedFieldMap<OpenApiDocument>> = Lazy::new(document_fields);

pub(super) fn load_document(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<OpenApiDocument> {
    context.require(node, &["info", "paths"], "document")?;
    load_object(node, context, "document", &DOCUMENT_FIELDS)
}

// Info

pub(super) fn info_fields() -> FixedFieldMap<Info> {
    FixedFieldMap::<Info>::new()
        .field("title", set_field!(title, string))
        .field("description", set_field!(description, string))
        .field("termsOfService", set_field!(terms_of_service, string))
        .field("contact", set_some!(contact, load_contact))
        .field("license", set_some!(license, load_license))
        .field("version", set_field!(version, string))
}

static INFO_FIELDS: Lazy<FixedFieldMap<Info>> = Lazy::new(info_fields);

pub(super) fn load_info(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Info> {
    load_object(node, context, "info", &INFO_FIELDS)
}

static CONTACT_FIELDS: Lazy<FixedFieldMap<Contact>> = Lazy::new(|| {
    FixedFieldMap::<Contact>::new()
        .field("name", set_field!(name, string))
        .field("url", set_field!(url, string))
        .field("email", set_field!(email, string))
});

pub(super) fn load_contact(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Contact> {
    load_object(node, context, "contact", &CONTACT_FIELDS)
}

pub(super) fn license_fields() -> FixedFieldMap<License> {
    FixedFieldMap::<License>::new()
        .field("name", set_field!(name, string))
        .field("url", set_field!(url, string))
}

static LICENSE_FIELDS: Lazy<FixedFieldMap<License>> = Lazy::new(license_fields);

pub(super) fn load_license(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<License> {
    load_object(node, context, "license", &LICENSE_FIELDS)
}

// Servers, tags, external docs

static SERVER_FIELDS: Lazy<FixedFieldMap<Server>> = Lazy::new(|| {
    FixedFieldMap::<Server>::new()
        .field("url", set_field!(url, string))
        .field("description", set_field!(description, string))
        .field(
            "variables",
            set_field!(variables, |n, c| map(n, c, load_server_variable)),
        )
});

pub(super) fn load_server(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Server> {
    load_object(node, context, "server", &SERVER_FIELDS)
}

static SERVER_VARIABLE_FIELDS: Lazy<FixedFieldMap<ServerVariable>> = Lazy::new(|| {
    FixedFieldMap::<ServerVariable>::new()
        .field("enum", set_field!(enum_values, string_list))
        .field("default", set_field!(default, string))
        .field("description", set_field!(description, string))
});

fn load_server_variable(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<ServerVariable> {
    load_object(node, context, "server variable", &SERVER_VARIABLE_FIELDS)
}

static TAG_FIELDS: Lazy<FixedFieldMap<Tag>> = Lazy::new(|| {
    FixedFieldMap::<Tag>::new()
        .field("name", set_field!(name, string))
        .field("description", set_field!(description, string))
        .field("externalDocs", set_some!(external_docs, load_external_docs))
});

pub(super) fn load_tag(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Tag> {
    load_object(node, context, "tag", &TAG_FIELDS)
}

static EXTERNAL_DOCS_FIELDS: Lazy<FixedFieldMap<ExternalDocumentation>> = Lazy::new(|| {
    FixedFieldMap::<ExternalDocumentation>::new()
        .field("description", set_field!(description, string))
        .field("url", set_field!(url, string))
});

pub(super) fn load_external_docs(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<ExternalDocumentation> {
    load_object(node, context, "externalDocs", &EXTERNAL_DOCS_FIELDS)
}

// Components

pub(super) fn components_fields() -> FixedFieldMap<Components> {
    FixedFieldMap::<Components>::new()
        .field("schemas", set_field!(schemas, |n, c| map(n, c, load_schema_holder)))
        .field(
            "responses",
            set_field!(responses, |n, c| map(n, c, |n, c| load_holder(n, c, load_response))),
        )
        .field(
            "parameters",
            set_field!(parameters, |n, c| map(n, c, |n, c| load_holder(n, c, load_parameter))),
        )
        .field(
            "examples",
            set_field!(examples, |n, c| map(n, c, |n, c| load_holder(n, c, load_example))),
        )
        .field(
            "requestBodies",
            set_field!(request_bodies, |n, c| map(n, c, |n, c| load_holder(n, c, load_request_body))),
        )
        .field(
            "headers",
            set_field!(headers, |n, c| map(n, c, |n, c| load_holder(n, c, load_header))),
        )
        .field(
            "securitySchemes",
            set_field!(security_schemes, |n, c| map(n, c, |n, c| load_holder(n, c, load_security_scheme))),
        )
        .field(
            "links",
            set_field!(links, |n, c| map(n, c, |n, c| load_holder(n, c, load_link))),
        )
        .field(
            "callbacks",
            set_field!(callbacks, |n, c| map(n, c, |n, c| load_holder(n, c, load_callback))),
        )
}

static COMPONENTS_FIELDS: Lazy<FixedFieldMap<Components>> = Lazy::new(components_fields);

pub(super) fn load_components(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<Components> {
    load_object(node, context, "components", &COMPONENTS_FIELDS)
}

// Paths and operations

static PATHS_PATTERNS: Lazy<PatternFieldMap<Paths>> = Lazy::new(|| {
    PatternFieldMap::<Paths>::new().pattern(
        |name| name.starts_with('/'),
        |paths, name, node, context| {
            let item = load_holder(node, context, load_path_item)?;
            paths.entries.insert(name.to_string(), item);
            Ok(())
        },
    )
});

pub(super) fn load_paths(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Paths> {
    let mut paths = Paths::default();
    parse_map(node, &mut paths, "paths", &FixedFieldMap::new(), &PATHS_PATTERNS, context)?;
    Ok(paths)
}

fn operation_field(operation_type: OperationType) -> super::field_map::FieldHandler<PathItem> {
    macro_rules! handler {
        ($op:expr) => {
            |item: &mut PathItem, node: &ParseNode<'_>, context: &mut ParsingContext| {
                let operation = load_operation(node, context)?;
                item.operations.insert($op, operation);
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

static PATH_ITEM_FIELDS: Lazy<FixedFieldMap<PathItem>> = Lazy::new(|| {
    let fields = FixedFieldMap::<PathItem>::new()
        .field("summary", set_field!(summary, string))
        .field("description", set_field!(description, string))
        .field("servers", set_field!(servers, |n, c| list(n, c, load_server)))
        .field(
            "parameters",
            set_field!(parameters, |n, c| list(n, c, |n, c| load_holder(n, c, load_parameter))),
        );
    OperationType::ALL
        .into_iter()
        .fold(fields, |fields, op| fields.field(op.as_str(), operation_field(op)))
});

pub(super) fn load_path_item(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<PathItem> {
    load_object(node, context, "path item", &PATH_ITEM_FIELDS)
}

pub(super) fn operation_tags(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Vec<TagOrReference>> {
    let mut tags = Vec::new();
    for (index, name) in string_list(node, context)?.into_iter().enumerate() {
        match TagOrReference::named(&name) {
            Ok(tag) => tags.push(tag),
            Err(err) => context.report(node.pointer_to(&index.to_string()), err.to_string())?,
        }
    }
    Ok(tags)
}

static OPERATION_FIELDS: Lazy<FixedFieldMap<Operation>> = Lazy::new(|| {
    FixedFieldMap::<Operation>::new()
        .field("tags", set_field!(tags, operation_tags))
        .field("summary", set_field!(summary, string))
        .field("description", set_field!(description, string))
        .field("externalDocs", set_some!(external_docs, load_external_docs))
        .field("operationId", set_field!(operation_id, string))
        .field(
            "parameters",
            set_field!(parameters, |n, c| list(n, c, |n, c| load_holder(n, c, load_parameter))),
        )
        .field(
            "requestBody",
            set_some!(request_body, |n, c| load_holder(n, c, load_request_body)),
        )
        .field("responses", set_some!(responses, load_responses))
        .field(
            "callbacks",
            set_field!(callbacks, |n, c| map(n, c, |n, c| load_holder(n, c, load_callback))),
        )
        .field("deprecated", set_flag!(deprecated))
        .field(
            "security",
            set_some!(security, |n, c| list(n, c, load_security_requirement)),
        )
        .field("servers", set_field!(servers, |n, c| list(n, c, load_server)))
});

pub(super) fn load_operation(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Operation> {
    load_object(node, context, "operation", &OPERATION_FIELDS)
}

// Parameters, bodies, media types

static PARAMETER_FIELDS: Lazy<FixedFieldMap<Parameter>> = Lazy::new(|| {
    FixedFieldMap::<Parameter>::new()
        .field("name", set_field!(name, string))
        .field("in", set_field!(location, parameter_location))
        .field("description", set_field!(description, string))
        .field("required", set_flag!(required))
        .field("deprecated", set_flag!(deprecated))
        .field("allowEmptyValue", set_flag!(allow_empty_value))
        .field("style", set_field!(style, parameter_style))
        .field("explode", set_field!(explode, boolean))
        .field("allowReserved", set_flag!(allow_reserved))
        .field("schema", set_some!(schema, load_schema_holder))
        .field("example", set_any!(example))
        .field(
            "examples",
            set_field!(examples, |n, c| map(n, c, |n, c| load_holder(n, c, load_example))),
        )
        .field("content", set_field!(content, |n, c| map(n, c, load_media_type)))
});

static PARAMETER_ANY_FIELDS: Lazy<AnyFieldMap<Parameter>> = Lazy::new(|| {
    vec![(
        "example",
        AnyFieldMapParameter {
            get: |parameter| parameter.example.as_ref(),
            set: |parameter, value| parameter.example = Some(value),
            schema: |parameter| parameter.schema.as_ref().and_then(|s| s.target()),
        },
    )]
});

static PARAMETER_ANY_MAP_FIELDS: Lazy<AnyMapFieldMap<Parameter, Example>> = Lazy::new(|| {
    vec![(
        "examples",
        AnyMapFieldMapParameter {
            map: |parameter| &mut parameter.examples,
            get: |example| example.value.as_ref(),
            set: |example, value| example.value = Some(value),
            schema: |parameter| parameter.schema.as_ref().and_then(|s| s.target()),
        },
    )]
});

pub(super) fn load_parameter(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Parameter> {
    let mut parameter: Parameter = load_object(node, context, "parameter", &PARAMETER_FIELDS)?;
    process_any_fields(&mut parameter, &PARAMETER_ANY_FIELDS);
    process_any_map_fields(&mut parameter, &PARAMETER_ANY_MAP_FIELDS);
    Ok(parameter)
}

static HEADER_FIELDS: Lazy<FixedFieldMap<Header>> = Lazy::new(|| {
    FixedFieldMap::<Header>::new()
        .field("description", set_field!(description, string))
        .field("required", set_flag!(required))
        .field("deprecated", set_flag!(deprecated))
        .field("allowEmptyValue", set_flag!(allow_empty_value))
        .field("style", set_field!(style, parameter_style))
        .field("explode", set_field!(explode, boolean))
        .field("allowReserved", set_flag!(allow_reserved))
        .field("schema", set_some!(schema, load_schema_holder))
        .field("example", set_any!(example))
        .field(
            "examples",
            set_field!(examples, |n, c| map(n, c, |n, c| load_holder(n, c, load_example))),
        )
        .field("content", set_field!(content, |n, c| map(n, c, load_media_type)))
});

static HEADER_ANY_FIELDS: Lazy<AnyFieldMap<Header>> = Lazy::new(|| {
    vec![(
        "example",
        AnyFieldMapParameter {
            get: |header| header.example.as_ref(),
            set: |header, value| header.example = Some(value),
            schema: |header| header.schema.as_ref().and_then(|s| s.target()),
        },
    )]
});

static HEADER_ANY_MAP_FIELDS: Lazy<AnyMapFieldMap<Header, Example>> = Lazy::new(|| {
    vec![(
        "examples",
        AnyMapFieldMapParameter {
            map: |header| &mut header.examples,
            get: |example| example.value.as_ref(),
            set: |example, value| example.value = Some(value),
            schema: |header| header.schema.as_ref().and_then(|s| s.target()),
        },
    )]
});

pub(super) fn load_header(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Header> {
    let mut header: Header = load_object(node, context, "header", &HEADER_FIELDS)?;
    process_any_fields(&mut header, &HEADER_ANY_FIELDS);
    process_any_map_fields(&mut header, &HEADER_ANY_MAP_FIELDS);
    Ok(header)
}

static REQUEST_BODY_FIELDS: Lazy<FixedFieldMap<RequestBody>> = Lazy::new(|| {
    FixedFieldMap::<RequestBody>::new()
        .field("description", set_field!(description, string))
        .field("content", set_field!(content, |n, c| map(n, c, load_media_type)))
        .field("required", set_flag!(required))
});

pub(super) fn load_request_body(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<RequestBody> {
    load_object(node, context, "requestBody", &REQUEST_BODY_FIELDS)
}

static MEDIA_TYPE_FIELDS: Lazy<FixedFieldMap<MediaType>> = Lazy::new(|| {
    FixedFieldMap::<MediaType>::new()
        .field("schema", set_some!(schema, load_schema_holder))
        .field("example", set_any!(example))
        .field(
            "examples",
            set_field!(examples, |n, c| map(n, c, |n, c| load_holder(n, c, load_example))),
        )
        .field("encoding", set_field!(encoding, |n, c| map(n, c, load_encoding)))
});

static MEDIA_TYPE_ANY_FIELDS: Lazy<AnyFieldMap<MediaType>> = Lazy::new(|| {
    vec![(
        "example",
        AnyFieldMapParameter {
            get: |media_type| media_type.example.as_ref(),
            set: |media_type, value| media_type.example = Some(value),
            schema: |media_type| media_type.schema.as_ref().and_then(|s| s.target()),
        },
    )]
});

static MEDIA_TYPE_ANY_MAP_FIELDS: Lazy<AnyMapFieldMap<MediaType, Example>> = Lazy::new(|| {
    vec![(
        "examples",
        AnyMapFieldMapParameter {
            map: |media_type| &mut media_type.examples,
            get: |example| example.value.as_ref(),
            set: |example, value| example.value = Some(value),
            schema: |media_type| media_type.schema.as_ref().and_then(|s| s.target()),
        },
    )]
});

pub(super) fn load_media_type(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<MediaType> {
    let mut media_type: MediaType = load_object(node, context, "media type", &MEDIA_TYPE_FIELDS)?;
    process_any_fields(&mut media_type, &MEDIA_TYPE_ANY_FIELDS);
    process_any_map_fields(&mut media_type, &MEDIA_TYPE_ANY_MAP_FIELDS);
    Ok(media_type)
}

static ENCODING_FIELDS: Lazy<FixedFieldMap<Encoding>> = Lazy::new(|| {
    FixedFieldMap::<Encoding>::new()
        .field("contentType", set_field!(content_type, string))
        .field(
            "headers",
            set_field!(headers, |n, c| map(n, c, |n, c| load_holder(n, c, load_header))),
        )
        .field("style", set_field!(style, parameter_style))
        .field("explode", set_field!(explode, boolean))
        .field("allowReserved", set_field!(allow_reserved, boolean))
});

fn load_encoding(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Encoding> {
    load_object(node, context, "encoding", &ENCODING_FIELDS)
}

static EXAMPLE_FIELDS: Lazy<FixedFieldMap<Example>> = Lazy::new(|| {
    FixedFieldMap::<Example>::new()
        .field("summary", set_field!(summary, string))
        .field("description", set_field!(description, string))
        .field("value", set_any!(value))
        .field("externalValue", set_field!(external_value, string))
});

pub(super) fn load_example(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Example> {
    load_object(node, context, "example", &EXAMPLE_FIELDS)
}

// Responses, links, callbacks

static RESPONSES_PATTERNS: Lazy<PatternFieldMap<Responses>> = Lazy::new(|| {
    PatternFieldMap::<Responses>::new().pattern(
        |name| !is_extension_key(name),
        |responses, name, node, context| {
            let response = load_holder(node, context, load_response)?;
            responses.insert(name, response);
            Ok(())
        },
    )
});

pub(super) fn load_responses(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Responses> {
    let mut responses = Responses::default();
    parse_map(
        node,
        &mut responses,
        "responses",
        &FixedFieldMap::new(),
        &RESPONSES_PATTERNS,
        context,
    )?;
    Ok(responses)
}

static RESPONSE_FIELDS: Lazy<FixedFieldMap<Response>> = Lazy::new(|| {
    FixedFieldMap::<Response>::new()
        .field("description", set_field!(description, string))
        .field(
            "headers",
            set_field!(headers, |n, c| map(n, c, |n, c| load_holder(n, c, load_header))),
        )
        .field("content", set_field!(content, |n, c| map(n, c, load_media_type)))
        .field(
            "links",
            set_field!(links, |n, c| map(n, c, |n, c| load_holder(n, c, load_link))),
        )
});

pub(super) fn load_response(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Response> {
    load_object(node, context, "response", &RESPONSE_FIELDS)
}

fn runtime_value(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<Option<RuntimeExpressionAnyWrapper>> {
    match RuntimeExpressionAnyWrapper::from_value(node.value().clone()) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            context.report(node.pointer(), err.to_string())?;
            Ok(None)
        }
    }
}

static LINK_FIELDS: Lazy<FixedFieldMap<Link>> = Lazy::new(|| {
    FixedFieldMap::<Link>::new()
        .field("operationRef", set_field!(operation_ref, string))
        .field("operationId", set_field!(operation_id, string))
        .field("parameters", |link, node, context| {
            let values = map(node, context, runtime_value)?;
            link.parameters = values
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| (name, value)))
                .collect();
            Ok(())
        })
        .field("requestBody", set_field!(request_body, runtime_value))
        .field("description", set_field!(description, string))
        .field("server", set_some!(server, load_server))
});

pub(super) fn load_link(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Link> {
    load_object(node, context, "link", &LINK_FIELDS)
}

static CALLBACK_PATTERNS: Lazy<PatternFieldMap<Callback>> = Lazy::new(|| {
    PatternFieldMap::<Callback>::new().pattern(
        |name| !is_extension_key(name),
        |callback, name, node, context| {
            let expression = match RuntimeExpression::build(name) {
                Ok(expression) => expression,
                Err(err) => return context.report(node.pointer(), err.to_string()),
            };
            let item = load_holder(node, context, load_path_item)?;
            callback.path_items.insert(expression, item);
            Ok(())
        },
    )
});

pub(super) fn load_callback(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Callback> {
    let mut callback = Callback::default();
    parse_map(
        node,
        &mut callback,
        "callback",
        &FixedFieldMap::new(),
        &CALLBACK_PATTERNS,
        context,
    )?;
    Ok(callback)
}

// Security

fn security_scheme_type(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<Option<SecuritySchemeType>> {
    let Some(name) = string(node, context)? else {
        return Ok(None);
    };
    match SecuritySchemeType::from_name(&name) {
        Some(kind) => Ok(Some(kind)),
        None => {
            context.report(node.pointer(), format!("Unknown security scheme type '{name}'"))?;
            Ok(None)
        }
    }
}

static SECURITY_SCHEME_FIELDS: Lazy<FixedFieldMap<SecurityScheme>> = Lazy::new(|| {
    FixedFieldMap::<SecurityScheme>::new()
        .field("type", set_field!(scheme_type, security_scheme_type))
        .field("description", set_field!(description, string))
        .field("name", set_field!(name, string))
        .field("in", set_field!(location, parameter_location))
        .field("scheme", set_field!(scheme, string))
        .field("bearerFormat", set_field!(bearer_format, string))
        .field("flows", set_some!(flows, load_oauth_flows))
        .field("openIdConnectUrl", set_field!(open_id_connect_url, string))
});

pub(super) fn load_security_scheme(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<SecurityScheme> {
    load_object(node, context, "securityScheme", &SECURITY_SCHEME_FIELDS)
}

static OAUTH_FLOWS_FIELDS: Lazy<FixedFieldMap<OAuthFlows>> = Lazy::new(|| {
    FixedFieldMap::<OAuthFlows>::new()
        .field("implicit", set_some!(implicit, load_oauth_flow))
        .field("password", set_some!(password, load_oauth_flow))
        .field("clientCredentials", set_some!(client_credentials, load_oauth_flow))
        .field("authorizationCode", set_some!(authorization_code, load_oauth_flow))
});

fn load_oauth_flows(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<OAuthFlows> {
    load_object(node, context, "OAuth flows", &OAUTH_FLOWS_FIELDS)
}

static OAUTH_FLOW_FIELDS: Lazy<FixedFieldMap<OAuthFlow>> = Lazy::new(|| {
    FixedFieldMap::<OAuthFlow>::new()
        .field("authorizationUrl", set_field!(authorization_url, string))
        .field("tokenUrl", set_field!(token_url, string))
        .field("refreshUrl", set_field!(refresh_url, string))
        .field("scopes", |flow, node, context| {
            let scopes = map(node, context, string)?;
            flow.scopes = scopes
                .into_iter()
                .map(|(scope, description)| (scope, description.unwrap_or_default()))
                .collect();
            Ok(())
        })
});

fn load_oauth_flow(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<OAuthFlow> {
    load_object(node, context, "OAuth flow", &OAUTH_FLOW_FIELDS)
}

/// `{scheme name: [scopes]}`; each name becomes a scheme reference
pub(super) fn load_security_requirement(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<SecurityRequirement> {
    let mut requirement = SecurityRequirement::new();
    for (name, scopes) in map(node, context, string_list)? {
        match Reference::new(name, ReferenceType::SecurityScheme) {
            Ok(reference) => {
                requirement = requirement.with(SecuritySchemeOrReference::from_reference(reference), scopes);
            }
            Err(err) => context.report(node.pointer(), err.to_string())?,
        }
    }
    Ok(requirement)
}

// Schemas

/// Schema fields common to 2.0 and 3.0; 3.1 extends these as well
pub(super) fn schema_fields() -> FixedFieldMap<Schema> {
    FixedFieldMap::<Schema>::new()
        .field("title", set_field!(title, string))
        .field("multipleOf", set_field!(multiple_of, number))
        .field("maximum", set_field!(maximum, number))
        // Boolean in 3.0: folded into `exclusive_maximum` once `maximum` is known
        .field("exclusiveMaximum", |_, _, _| Ok(()))
        .field("minimum", set_field!(minimum, number))
        .field("exclusiveMinimum", |_, _, _| Ok(()))
        .field("maxLength", set_field!(max_length, unsigned))
        .field("minLength", set_field!(min_length, unsigned))
        .field("pattern", set_field!(pattern, string))
        .field("maxItems", set_field!(max_items, unsigned))
        .field("minItems", set_field!(min_items, unsigned))
        .field("uniqueItems", set_field!(unique_items, boolean))
        .field("maxProperties", set_field!(max_properties, unsigned))
        .field("minProperties", set_field!(min_properties, unsigned))
        .field("required", set_field!(required, string_list))
        .field("enum", |schema, node, context| {
            schema.enum_values = list(node, context, |n, _| Ok(n.value().clone()))?;
            Ok(())
        })
        .field("type", |schema, node, context| {
            schema.schema_type = schema_type(node, context)?.into_iter().collect();
            Ok(())
        })
        .field("allOf", set_field!(all_of, |n, c| list(n, c, load_schema_holder)))
        .field("oneOf", set_field!(one_of, |n, c| list(n, c, load_schema_holder)))
        .field("anyOf", set_field!(any_of, |n, c| list(n, c, load_schema_holder)))
        .field("not", set_some!(not, load_schema_holder))
        .field("items", set_some!(items, load_schema_holder))
        .field("properties", set_field!(properties, |n, c| map(n, c, load_schema_holder)))
        .field("additionalProperties", |schema, node, context| {
            match node.value().as_bool() {
                Some(allowed) => schema.additional_properties_allowed = Some(allowed),
                None => schema.additional_properties = Some(load_schema_holder(node, context)?),
            }
            Ok(())
        })
        .field("description", set_field!(description, string))
        .field("format", set_field!(format, string))
        .field("default", set_any!(default))
        .field("nullable", set_flag!(nullable))
        .field("discriminator", set_some!(discriminator, load_discriminator))
        .field("readOnly", set_field!(read_only, boolean))
        .field("writeOnly", set_field!(write_only, boolean))
        .field("xml", set_some!(xml, load_xml))
        .field("externalDocs", set_some!(external_docs, load_external_docs))
        .field("example", set_any!(example))
        .field("deprecated", set_field!(deprecated, boolean))
}

static SCHEMA_FIELDS: Lazy<FixedFieldMap<Schema>> = Lazy::new(schema_fields);

/// Coerce untyped values and enum members against the schema itself
///
/// Each value is taken out first so the rest of the schema can type it.
pub(super) fn finish_schema(mut schema: Schema) -> Schema {
    if let Some(default) = schema.default.take() {
        schema.default = Some(coerce_any(default, Some(&schema)));
    }
    if let Some(example) = schema.example.take() {
        schema.example = Some(coerce_any(example, Some(&schema)));
    }
    if !schema.enum_values.is_empty() {
        let values = std::mem::take(&mut schema.enum_values);
        schema.enum_values = values
            .into_iter()
            .map(|value| coerce_any(value, Some(&schema)))
            .collect();
    }
    schema
}

/// Fold boolean `exclusiveMaximum`/`exclusiveMinimum` into the numeric bound
pub(super) fn fold_exclusive_bounds(node: &ParseNode<'_>, schema: &mut Schema) {
    if node.get("exclusiveMaximum").and_then(|n| n.as_bool()) == Some(true) {
        schema.exclusive_maximum = schema.maximum.take();
    }
    if node.get("exclusiveMinimum").and_then(|n| n.as_bool()) == Some(true) {
        schema.exclusive_minimum = schema.minimum.take();
    }
}

pub(super) fn load_schema(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Schema> {
    let mut schema: Schema = load_object(node, context, "schema", &SCHEMA_FIELDS)?;
    fold_exclusive_bounds(node, &mut schema);
    Ok(finish_schema(schema))
}

static DISCRIMINATOR_FIELDS: Lazy<FixedFieldMap<Discriminator>> = Lazy::new(|| {
    FixedFieldMap::<Discriminator>::new()
        .field("propertyName", set_field!(property_name, string))
        .field("mapping", |discriminator, node, context| {
            discriminator.mapping = map(node, context, string)?
                .into_iter()
                .filter_map(|(key, target)| target.map(|target| (key, target)))
                .collect();
            Ok(())
        })
});

pub(super) fn load_discriminator(
    node: &ParseNode<'_>,
    context: &mut ParsingContext,
) -> OpenApiResult<Discriminator> {
    load_object(node, context, "discriminator", &DISCRIMINATOR_FIELDS)
}

static XML_FIELDS: Lazy<FixedFieldMap<Xml>> = Lazy::new(|| {
    FixedFieldMap::<Xml>::new()
        .field("name", set_field!(name, string))
        .field("namespace", set_field!(namespace, string))
        .field("prefix", set_field!(prefix, string))
        .field("attribute", set_field!(attribute, boolean))
        .field("wrapped", set_field!(wrapped, boolean))
});

pub(super) fn load_xml(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Xml> {
    load_object(node, context, "xml", &XML_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpenApiSpecVersion;
    use serde_json::json;

    fn context() -> ParsingContext {
        ParsingContext::new(OpenApiSpecVersion::V3_0, false)
    }

    #[test]
    fn test_load_operation() {
        let value = json!({
            "operationId": "listPets",
            "tags": ["pets"],
            "parameters": [
                {"name": "limit", "in": "query", "schema": {"type": "integer"}, "example": "20"},
                {"$ref": "#/components/parameters/Offset"}
            ],
            "responses": {
                "200": {"description": "ok", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pets"}}}},
                "x-internal": true
            },
            "security": [{"api_key": []}]
        });
        let mut context = context();
        let operation = load_operation(&ParseNode::root(&value), &mut context).unwrap();

        assert_eq!(operation.operation_id.as_deref(), Some("listPets"));
        assert_eq!(operation.tags[0].name().as_deref(), Some("pets"));
        assert_eq!(operation.parameters.len(), 2);
        let limit = operation.parameters[0].as_inline().unwrap();
        assert_eq!(limit.example, Some(json!(20)));
        assert_eq!(
            operation.parameters[1].as_reference().unwrap().id,
            "Offset"
        );

        let responses = operation.responses.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses.extensions.get("x-internal"), Some(&json!(true)));
        assert_eq!(
            operation.security.unwrap()[0].scheme_names().collect::<Vec<_>>(),
            vec!["api_key"]
        );
        assert!(!context.diagnostic().has_errors());
    }

    #[test]
    fn test_schema_exclusive_bounds_and_coercion() {
        let value = json!({
            "type": "integer",
            "maximum": 10,
            "exclusiveMaximum": true,
            "minimum": 1,
            "default": "5",
            "example": "7",
            "enum": ["1", "5", 10],
            "additionalProperties": false
        });
        let schema = load_schema(&ParseNode::root(&value), &mut context()).unwrap();

        assert_eq!(schema.exclusive_maximum, Some(10.0));
        assert_eq!(schema.maximum, None);
        assert_eq!(schema.minimum, Some(1.0));
        assert_eq!(schema.default, Some(json!(5)));
        assert_eq!(schema.example, Some(json!(7)));
        assert_eq!(schema.enum_values, vec![json!(1), json!(5), json!(10)]);
        assert_eq!(schema.additional_properties_allowed, Some(false));
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let value = json!({"name": "MIT", "identifier": "MIT"});
        let mut context = context();
        let license = load_license(&ParseNode::root(&value), &mut context).unwrap();

        assert_eq!(license.unrecognized_fields.get("identifier"), Some(&json!("MIT")));
        assert_eq!(context.diagnostic().warnings.len(), 1);
    }

    #[test]
    fn test_bad_enum_values_are_reported() {
        let value = json!({"name": "id", "in": "body", "style": "fancy"});
        let mut context = context();
        let parameter = load_parameter(&ParseNode::root(&value), &mut context).unwrap();

        assert_eq!(parameter.location, None);
        assert_eq!(parameter.style, None);
        let pointers: Vec<_> = context
            .diagnostic()
            .errors
            .iter()
            .map(|d| d.pointer.as_str())
            .collect();
        assert_eq!(pointers, vec!["#/in", "#/style"]);
    }

    #[test]
    fn test_callbacks_and_links() {
        let value = json!({
            "description": "created",
            "links": {
                "GetPet": {"operationId": "getPet", "parameters": {"id": "$response.body#/id", "fixed": 3}}
            }
        });
        let response = load_response(&ParseNode::root(&value), &mut context()).unwrap();
        let link = response.links["GetPet"].as_inline().unwrap();
        assert!(link.parameters["id"].expression().is_some());
        assert!(link.parameters["fixed"].expression().is_none());

        let value = json!({"{$request.body#/callbackUrl}": {"post": {"responses": {"200": {"description": "ok"}}}}});
        let callback = load_callback(&ParseNode::root(&value), &mut context()).unwrap();
        assert_eq!(callback.path_items.len(), 1);
    }
}
