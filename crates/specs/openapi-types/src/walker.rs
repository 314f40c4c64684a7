//! Depth-first traversal of the document model.
//!
//! [`Walker`] visits every node of a document (or of any element) in
//! document order, announcing the JSON pointer segment of each child to the
//! [`Visitor`] before descending into it. Reference holders are visited once
//! by identity: a shared reference or inline value reached twice is skipped
//! the second time, and references are never followed into their targets.

use crate::reference::{Reference, ReferenceHolder};
use crate::{
    Callback, Components, Contact, Discriminator, Encoding, Example, ExternalDocumentation,
    Header, Info, License, Link, MediaType, OAuthFlow, OAuthFlows, OpenApiDocument, Operation,
    Parameter, PathItem, Paths, RequestBody, Response, Responses, Schema, SecurityRequirement,
    SecurityScheme, Server, ServerVariable, Tag, Xml,
};
use indexmap::IndexMap;
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

/// A borrowed view of one node of the document model.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Document(&'a OpenApiDocument),
    Info(&'a Info),
    Contact(&'a Contact),
    License(&'a License),
    Server(&'a Server),
    ServerVariable(&'a ServerVariable),
    Paths(&'a Paths),
    PathItem(&'a PathItem),
    Operation(&'a Operation),
    Parameter(&'a Parameter),
    RequestBody(&'a RequestBody),
    Responses(&'a Responses),
    Response(&'a Response),
    MediaType(&'a MediaType),
    Encoding(&'a Encoding),
    Header(&'a Header),
    Example(&'a Example),
    Link(&'a Link),
    Callback(&'a Callback),
    Schema(&'a Schema),
    Discriminator(&'a Discriminator),
    Xml(&'a Xml),
    Components(&'a Components),
    SecurityRequirement(&'a SecurityRequirement),
    SecurityScheme(&'a SecurityScheme),
    OAuthFlows(&'a OAuthFlows),
    OAuthFlow(&'a OAuthFlow),
    Tag(&'a Tag),
    ExternalDocs(&'a ExternalDocumentation),
    Reference(&'a Arc<Reference>),
}

impl<'a> Node<'a> {
    /// The node's element, for type-keyed dispatch
    pub fn as_any(&self) -> &'a dyn Any {
        match *self {
            Self::Document(n) => n,
            Self::Info(n) => n,
            Self::Contact(n) => n,
            Self::License(n) => n,
            Self::Server(n) => n,
            Self::ServerVariable(n) => n,
            Self::Paths(n) => n,
            Self::PathItem(n) => n,
            Self::Operation(n) => n,
            Self::Parameter(n) => n,
            Self::RequestBody(n) => n,
            Self::Responses(n) => n,
            Self::Response(n) => n,
            Self::MediaType(n) => n,
            Self::Encoding(n) => n,
            Self::Header(n) => n,
            Self::Example(n) => n,
            Self::Link(n) => n,
            Self::Callback(n) => n,
            Self::Schema(n) => n,
            Self::Discriminator(n) => n,
            Self::Xml(n) => n,
            Self::Components(n) => n,
            Self::SecurityRequirement(n) => n,
            Self::SecurityScheme(n) => n,
            Self::OAuthFlows(n) => n,
            Self::OAuthFlow(n) => n,
            Self::Tag(n) => n,
            Self::ExternalDocs(n) => n,
            Self::Reference(n) => &**n,
        }
    }
}

/// Receives the nodes of a walk.
pub trait Visitor {
    /// A child at `segment` is about to be walked
    fn enter(&mut self, _segment: &str) {}

    /// The child most recently entered is done
    fn exit(&mut self) {}

    /// Visit a node, before its children
    fn visit(&mut self, node: Node<'_>);
}

/// An element a [`Walker`] can start from.
pub trait Walkable {
    fn walk<V: Visitor + ?Sized>(&self, walker: &mut Walker<'_, V>);
}

/// Depth-first walker driving a [`Visitor`].
pub struct Walker<'v, V: Visitor + ?Sized> {
    visitor: &'v mut V,
    visited: HashSet<usize>,
}

impl<'v, V: Visitor + ?Sized> Walker<'v, V> {
    pub fn new(visitor: &'v mut V) -> Self {
        Self {
            visitor,
            visited: HashSet::new(),
        }
    }

    /// Walk `element` and everything below it
    pub fn walk<W: Walkable + ?Sized>(&mut self, element: &W) {
        element.walk(self);
    }

    fn visit(&mut self, node: Node<'_>) {
        self.visitor.visit(node);
    }

    fn segment(&mut self, segment: &str, f: impl FnOnce(&mut Self)) {
        self.visitor.enter(segment);
        f(self);
        self.visitor.exit();
    }

    fn each<T>(&mut self, segment: &str, items: &[T], mut f: impl FnMut(&mut Self, &T)) {
        if items.is_empty() {
            return;
        }
        self.segment(segment, |walker| {
            for (index, item) in items.iter().enumerate() {
                walker.segment(&index.to_string(), |walker| f(walker, item));
            }
        });
    }

    fn each_entry<T>(
        &mut self,
        segment: &str,
        entries: &IndexMap<String, T>,
        mut f: impl FnMut(&mut Self, &T),
    ) {
        if entries.is_empty() {
            return;
        }
        self.segment(segment, |walker| {
            for (key, item) in entries {
                walker.segment(key, |walker| f(walker, item));
            }
        });
    }

    fn optional<T>(&mut self, segment: &str, item: Option<&T>, f: impl FnOnce(&mut Self, &T)) {
        if let Some(item) = item {
            self.segment(segment, |walker| f(walker, item));
        }
    }

    /// Visit a reference once, or walk an inline value once
    fn holder<T>(&mut self, holder: &ReferenceHolder<T>, walk_inline: impl FnOnce(&mut Self, &T)) {
        if !self.visited.insert(holder.identity()) {
            return;
        }
        match holder {
            ReferenceHolder::Reference(reference) => self.visit(Node::Reference(reference)),
            ReferenceHolder::Inline(value) => walk_inline(self, &**value),
        }
    }

    pub fn walk_document(&mut self, document: &OpenApiDocument) {
        self.visit(Node::Document(document));
        self.segment("info", |w| w.walk_info(&document.info));
        self.each("servers", &document.servers, Self::walk_server);
        self.optional("paths", document.paths.as_ref(), Self::walk_paths);
        self.each_entry("webhooks", &document.webhooks, |w, item| {
            w.holder(item, Self::walk_path_item)
        });
        self.optional("components", document.components.as_ref(), Self::walk_components);
        self.each("security", &document.security, Self::walk_security_requirement);
        self.each("tags", &document.tags, Self::walk_tag);
        self.optional("externalDocs", document.external_docs.as_ref(), Self::walk_external_docs);
    }

    pub fn walk_info(&mut self, info: &Info) {
        self.visit(Node::Info(info));
        self.optional("contact", info.contact.as_ref(), |w, contact| {
            w.visit(Node::Contact(contact))
        });
        self.optional("license", info.license.as_ref(), |w, license| {
            w.visit(Node::License(license))
        });
    }

    pub fn walk_server(&mut self, server: &Server) {
        self.visit(Node::Server(server));
        self.each_entry("variables", &server.variables, |w, variable| {
            w.visit(Node::ServerVariable(variable))
        });
    }

    pub fn walk_paths(&mut self, paths: &Paths) {
        self.visit(Node::Paths(paths));
        for (path, item) in paths.iter() {
            self.segment(path, |w| w.holder(item, Self::walk_path_item));
        }
    }

    pub fn walk_path_item(&mut self, item: &PathItem) {
        self.visit(Node::PathItem(item));
        for (operation_type, operation) in &item.operations {
            self.segment(operation_type.as_str(), |w| w.walk_operation(operation));
        }
        self.each("servers", &item.servers, Self::walk_server);
        self.each("parameters", &item.parameters, |w, parameter| {
            w.holder(parameter, Self::walk_parameter)
        });
    }

    pub fn walk_operation(&mut self, operation: &Operation) {
        self.visit(Node::Operation(operation));
        self.each("tags", &operation.tags, |w, tag| w.holder(tag, Self::walk_tag));
        self.optional("externalDocs", operation.external_docs.as_ref(), Self::walk_external_docs);
        self.each("parameters", &operation.parameters, |w, parameter| {
            w.holder(parameter, Self::walk_parameter)
        });
        self.optional("requestBody", operation.request_body.as_ref(), |w, body| {
            w.holder(body, Self::walk_request_body)
        });
        self.optional("responses", operation.responses.as_ref(), Self::walk_responses);
        self.each_entry("callbacks", &operation.callbacks, |w, callback| {
            w.holder(callback, Self::walk_callback)
        });
        if let Some(security) = &operation.security {
            self.each("security", security, Self::walk_security_requirement);
        }
        self.each("servers", &operation.servers, Self::walk_server);
    }

    pub fn walk_parameter(&mut self, parameter: &Parameter) {
        self.visit(Node::Parameter(parameter));
        self.walk_schema_field(parameter.schema.as_ref());
        self.walk_examples(&parameter.examples);
        self.walk_content(&parameter.content);
    }

    pub fn walk_header(&mut self, header: &Header) {
        self.visit(Node::Header(header));
        self.walk_schema_field(header.schema.as_ref());
        self.walk_examples(&header.examples);
        self.walk_content(&header.content);
    }

    pub fn walk_request_body(&mut self, body: &RequestBody) {
        self.visit(Node::RequestBody(body));
        self.walk_content(&body.content);
    }

    pub fn walk_responses(&mut self, responses: &Responses) {
        self.visit(Node::Responses(responses));
        for (status, response) in responses.iter() {
            self.segment(status, |w| w.holder(response, Self::walk_response));
        }
    }

    pub fn walk_response(&mut self, response: &Response) {
        self.visit(Node::Response(response));
        self.walk_headers(&response.headers);
        self.walk_content(&response.content);
        self.each_entry("links", &response.links, |w, link| {
            w.holder(link, Self::walk_link)
        });
    }

    pub fn walk_media_type(&mut self, media_type: &MediaType) {
        self.visit(Node::MediaType(media_type));
        self.walk_schema_field(media_type.schema.as_ref());
        self.walk_examples(&media_type.examples);
        self.each_entry("encoding", &media_type.encoding, |w, encoding| {
            w.visit(Node::Encoding(encoding));
            w.walk_headers(&encoding.headers);
        });
    }

    pub fn walk_link(&mut self, link: &Link) {
        self.visit(Node::Link(link));
        self.optional("server", link.server.as_ref(), Self::walk_server);
    }

    pub fn walk_callback(&mut self, callback: &Callback) {
        self.visit(Node::Callback(callback));
        for (expression, item) in &callback.path_items {
            self.segment(&expression.to_string(), |w| w.holder(item, Self::walk_path_item));
        }
    }

    pub fn walk_schema(&mut self, schema: &Schema) {
        self.visit(Node::Schema(schema));
        for (segment, list) in [
            ("allOf", &schema.all_of),
            ("anyOf", &schema.any_of),
            ("oneOf", &schema.one_of),
        ] {
            self.each(segment, list, |w, child| w.holder(child, Self::walk_schema));
        }
        for (segment, child) in [
            ("not", schema.not.as_ref()),
            ("items", schema.items.as_ref()),
        ] {
            self.optional(segment, child, |w, child| w.holder(child, Self::walk_schema));
        }
        self.each_entry("properties", &schema.properties, |w, child| {
            w.holder(child, Self::walk_schema)
        });
        self.optional(
            "additionalProperties",
            schema.additional_properties.as_ref(),
            |w, child| w.holder(child, Self::walk_schema),
        );
        self.optional("discriminator", schema.discriminator.as_ref(), |w, discriminator| {
            w.visit(Node::Discriminator(discriminator))
        });
        self.optional("xml", schema.xml.as_ref(), |w, xml| w.visit(Node::Xml(xml)));
        self.optional("externalDocs", schema.external_docs.as_ref(), Self::walk_external_docs);
        self.each_entry("$defs", &schema.definitions, |w, child| {
            w.holder(child, Self::walk_schema)
        });
    }

    pub fn walk_components(&mut self, components: &Components) {
        self.visit(Node::Components(components));
        self.each_entry("schemas", &components.schemas, |w, c| w.holder(c, Self::walk_schema));
        self.each_entry("responses", &components.responses, |w, c| {
            w.holder(c, Self::walk_response)
        });
        self.each_entry("parameters", &components.parameters, |w, c| {
            w.holder(c, Self::walk_parameter)
        });
        self.walk_examples(&components.examples);
        self.each_entry("requestBodies", &components.request_bodies, |w, c| {
            w.holder(c, Self::walk_request_body)
        });
        self.walk_headers(&components.headers);
        self.each_entry("securitySchemes", &components.security_schemes, |w, c| {
            w.holder(c, Self::walk_security_scheme)
        });
        self.each_entry("links", &components.links, |w, c| w.holder(c, Self::walk_link));
        self.each_entry("callbacks", &components.callbacks, |w, c| {
            w.holder(c, Self::walk_callback)
        });
        self.each_entry("pathItems", &components.path_items, |w, c| {
            w.holder(c, Self::walk_path_item)
        });
    }

    pub fn walk_security_requirement(&mut self, requirement: &SecurityRequirement) {
        self.visit(Node::SecurityRequirement(requirement));
        for entry in &requirement.entries {
            let name = entry
                .scheme
                .as_reference()
                .map(|reference| reference.id.clone())
                .unwrap_or_default();
            self.segment(&name, |w| w.holder(&entry.scheme, Self::walk_security_scheme));
        }
    }

    pub fn walk_security_scheme(&mut self, scheme: &SecurityScheme) {
        self.visit(Node::SecurityScheme(scheme));
        self.optional("flows", scheme.flows.as_ref(), |w, flows| {
            w.visit(Node::OAuthFlows(flows));
            for (name, flow) in flows.iter() {
                w.segment(name, |w| w.visit(Node::OAuthFlow(flow)));
            }
        });
    }

    pub fn walk_tag(&mut self, tag: &Tag) {
        self.visit(Node::Tag(tag));
        self.optional("externalDocs", tag.external_docs.as_ref(), Self::walk_external_docs);
    }

    pub fn walk_external_docs(&mut self, docs: &ExternalDocumentation) {
        self.visit(Node::ExternalDocs(docs));
    }

    fn walk_schema_field(&mut self, schema: Option<&ReferenceHolder<Schema>>) {
        self.optional("schema", schema, |w, schema| w.holder(schema, Self::walk_schema));
    }

    fn walk_examples(&mut self, examples: &IndexMap<String, ReferenceHolder<Example>>) {
        self.each_entry("examples", examples, |w, example| {
            w.holder(example, |w, example| w.visit(Node::Example(example)))
        });
    }

    fn walk_headers(&mut self, headers: &IndexMap<String, ReferenceHolder<Header>>) {
        self.each_entry("headers", headers, |w, header| {
            w.holder(header, Self::walk_header)
        });
    }

    fn walk_content(&mut self, content: &IndexMap<String, MediaType>) {
        self.each_entry("content", content, Self::walk_media_type);
    }
}

macro_rules! walkable {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Walkable for $ty {
                fn walk<V: Visitor + ?Sized>(&self, walker: &mut Walker<'_, V>) {
                    walker.$method(self);
                }
            }
        )*
    };
}

walkable! {
    OpenApiDocument => walk_document,
    Info => walk_info,
    Server => walk_server,
    Paths => walk_paths,
    PathItem => walk_path_item,
    Operation => walk_operation,
    Parameter => walk_parameter,
    Header => walk_header,
    RequestBody => walk_request_body,
    Responses => walk_responses,
    Response => walk_response,
    MediaType => walk_media_type,
    Link => walk_link,
    Callback => walk_callback,
    Schema => walk_schema,
    Components => walk_components,
    SecurityRequirement => walk_security_requirement,
    SecurityScheme => walk_security_scheme,
    Tag => walk_tag,
    ExternalDocumentation => walk_external_docs,
}

impl Walkable for Contact {
    fn walk<V: Visitor + ?Sized>(&self, walker: &mut Walker<'_, V>) {
        walker.visit(Node::Contact(self));
    }
}

impl Walkable for License {
    fn walk<V: Visitor + ?Sized>(&self, walker: &mut Walker<'_, V>) {
        walker.visit(Node::License(self));
    }
}

impl<T> Walkable for ReferenceHolder<T>
where
    T: Walkable,
{
    fn walk<V: Visitor + ?Sized>(&self, walker: &mut Walker<'_, V>) {
        walker.holder(self, |w, value| value.walk(w));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reference, SchemaOrReference};

    #[derive(Default)]
    struct Recorder {
        path: Vec<String>,
        seen: Vec<String>,
    }

    impl Visitor for Recorder {
        fn enter(&mut self, segment: &str) {
            self.path.push(segment.to_string());
        }

        fn exit(&mut self) {
            self.path.pop();
        }

        fn visit(&mut self, node: Node<'_>) {
            let kind = match node {
                Node::Schema(_) => "schema",
                Node::Reference(_) => "reference",
                Node::Components(_) => "components",
                Node::Document(_) => "document",
                Node::Info(_) => "info",
                _ => "other",
            };
            self.seen.push(format!("{kind}@/{}", self.path.join("/")));
        }
    }

    #[test]
    fn test_walk_records_pointers() {
        let pet = Schema::object().with_property("name", Schema::string());
        let document = OpenApiDocument::new(Info::new("Pets", "1.0.0"))
            .with_components(Components::new().with_schema("Pet", pet));

        let mut recorder = Recorder::default();
        Walker::new(&mut recorder).walk(&document);

        assert_eq!(
            recorder.seen,
            vec![
                "document@/",
                "info@/info",
                "components@/components",
                "schema@/components/schemas/Pet",
                "schema@/components/schemas/Pet/properties/name",
            ]
        );
        assert!(recorder.path.is_empty());
    }

    #[test]
    fn test_shared_reference_visited_once() {
        let shared = SchemaOrReference::from_reference(Reference::schema("Pet").unwrap());
        let schema = Schema::object()
            .with_property("a", shared.clone())
            .with_property("b", shared);

        let mut recorder = Recorder::default();
        Walker::new(&mut recorder).walk(&schema);

        let references = recorder
            .seen
            .iter()
            .filter(|entry| entry.starts_with("reference"))
            .count();
        assert_eq!(references, 1);
    }

    #[test]
    fn test_node_as_any_downcasts() {
        let license = License::new("MIT");
        let node = Node::License(&license);
        assert_eq!(
            node.as_any().downcast_ref::<License>().and_then(|l| l.name.as_deref()),
            Some("MIT")
        );
    }
}
