//! Declarative field dispatch for the per-version deserializers.
//!
//! Each model type gets a [`FixedFieldMap`] of exact field names and, where
//! it has patterned fields (path templates, status codes, callback
//! expressions), a [`PatternFieldMap`] of predicates. [`parse_map`] routes
//! every field of a map node through them, then stores `x-` fields as
//! extensions; anything else is kept verbatim on the target.
//!
//! Fields holding untyped values (`example`, `default`, example `value`)
//! are filled raw during the first pass and coerced against the sibling
//! schema afterwards by [`process_any_fields`] / [`process_any_map_fields`],
//! since the schema may appear after the value in the document.

use super::any::coerce_any;
use super::context::ParsingContext;
use super::parse_node::ParseNode;
use crate::error::OpenApiResult;
use crate::extensions::is_extension_key;
use crate::reference::{ReferenceHolder, Referenceable};
use crate::{Extensions, Schema, UnrecognizedFields};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Handler for one fixed field
pub type FieldHandler<T> = fn(&mut T, &ParseNode<'_>, &mut ParsingContext) -> OpenApiResult<()>;

/// Handler for a patterned field; receives the field name
pub type PatternHandler<T> =
    fn(&mut T, &str, &ParseNode<'_>, &mut ParsingContext) -> OpenApiResult<()>;

/// Model types with room for vendor extensions and unknown fields.
pub(crate) trait Extensible {
    fn extensions_mut(&mut self) -> &mut Extensions;

    /// Bag for fields no table recognized; `None` when the type has none
    fn unrecognized_fields_mut(&mut self) -> Option<&mut UnrecognizedFields>;
}

macro_rules! extensible {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::reader::field_map::Extensible for $ty {
                fn extensions_mut(&mut self) -> &mut $crate::Extensions {
                    &mut self.extensions
                }

                fn unrecognized_fields_mut(&mut self) -> Option<&mut $crate::UnrecognizedFields> {
                    Some(&mut self.unrecognized_fields)
                }
            }
        )+
    };
}

extensible!(
    crate::OpenApiDocument,
    crate::Info,
    crate::Contact,
    crate::License,
    crate::Server,
    crate::ServerVariable,
    crate::Components,
    crate::PathItem,
    crate::Operation,
    crate::Parameter,
    crate::RequestBody,
    crate::MediaType,
    crate::Encoding,
    crate::Response,
    crate::Header,
    crate::Example,
    crate::Link,
    crate::Callback,
    crate::Schema,
    crate::Discriminator,
    crate::Xml,
    crate::SecurityScheme,
    crate::OAuthFlows,
    crate::OAuthFlow,
    crate::Tag,
    crate::ExternalDocumentation,
);

impl Extensible for crate::Paths {
    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    fn unrecognized_fields_mut(&mut self) -> Option<&mut UnrecognizedFields> {
        None
    }
}

impl Extensible for crate::Responses {
    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    fn unrecognized_fields_mut(&mut self) -> Option<&mut UnrecognizedFields> {
        None
    }
}

/// Exact field name to handler.
pub struct FixedFieldMap<T> {
    handlers: HashMap<&'static str, FieldHandler<T>>,
}

impl<T> FixedFieldMap<T> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Add or replace the handler for `name`
    pub fn field(mut self, name: &'static str, handler: FieldHandler<T>) -> Self {
        self.handlers.insert(name, handler);
        self
    }

    /// Drop the handler for `name`
    pub fn without(mut self, name: &str) -> Self {
        self.handlers.remove(name);
        self
    }

    /// Keep only the handlers for `names`
    pub fn retain(mut self, names: &[&str]) -> Self {
        self.handlers.retain(|name, _| names.contains(name));
        self
    }

    pub fn get(&self, name: &str) -> Option<FieldHandler<T>> {
        self.handlers.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for FixedFieldMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Predicate over field names to handler, tried in order.
pub struct PatternFieldMap<T> {
    patterns: Vec<(fn(&str) -> bool, PatternHandler<T>)>,
}

impl<T> PatternFieldMap<T> {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn pattern(mut self, matches: fn(&str) -> bool, handler: PatternHandler<T>) -> Self {
        self.patterns.push((matches, handler));
        self
    }

    pub fn find(&self, name: &str) -> Option<PatternHandler<T>> {
        self.patterns
            .iter()
            .find(|(matches, _)| matches(name))
            .map(|(_, handler)| *handler)
    }
}

impl<T> Default for PatternFieldMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Route every field of `node` into `target`.
///
/// Fixed fields win over patterns; patterns over vendor extensions.
///
/// A node that is not a map is a structural error; `target` is left as is.
pub(crate) fn parse_map<T: Extensible>(
    node: &ParseNode<'_>,
    target: &mut T,
    object: &str,
    fixed: &FixedFieldMap<T>,
    patterns: &PatternFieldMap<T>,
    context: &mut ParsingContext,
) -> OpenApiResult<()> {
    if !node.is_map() {
        return context.report(node.pointer(), format!("{object} must be a map/object"));
    }
    for (name, child) in node.entries() {
        if let Some(handler) = fixed.get(name) {
            handler(target, &child, context)?;
        } else if let Some(handler) = patterns.find(name) {
            handler(target, name, &child, context)?;
        } else if is_extension_key(name) {
            target.extensions_mut().try_insert(name, child.value().clone())?;
        } else {
            context.unrecognized(&child, name);
            match target.unrecognized_fields_mut() {
                Some(fields) => fields.insert(name, child.value().clone()),
                None => context.warn(child.pointer(), format!("Field '{name}' dropped from {object}")),
            }
        }
    }
    Ok(())
}

/// Accessors for one untyped field and the schema that types it.
pub struct AnyFieldMapParameter<T> {
    pub get: fn(&T) -> Option<&Value>,
    pub set: fn(&mut T, Value),
    pub schema: fn(&T) -> Option<Arc<Schema>>,
}

pub type AnyFieldMap<T> = Vec<(&'static str, AnyFieldMapParameter<T>)>;

/// Coerce each untyped field present on `target` against its schema.
pub(crate) fn process_any_fields<T>(target: &mut T, fields: &AnyFieldMap<T>) {
    for (_, parameter) in fields {
        let Some(value) = (parameter.get)(target).cloned() else {
            continue;
        };
        let schema = (parameter.schema)(target);
        (parameter.set)(target, coerce_any(value, schema.as_deref()));
    }
}

/// Accessors for a map of elements each holding an untyped field, such as
/// `examples`, typed by a schema on the owner.
pub struct AnyMapFieldMapParameter<T, U> {
    pub map: fn(&mut T) -> &mut IndexMap<String, ReferenceHolder<U>>,
    pub get: fn(&U) -> Option<&Value>,
    pub set: fn(&mut U, Value),
    pub schema: fn(&T) -> Option<Arc<Schema>>,
}

pub type AnyMapFieldMap<T, U> = Vec<(&'static str, AnyMapFieldMapParameter<T, U>)>;

/// Coerce the untyped field of every inline element of each mapped field.
pub(crate) fn process_any_map_fields<T, U: Referenceable>(
    target: &mut T,
    fields: &AnyMapFieldMap<T, U>,
) {
    for (_, parameter) in fields {
        let schema = (parameter.schema)(target);
        for holder in (parameter.map)(target).values_mut() {
            let Some(element) = holder.make_inline_mut() else {
                continue;
            };
            if let Some(value) = (parameter.get)(element).cloned() {
                (parameter.set)(element, coerce_any(value, schema.as_deref()));
            }
        }
    }
}

/// Scalar field as a string; other shapes are reported
pub(crate) fn string(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Option<String>> {
    match node.as_string() {
        Some(value) => Ok(Some(value)),
        None if node.value().is_null() => Ok(None),
        None => {
            context.report(node.pointer(), "Expected a scalar value")?;
            Ok(None)
        }
    }
}

pub(crate) fn boolean(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Option<bool>> {
    match node.as_bool() {
        Some(value) => Ok(Some(value)),
        None => {
            context.report(node.pointer(), "Expected a boolean value")?;
            Ok(None)
        }
    }
}

pub(crate) fn number(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Option<f64>> {
    match node.as_f64() {
        Some(value) => Ok(Some(value)),
        None => {
            context.report(node.pointer(), "Expected a numeric value")?;
            Ok(None)
        }
    }
}

pub(crate) fn unsigned(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Option<u64>> {
    match node.as_u64() {
        Some(value) => Ok(Some(value)),
        None => {
            context.report(node.pointer(), "Expected a non-negative integer")?;
            Ok(None)
        }
    }
}

/// A sequence of scalars
pub(crate) fn string_list(node: &ParseNode<'_>, context: &mut ParsingContext) -> OpenApiResult<Vec<String>> {
    list(node, context, |item, context| string(item, context))
        .map(|items| items.into_iter().flatten().collect())
}

/// Load every item of a sequence node
pub(crate) fn list<'a, X>(
    node: &ParseNode<'a>,
    context: &mut ParsingContext,
    mut load: impl FnMut(&ParseNode<'a>, &mut ParsingContext) -> OpenApiResult<X>,
) -> OpenApiResult<Vec<X>> {
    let Some(items) = node.items() else {
        context.report(node.pointer(), "Expected a sequence")?;
        return Ok(Vec::new());
    };
    items.iter().map(|item| load(item, context)).collect()
}

/// Load every value of a map node, keyed by field name
pub(crate) fn map<'a, X>(
    node: &ParseNode<'a>,
    context: &mut ParsingContext,
    mut load: impl FnMut(&ParseNode<'a>, &mut ParsingContext) -> OpenApiResult<X>,
) -> OpenApiResult<IndexMap<String, X>> {
    if !node.is_map() {
        context.report(node.pointer(), "Expected a map/object")?;
        return Ok(IndexMap::new());
    }
    node.entries()
        .into_iter()
        .map(|(key, child)| Ok((key.to_string(), load(&child, context)?)))
        .collect()
}
