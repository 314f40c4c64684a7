//! Callback Object.

use crate::reference::{ReferenceHolder, referenceable_component};
use crate::{Extensions, PathItemOrReference, RuntimeExpression, UnrecognizedFields};
use indexmap::IndexMap;
use serde::Serialize;

/// A callback inline, or a reference to one
pub type CallbackOrReference = ReferenceHolder<Callback>;

/// Out-of-band requests related to the parent operation, keyed by the
/// runtime expression that computes the callback URL.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Callback {
    #[serde(flatten)]
    pub path_items: IndexMap<RuntimeExpression, PathItemOrReference>,

    /// Specification extensions
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,

    #[serde(flatten, skip_serializing_if = "UnrecognizedFields::is_empty")]
    pub unrecognized_fields: UnrecognizedFields,
}

impl Callback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_item(
        mut self,
        expression: RuntimeExpression,
        path_item: impl Into<PathItemOrReference>,
    ) -> Self {
        self.path_items.insert(expression, path_item.into());
        self
    }
}

referenceable_component!(Callback, |_target, _reference| {});
