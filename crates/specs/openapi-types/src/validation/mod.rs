//! Rule-based validation of the document model.
//!
//! A [`Validator`] walks the model with a [`Walker`] and, for every node,
//! runs the rules of a [`ValidationRuleSet`] registered for the node's type.
//! Rules report through a [`ValidationContext`] that tracks the JSON pointer
//! of the node being checked; rules `enter`/`exit` field segments around
//! their checks so each diagnostic points at the offending field.
//!
//! Findings are [`Diagnostic`] data. A walk always completes.
//!
//! ```rust
//! use openapi_types::License;
//! use openapi_types::validation::{Validate, ValidationRuleSet};
//!
//! let diagnostics = License::default().validate(&ValidationRuleSet::default_rule_set());
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].pointer, "#/name");
//! ```

pub mod rules;

use crate::Diagnostic;
use crate::location::pointer_from_segments;
use crate::walker::{Node, Visitor, Walkable, Walker};
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type RuleFn = dyn Fn(&mut ValidationContext, &dyn Any) + Send + Sync;

/// A named check that applies to one element type.
pub struct ValidationRule {
    name: String,
    element_type: TypeId,
    element_name: &'static str,
    validate: Box<RuleFn>,
}

impl ValidationRule {
    /// Create a rule validating elements of type `T`
    pub fn new<T: Any>(
        name: impl Into<String>,
        validate: impl Fn(&mut ValidationContext, &T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            element_type: TypeId::of::<T>(),
            element_name: std::any::type_name::<T>(),
            validate: Box::new(move |context, element| {
                if let Some(element) = element.downcast_ref::<T>() {
                    validate(context, element);
                }
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the rule validates elements of the given type
    pub fn applies_to(&self, element_type: TypeId) -> bool {
        self.element_type == element_type
    }

    /// Run the rule against `element`, reporting under the rule's name
    pub fn evaluate(&self, context: &mut ValidationContext, element: &dyn Any) {
        context.current_rule = Some(self.name.clone());
        (self.validate)(context, element);
        context.current_rule = None;
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("element", &self.element_name)
            .finish()
    }
}

static DEFAULT_RULES: Lazy<Vec<Arc<ValidationRule>>> =
    Lazy::new(|| rules::default_rules().into_iter().map(Arc::new).collect());

/// An ordered collection of rules, looked up by element type.
#[derive(Debug, Clone, Default)]
pub struct ValidationRuleSet {
    rules: Vec<Arc<ValidationRule>>,
}

impl ValidationRuleSet {
    /// The built-in rules
    pub fn default_rule_set() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }

    /// A set with no rules
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a rule; a rule with the same name is replaced
    pub fn add(&mut self, rule: ValidationRule) -> &mut Self {
        self.remove(rule.name());
        self.rules.push(Arc::new(rule));
        self
    }

    /// Remove the rule named `name`; returns whether one was removed
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.name() != name);
        self.rules.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rules validating elements of the given type, in insertion order
    pub fn rules_for(&self, element_type: TypeId) -> impl Iterator<Item = &ValidationRule> {
        self.rules
            .iter()
            .map(Arc::as_ref)
            .filter(move |rule| rule.applies_to(element_type))
    }
}

/// Mutable state handed to rules: the current pointer and the findings.
#[derive(Debug, Default)]
pub struct ValidationContext {
    path: Vec<String>,
    current_rule: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into a field or index
    pub fn enter(&mut self, segment: impl Into<String>) {
        self.path.push(segment.into());
    }

    /// Leave the segment most recently entered
    pub fn exit(&mut self) {
        self.path.pop();
    }

    /// JSON pointer of the current position
    pub fn pointer(&self) -> String {
        pointer_from_segments(self.path.iter().map(String::as_str))
    }

    pub fn create_error(&mut self, message: impl Into<String>) {
        let diagnostic = Diagnostic::error(message, self.pointer());
        self.record(diagnostic);
    }

    pub fn create_warning(&mut self, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(message, self.pointer());
        self.record(diagnostic);
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match &self.current_rule {
            Some(rule) => diagnostic.with_rule(rule.clone()),
            None => diagnostic,
        };
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Visitor applying a rule set to every node it is shown.
pub struct Validator<'r> {
    rule_set: &'r ValidationRuleSet,
    context: ValidationContext,
}

impl<'r> Validator<'r> {
    pub fn new(rule_set: &'r ValidationRuleSet) -> Self {
        Self {
            rule_set,
            context: ValidationContext::new(),
        }
    }

    /// Walk `element` and apply the rules to it and everything below it
    pub fn validate<W: Walkable + ?Sized>(&mut self, element: &W) {
        Walker::new(self).walk(element);
        debug!(
            "Validated with {} rules, {} diagnostics",
            self.rule_set.rule_count(),
            self.context.diagnostics().len()
        );
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.context.diagnostics().iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.context.diagnostics().iter().filter(|d| !d.is_error())
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.context.into_diagnostics()
    }
}

impl Visitor for Validator<'_> {
    fn enter(&mut self, segment: &str) {
        self.context.enter(segment);
    }

    fn exit(&mut self) {
        self.context.exit();
    }

    fn visit(&mut self, node: Node<'_>) {
        let element = node.as_any();
        for rule in self.rule_set.rules_for(element.type_id()) {
            rule.evaluate(&mut self.context, element);
        }
    }
}

/// Validate an element and everything below it.
pub trait Validate {
    fn validate(&self, rule_set: &ValidationRuleSet) -> Vec<Diagnostic>;
}

impl<T: Walkable + ?Sized> Validate for T {
    fn validate(&self, rule_set: &ValidationRuleSet) -> Vec<Diagnostic> {
        let mut validator = Validator::new(rule_set);
        validator.validate(self);
        validator.into_diagnostics()
    }
}

/// Whether `email` looks like an email address: a non-empty local part,
/// `@`, and a domain containing a dot.
pub fn is_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && domain.contains('.')
        }
        None => false,
    }
}

/// Whether `key` matches `^[a-zA-Z0-9\.\-_]+$`
pub fn is_valid_component_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_')
}
