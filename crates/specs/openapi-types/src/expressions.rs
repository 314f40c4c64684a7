//! Runtime expressions.
//!
//! Runtime expressions name a value taken from an HTTP exchange at runtime,
//! e.g. `$request.query.id` or `$response.body#/status`. They appear as
//! callback keys and as link parameter values.
//!
//! ```text
//! expression = ( "$url" / "$method" / "$statusCode" / "$request." source / "$response." source )
//! source     = ( header-reference / query-reference / path-reference / body-reference )
//! ```

use crate::error::{OpenApiError, OpenApiResult};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

const PREFIX: &str = "$";
const URL: &str = "$url";
const METHOD: &str = "$method";
const STATUS_CODE: &str = "$statusCode";
const REQUEST: &str = "$request.";
const RESPONSE: &str = "$response.";

const HEADER: &str = "header.";
const QUERY: &str = "query.";
const PATH: &str = "path.";
const BODY: &str = "body";

/// A parsed runtime expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuntimeExpression {
    /// `$url`
    Url,
    /// `$method`
    Method,
    /// `$statusCode`
    StatusCode,
    /// `$request.<source>`
    Request(SourceExpression),
    /// `$response.<source>`
    Response(SourceExpression),
    /// A string template embedding expressions in braces,
    /// e.g. `http://notify/{$request.body#/id}`
    Composite(CompositeExpression),
}

impl RuntimeExpression {
    /// Parse an expression string.
    ///
    /// Malformed syntax is a [`OpenApiError::ReferenceFormat`] error.
    pub fn build(expression: &str) -> OpenApiResult<Self> {
        if expression.trim().is_empty() {
            return Err(OpenApiError::reference_format(
                "runtime expression cannot be empty",
                expression,
            ));
        }

        if !expression.starts_with(PREFIX) {
            if expression.contains("{$") {
                return CompositeExpression::build(expression).map(Self::Composite);
            }
            return Err(OpenApiError::reference_format(
                "runtime expression must start with '$'",
                expression,
            ));
        }

        match expression {
            URL => return Ok(Self::Url),
            METHOD => return Ok(Self::Method),
            STATUS_CODE => return Ok(Self::StatusCode),
            _ => {}
        }

        if let Some(source) = expression.strip_prefix(REQUEST) {
            return SourceExpression::build(source)
                .map(Self::Request)
                .map_err(|_| invalid(expression));
        }
        if let Some(source) = expression.strip_prefix(RESPONSE) {
            return SourceExpression::build(source)
                .map(Self::Response)
                .map_err(|_| invalid(expression));
        }

        Err(invalid(expression))
    }

    /// The canonical expression string
    pub fn expression(&self) -> String {
        self.to_string()
    }
}

fn invalid(expression: &str) -> OpenApiError {
    OpenApiError::reference_format("invalid runtime expression format", expression)
}

impl fmt::Display for RuntimeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => f.write_str(URL),
            Self::Method => f.write_str(METHOD),
            Self::StatusCode => f.write_str(STATUS_CODE),
            Self::Request(source) => write!(f, "{REQUEST}{source}"),
            Self::Response(source) => write!(f, "{RESPONSE}{source}"),
            Self::Composite(composite) => f.write_str(&composite.template),
        }
    }
}

impl Serialize for RuntimeExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The part of a request or response an expression reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceExpression {
    /// `header.<token>`
    Header(String),
    /// `query.<name>`
    Query(String),
    /// `path.<name>`
    Path(String),
    /// `body` or `body#<json-pointer>`
    Body(Option<String>),
}

impl SourceExpression {
    pub fn build(source: &str) -> OpenApiResult<Self> {
        if let Some(rest) = source.strip_prefix(BODY) {
            if rest.is_empty() {
                return Ok(Self::Body(None));
            }
            if let Some(pointer) = rest.strip_prefix('#') {
                if pointer.is_empty() || pointer.starts_with('/') {
                    return Ok(Self::Body(Some(pointer.to_string())));
                }
            }
            return Err(OpenApiError::reference_format(
                "body source must be 'body' or 'body#<json-pointer>'",
                source,
            ));
        }

        let parts: Vec<&str> = source.split('.').collect();
        if let [_, name] = parts.as_slice() {
            if !name.is_empty() {
                let name = name.to_string();
                if source.starts_with(HEADER) {
                    return Ok(Self::Header(name));
                }
                if source.starts_with(QUERY) {
                    return Ok(Self::Query(name));
                }
                if source.starts_with(PATH) {
                    return Ok(Self::Path(name));
                }
            }
        }

        Err(OpenApiError::reference_format(
            "source must be header.<name>, query.<name>, path.<name> or body",
            source,
        ))
    }
}

impl fmt::Display for SourceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(name) => write!(f, "{HEADER}{name}"),
            Self::Query(name) => write!(f, "{QUERY}{name}"),
            Self::Path(name) => write!(f, "{PATH}{name}"),
            Self::Body(None) => f.write_str(BODY),
            Self::Body(Some(pointer)) => write!(f, "{BODY}#{pointer}"),
        }
    }
}

/// A template string with embedded `{$...}` expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeExpression {
    template: String,
    expressions: Vec<RuntimeExpression>,
}

impl CompositeExpression {
    pub fn build(template: &str) -> OpenApiResult<Self> {
        let mut expressions = Vec::new();
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| {
                OpenApiError::reference_format("unterminated '{' in composite expression", template)
            })?;
            let inner = &after[..end];
            if inner.starts_with(PREFIX) {
                expressions.push(RuntimeExpression::build(inner)?);
            }
            rest = &after[end + 1..];
        }
        Ok(Self {
            template: template.to_string(),
            expressions,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The expressions embedded in the template, in order
    pub fn expressions(&self) -> &[RuntimeExpression] {
        &self.expressions
    }
}

/// A link parameter or request body: either a runtime expression or a
/// constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeExpressionAnyWrapper {
    Expression(RuntimeExpression),
    Any(Value),
}

impl RuntimeExpressionAnyWrapper {
    /// Strings starting with `$` are expressions, everything else a constant.
    pub fn from_value(value: Value) -> OpenApiResult<Self> {
        match &value {
            Value::String(s) if s.starts_with(PREFIX) => RuntimeExpression::build(s).map(Self::Expression),
            _ => Ok(Self::Any(value)),
        }
    }

    pub fn expression(&self) -> Option<&RuntimeExpression> {
        match self {
            Self::Expression(expression) => Some(expression),
            Self::Any(_) => None,
        }
    }
}

impl Serialize for RuntimeExpressionAnyWrapper {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Expression(expression) => expression.serialize(serializer),
            Self::Any(value) => value.serialize(serializer),
        }
    }
}
