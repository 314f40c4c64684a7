//! Specification extensions and unrecognized field retention.
//!
//! Every model object carries two open-ended bags: [`Extensions`] for
//! `x-` prefixed vendor fields, and [`UnrecognizedFields`] for anything the
//! reader did not recognize for the declared format version. Both serialize
//! flattened into their owning object so nothing read is lost on the way out.

use crate::error::{OpenApiError, OpenApiResult};
use crate::location::EXTENSION_FIELD_NAME_PREFIX;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether `key` names a vendor extension field (`x-`, any case).
pub fn is_extension_key(key: &str) -> bool {
    key.get(..EXTENSION_FIELD_NAME_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(EXTENSION_FIELD_NAME_PREFIX))
}

/// A map of extension fields that can be added to any OpenAPI object.
///
/// Extensions are patterned fields prefixed by `x-` (matched
/// case-insensitively). The value can be null, a primitive, an array or an
/// object. Insertion order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Extensions(IndexMap<String, Value>);

impl Extensions {
    /// Create a new empty extensions map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an extension field
    ///
    /// # Panics
    ///
    /// Panics when `key` does not start with `x-`. Use [`Extensions::try_insert`]
    /// for keys coming from untrusted input.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if !is_extension_key(&key) {
            panic!("Extension keys must start with 'x-': {}", key);
        }
        self.0.insert(key, value.into());
        self
    }

    /// Insert an extension field, rejecting keys without the `x-` prefix
    pub fn try_insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> OpenApiResult<()> {
        let key = key.into();
        if !is_extension_key(&key) {
            return Err(OpenApiError::extension(key, "Extension keys must start with 'x-'"));
        }
        self.0.insert(key, value.into());
        Ok(())
    }

    /// Get an extension field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Remove an extension field
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Check if an extension field exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over all extension key-value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Check if extensions map is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of extensions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Builder pattern for adding extensions
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Read a typed extension.
    ///
    /// `None` when the field is absent, `Some(Err(..))` when it is present but
    /// its payload does not fit the typed form.
    pub fn get_typed<E: OpenApiExtension>(&self) -> Option<OpenApiResult<E>> {
        self.get(E::NAME).map(E::parse)
    }

    /// Store a typed extension under its well-known name
    pub fn insert_typed<E: OpenApiExtension>(&mut self, extension: &E) -> &mut Self {
        self.0.insert(E::NAME.to_string(), extension.to_value());
        self
    }
}

impl<'a> IntoIterator for &'a Extensions {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Helper macro for creating extensions
#[macro_export]
macro_rules! extensions {
    () => {
        $crate::Extensions::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut ext = $crate::Extensions::new();
        $(
            ext.insert($key, $value);
        )+
        ext
    }};
}

/// Fields the reader found but did not model for the declared version.
///
/// Kept verbatim, in document order, and re-emitted on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UnrecognizedFields(IndexMap<String, Value>);

impl UnrecognizedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A vendor extension with a typed payload.
pub trait OpenApiExtension: Sized {
    /// The `x-` field name the extension lives under
    const NAME: &'static str;

    /// Interpret the raw extension value
    fn parse(value: &Value) -> OpenApiResult<Self>;

    /// Render back into an untyped value
    fn to_value(&self) -> Value;
}

fn scalar_text<'a>(name: &str, value: &'a Value) -> OpenApiResult<Option<std::borrow::Cow<'a, str>>> {
    match value {
        Value::Bool(b) => Ok(Some(b.to_string().into())),
        Value::String(s) => Ok(Some(s.as_str().into())),
        Value::Number(n) => Ok(Some(n.to_string().into())),
        _ => Err(OpenApiError::extension(name, "Expected a scalar value")),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// `x-ms-primary-error-message`: marks a property as carrying the primary
/// error message of an error response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrimaryErrorMessageExtension {
    pub is_primary_error_message: bool,
}

impl OpenApiExtension for PrimaryErrorMessageExtension {
    const NAME: &'static str = "x-ms-primary-error-message";

    fn parse(value: &Value) -> OpenApiResult<Self> {
        let text = scalar_text(Self::NAME, value)?;
        Ok(Self {
            is_primary_error_message: text.as_deref().and_then(parse_bool).unwrap_or(false),
        })
    }

    fn to_value(&self) -> Value {
        Value::Bool(self.is_primary_error_message)
    }
}

/// `x-ms-reserved-parameter`: marks a parameter as reserved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReservedParameterExtension {
    pub is_reserved: Option<bool>,
}

impl OpenApiExtension for ReservedParameterExtension {
    const NAME: &'static str = "x-ms-reserved-parameter";

    fn parse(value: &Value) -> OpenApiResult<Self> {
        let text = scalar_text(Self::NAME, value)?;
        Ok(Self {
            is_reserved: text.as_deref().and_then(parse_bool),
        })
    }

    fn to_value(&self) -> Value {
        self.is_reserved.map(Value::Bool).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extensions_creation() {
        let mut ext = Extensions::new();
        ext.insert("x-custom", "value");
        ext.insert("X-Number", 42);

        assert_eq!(ext.get("x-custom"), Some(&json!("value")));
        assert_eq!(ext.get("X-Number"), Some(&json!(42)));
        assert_eq!(ext.len(), 2);
    }

    #[test]
    #[should_panic(expected = "Extension keys must start with 'x-'")]
    fn test_invalid_extension_key() {
        let mut ext = Extensions::new();
        ext.insert("invalid-key", "value");
    }

    #[test]
    fn test_try_insert_rejects_plain_keys() {
        let mut ext = Extensions::new();
        assert!(ext.try_insert("x-ok", true).is_ok());
        assert!(matches!(
            ext.try_insert("summary", "nope"),
            Err(OpenApiError::Extension { .. })
        ));
        assert_eq!(ext.len(), 1);
    }

    #[test]
    fn test_extensions_preserve_order_in_serialization() {
        let ext = extensions![
            "x-zeta" => 1,
            "x-alpha" => 2,
        ];
        let json = serde_json::to_string(&ext).unwrap();
        assert_eq!(json, r#"{"x-zeta":1,"x-alpha":2}"#);
    }

    #[test]
    fn test_unrecognized_fields() {
        let mut fields = UnrecognizedFields::new();
        fields.insert("futureField", json!({"nested": [1, 2]}));
        assert_eq!(fields.get("futureField"), Some(&json!({"nested": [1, 2]})));
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_primary_error_message_extension() {
        let ext = PrimaryErrorMessageExtension::parse(&json!(true)).unwrap();
        assert!(ext.is_primary_error_message);

        let ext = PrimaryErrorMessageExtension::parse(&json!("False")).unwrap();
        assert!(!ext.is_primary_error_message);

        assert!(PrimaryErrorMessageExtension::parse(&json!({"a": 1})).is_err());
        assert!(PrimaryErrorMessageExtension::parse(&json!([true])).is_err());
    }

    #[test]
    fn test_reserved_parameter_extension() {
        assert_eq!(
            ReservedParameterExtension::parse(&json!("true")).unwrap().is_reserved,
            Some(true)
        );
        assert_eq!(
            ReservedParameterExtension::parse(&json!("maybe")).unwrap().is_reserved,
            None
        );
        assert!(ReservedParameterExtension::parse(&Value::Null).is_err());
    }

    #[test]
    fn test_typed_extension_roundtrip_through_bag() {
        let mut ext = Extensions::new();
        ext.insert_typed(&ReservedParameterExtension {
            is_reserved: Some(true),
        });
        let typed = ext.get_typed::<ReservedParameterExtension>().unwrap().unwrap();
        assert_eq!(typed.is_reserved, Some(true));
        assert!(ext.get_typed::<PrimaryErrorMessageExtension>().is_none());
    }
}
