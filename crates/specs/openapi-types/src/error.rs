//! Error types for OpenAPI document reading and reference resolution.
//!
//! Only conditions that make a document impossible to interpret raise an
//! [`OpenApiError`]. Unresolved references and validation findings are data,
//! see [`crate::Diagnostic`].

use thiserror::Error;

/// Errors that interrupt reading or resolving an OpenAPI document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpenApiError {
    /// A structural problem found while parsing in strict mode
    #[error("Structural error at {pointer}: {message}")]
    Structural {
        /// Human-readable error message
        message: String,
        /// JSON pointer of the offending node
        pointer: String,
    },

    /// A reference or runtime expression string that matches no recognized pattern
    #[error("Invalid reference format '{reference}': {message}")]
    ReferenceFormat {
        /// Why the string was rejected
        message: String,
        /// The rejected reference string
        reference: String,
    },

    /// A cycle was found while walking nested schema locations
    #[error("Circular reference detected while resolving schema: {location}")]
    CircularReference {
        /// The location whose resolution revisited a schema
        location: String,
    },

    /// A public operation received an empty or missing argument
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        /// Name of the argument
        argument: String,
        /// What was wrong with it
        message: String,
    },

    /// A component kind that has no bucket under `components`
    #[error("Invalid component type {type_name}")]
    InvalidComponentType {
        /// Display name of the rejected kind
        type_name: String,
    },

    /// The document declares a version this crate cannot read
    #[error("Unsupported OpenAPI version: {version}")]
    UnsupportedVersion {
        /// The declared version string
        version: String,
    },

    /// Error when parsing JSON input
    #[error("JSON error: {message}")]
    Json {
        /// JSON parsing error message
        message: String,
    },

    /// Error when parsing YAML input
    #[error("YAML error: {message}")]
    Yaml {
        /// YAML parsing error message
        message: String,
    },

    /// A vendor extension payload that does not fit its typed form
    #[error("Invalid extension '{name}': {message}")]
    Extension {
        /// Extension field name
        name: String,
        /// Why the payload was rejected
        message: String,
    },
}

impl OpenApiError {
    /// Create a new structural error
    pub fn structural(message: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
            pointer: pointer.into(),
        }
    }

    /// Create a new reference format error
    pub fn reference_format(message: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::ReferenceFormat {
            message: message.into(),
            reference: reference.into(),
        }
    }

    /// Create a new circular reference error
    pub fn circular_reference(location: impl Into<String>) -> Self {
        Self::CircularReference {
            location: location.into(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid component type error
    pub fn invalid_component_type(type_name: impl Into<String>) -> Self {
        Self::InvalidComponentType {
            type_name: type_name.into(),
        }
    }

    /// Create a new unsupported version error
    pub fn unsupported_version(version: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            version: version.into(),
        }
    }

    /// Create a new extension error
    pub fn extension(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extension {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The JSON pointer carried by this error, if any
    pub fn pointer(&self) -> Option<&str> {
        match self {
            Self::Structural { pointer, .. } => Some(pointer),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for OpenApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for OpenApiError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: err.to_string(),
        }
    }
}

/// Result type for OpenAPI operations
pub type OpenApiResult<T> = Result<T, OpenApiError>;

/// Fail with [`OpenApiError::InvalidArgument`] when `value` is empty.
pub(crate) fn check_argument_not_empty(argument: &str, value: &str) -> OpenApiResult<()> {
    if value.trim().is_empty() {
        return Err(OpenApiError::invalid_argument(
            argument,
            "Value cannot be null or empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = OpenApiError::structural("missing info", "#/");
        assert!(matches!(err, OpenApiError::Structural { .. }));
        assert_eq!(err.pointer(), Some("#/"));

        let err = OpenApiError::circular_reference("#/components/schemas/A");
        assert_eq!(err.pointer(), None);
    }

    #[test]
    fn test_error_display() {
        let err = OpenApiError::reference_format("expected a fragment", "#foo");
        assert_eq!(
            err.to_string(),
            "Invalid reference format '#foo': expected a fragment"
        );

        let err = OpenApiError::circular_reference("#/components/schemas/A/items");
        assert_eq!(
            err.to_string(),
            "Circular reference detected while resolving schema: #/components/schemas/A/items"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());

        let openapi_err: OpenApiError = json_err.unwrap_err().into();
        assert!(matches!(openapi_err, OpenApiError::Json { .. }));
    }

    #[test]
    fn test_check_argument_not_empty() {
        assert!(check_argument_not_empty("id", "Pet").is_ok());
        assert!(matches!(
            check_argument_not_empty("id", "  "),
            Err(OpenApiError::InvalidArgument { .. })
        ));
    }
}
