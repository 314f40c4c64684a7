//! OpenAPI specification versions understood by the reader.

use crate::error::{OpenApiError, OpenApiResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The three serialized syntaxes this crate reads into one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenApiSpecVersion {
    /// Swagger 2.0
    #[serde(rename = "2.0")]
    V2_0,
    /// OpenAPI 3.0.x
    #[serde(rename = "3.0")]
    V3_0,
    /// OpenAPI 3.1.x
    #[serde(rename = "3.1")]
    V3_1,
}

impl OpenApiSpecVersion {
    /// Parse a declared version string (`"2.0"`, `"3.0.3"`, `"3.1.0"`, ...)
    pub fn from_declared(version: &str) -> OpenApiResult<Self> {
        let trimmed = version.trim();
        if trimmed == "2.0" {
            return Ok(Self::V2_0);
        }
        if trimmed == "3.0" || trimmed.starts_with("3.0.") {
            return Ok(Self::V3_0);
        }
        if trimmed == "3.1" || trimmed.starts_with("3.1.") {
            return Ok(Self::V3_1);
        }
        Err(OpenApiError::unsupported_version(trimmed))
    }

    /// Detect the version from the root node of a parsed document.
    ///
    /// Looks at `swagger` first, then `openapi`. A root without either field,
    /// or with an unrecognized value, is an unsupported version.
    pub fn detect(root: &Value) -> OpenApiResult<Self> {
        let declared = root
            .get("swagger")
            .or_else(|| root.get("openapi"))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .ok_or_else(|| OpenApiError::unsupported_version("<missing>"))?;
        Self::from_declared(&declared)
    }

    pub fn is_v2(&self) -> bool {
        matches!(self, Self::V2_0)
    }
}

impl fmt::Display for OpenApiSpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::V2_0 => "2.0",
            Self::V3_0 => "3.0",
            Self::V3_1 => "3.1",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_declared() {
        assert_eq!(
            OpenApiSpecVersion::from_declared("2.0").unwrap(),
            OpenApiSpecVersion::V2_0
        );
        assert_eq!(
            OpenApiSpecVersion::from_declared("3.0.3").unwrap(),
            OpenApiSpecVersion::V3_0
        );
        assert_eq!(
            OpenApiSpecVersion::from_declared("3.1.0").unwrap(),
            OpenApiSpecVersion::V3_1
        );
        assert!(OpenApiSpecVersion::from_declared("4.0.0").is_err());
        assert!(OpenApiSpecVersion::from_declared("3.10.0").is_err());
    }

    #[test]
    fn test_detect() {
        let root = json!({"swagger": "2.0"});
        assert_eq!(
            OpenApiSpecVersion::detect(&root).unwrap(),
            OpenApiSpecVersion::V2_0
        );

        let root = json!({"openapi": "3.1.0"});
        assert_eq!(
            OpenApiSpecVersion::detect(&root).unwrap(),
            OpenApiSpecVersion::V3_1
        );

        let root = json!({"info": {}});
        assert!(matches!(
            OpenApiSpecVersion::detect(&root),
            Err(OpenApiError::UnsupportedVersion { .. })
        ));
    }
}
