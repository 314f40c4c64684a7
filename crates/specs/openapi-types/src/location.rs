//! Component location utilities.
//!
//! A location is a document base URL plus a fragment path such as
//! `#/components/schemas/Pet`. Two locations are the same when their
//! normalized absolute forms are character-identical: scheme, host and path
//! follow URL normalization, the fragment is compared case-sensitively.

use std::borrow::Cow;
use url::Url;

/// Base of the synthetic in-memory locations given to documents and workspaces
/// that were not loaded from a real URL.
pub const BASE_REGISTRY_URI: &str = "https://openapi.net/";

/// Fragment prefix under which every component bucket lives
pub const COMPONENTS_SEGMENT: &str = "/components/";

/// Canonical prefix of a schema component location
pub const SCHEMA_COMPONENTS_SEGMENT: &str = "#/components/schemas/";

/// Prefix of vendor extension field names, matched case-insensitively
pub const EXTENSION_FIELD_NAME_PREFIX: &str = "x-";

/// A fresh synthetic base URL, unique per call.
pub fn synthetic_base_url() -> Url {
    let raw = format!("{}{}", BASE_REGISTRY_URI, uuid::Uuid::new_v4());
    // BASE_REGISTRY_URI is absolute and a UUID is URL-safe.
    Url::parse(&raw).unwrap_or_else(|_| default_registry_url())
}

/// The fixed registry URL used by a workspace created without a base.
pub fn default_registry_url() -> Url {
    Url::parse(BASE_REGISTRY_URI).expect("BASE_REGISTRY_URI is a valid absolute URL")
}

/// Resolve `location` against `base` into its normalized absolute form.
pub fn to_location_url(base: &Url, location: &str) -> Option<Url> {
    base.join(location).ok()
}

/// Location of a named component inside a document.
pub fn component_location(document_base: &str, bucket: &str, key: &str) -> String {
    format!("{document_base}#{COMPONENTS_SEGMENT}{bucket}/{key}")
}

/// Split a location into the part before `#` and the fragment after it.
pub fn split_fragment(location: &str) -> (&str, Option<&str>) {
    match location.split_once('#') {
        Some((resource, fragment)) => (resource, Some(fragment)),
        None => (location, None),
    }
}

/// Split a fragment into its non-empty `/`-separated segments.
pub fn fragment_segments(fragment: &str) -> Vec<&str> {
    fragment
        .trim_start_matches('#')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Escape one JSON pointer segment (RFC 6901).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['~', '/']) {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Undo [`escape_pointer_segment`].
pub fn unescape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a `#/a/b` pointer from raw (unescaped) segments.
pub fn pointer_from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut pointer = String::from("#");
    for segment in segments {
        pointer.push('/');
        pointer.push_str(&escape_pointer_segment(segment));
    }
    if pointer.len() == 1 {
        pointer.push('/');
    }
    pointer
}

/// Whether two locations name the same component relative to `base`.
pub fn locations_equal(base: &Url, a: &str, b: &str) -> bool {
    match (to_location_url(base, a), to_location_url(base, b)) {
        (Some(a), Some(b)) => a.as_str() == b.as_str(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_location() {
        assert_eq!(
            component_location("https://openapi.net/doc", "schemas", "Pet"),
            "https://openapi.net/doc#/components/schemas/Pet"
        );
    }

    #[test]
    fn test_to_location_url_normalizes_against_base() {
        let base = Url::parse("https://Example.COM/apis/root.yaml").unwrap();
        let url = to_location_url(&base, "#/components/schemas/Pet").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/apis/root.yaml#/components/schemas/Pet"
        );

        let url = to_location_url(&base, "common.yaml#/components/schemas/Pet").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/apis/common.yaml#/components/schemas/Pet"
        );
    }

    #[test]
    fn test_fragment_comparison_is_case_sensitive() {
        let base = default_registry_url();
        assert!(locations_equal(
            &base,
            "#/components/schemas/Pet",
            "https://OPENAPI.net/#/components/schemas/Pet"
        ));
        assert!(!locations_equal(
            &base,
            "#/components/schemas/Pet",
            "#/components/schemas/pet"
        ));
    }

    #[test]
    fn test_split_fragment_and_segments() {
        let (resource, fragment) = split_fragment("common.yaml#/components/schemas/Pet");
        assert_eq!(resource, "common.yaml");
        assert_eq!(fragment, Some("/components/schemas/Pet"));
        assert_eq!(
            fragment_segments(fragment.unwrap()),
            vec!["components", "schemas", "Pet"]
        );

        let (resource, fragment) = split_fragment("common.yaml");
        assert_eq!(resource, "common.yaml");
        assert_eq!(fragment, None);
    }

    #[test]
    fn test_pointer_escaping() {
        assert_eq!(escape_pointer_segment("/pets/{id}"), "~1pets~1{id}");
        assert_eq!(unescape_pointer_segment("~1pets~1{id}"), "/pets/{id}");
        assert_eq!(escape_pointer_segment("a~b"), "a~0b");
        assert_eq!(unescape_pointer_segment("a~0b"), "a~b");
        assert_eq!(pointer_from_segments(["paths", "/pets"]), "#/paths/~1pets");
        assert_eq!(pointer_from_segments([]), "#/");
    }

    #[test]
    fn test_synthetic_base_urls_are_unique() {
        let a = synthetic_base_url();
        let b = synthetic_base_url();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with(BASE_REGISTRY_URI));
    }
}
