//! OpenAPI Types
//!
//! An in-memory model of OpenAPI documents with readers for Swagger 2.0,
//! OpenAPI 3.0 and OpenAPI 3.1, reference resolution across a shared
//! workspace, and rule-based validation.
//!
//! This crate provides:
//! - The OpenAPI 3.1 object model, with 2.0 and 3.0 documents upgraded into it
//! - Bon builder patterns for constructing documents in code
//! - A [`Workspace`] registry that resolves `$ref`s to components, including
//!   locations nested inside schemas, with cycle detection
//! - [`ReferenceHolder`], carrying an element inline or as a reference with
//!   the same accessors either way
//! - A [`Walker`](walker::Walker) over every element of a document
//! - Validation rules reporting JSON-pointer located diagnostics
//! - Specification extensions support for x-* extension fields
//!
//! # Example
//!
//! ```rust
//! use openapi_types::{OpenApiReader, OpenApiSpecVersion, Validate, ValidationRuleSet};
//!
//! let input = r##"{
//!   "swagger": "2.0",
//!   "info": {"title": "Pets", "version": "1.0.0"},
//!   "host": "pets.example.com",
//!   "paths": {},
//!   "definitions": {
//!     "Pet": {"type": "object", "properties": {"owner": {"$ref": "#/definitions/Person"}}},
//!     "Person": {"type": "object"}
//!   }
//! }"##;
//!
//! let read = OpenApiReader::default().read_str(input).unwrap();
//! let document = read.document;
//! assert_eq!(document.spec_version, Some(OpenApiSpecVersion::V2_0));
//! assert_eq!(document.servers[0].url.as_deref(), Some("//pets.example.com"));
//!
//! let pet = document.components.as_ref().unwrap().get_schema("Pet").unwrap();
//! let owner = pet.properties()["owner"].clone();
//! assert!(owner.target().is_some());
//!
//! let diagnostics = document.validate(&ValidationRuleSet::default_rule_set());
//! assert!(diagnostics.is_empty());
//! ```

pub mod error;
pub mod host_document;
pub mod location;
pub mod reader;
pub mod validation;
pub mod walker;
pub mod workspace;

// Core OpenAPI specification types
mod callback;
mod components;
mod diagnostic;
mod document;
mod example;
mod expressions;
mod extensions;
mod external_docs;
mod header;
mod info;
mod link;
mod media_type;
mod parameter;
mod path_item;
mod reference;
mod request_body;
mod response;
mod schema;
mod security;
mod server;
mod tag;
mod version;

// Re-export all public types
pub use callback::*;
pub use components::*;
pub use diagnostic::*;
pub use document::*;
pub use example::*;
pub use expressions::*;
pub use extensions::*;
pub use external_docs::*;
pub use header::*;
pub use info::*;
pub use link::*;
pub use media_type::*;
pub use parameter::*;
pub use path_item::*;
pub use reference::*;
pub use request_body::*;
pub use response::*;
pub use schema::*;
pub use security::*;
pub use server::*;
pub use tag::*;
pub use version::*;

pub use error::*;
pub use reader::{InputFormat, OpenApiReader, ReadResult, ReaderSettings};
pub use validation::{Validate, ValidationRuleSet};
pub use workspace::{Component, Workspace};
