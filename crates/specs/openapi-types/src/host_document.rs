//! Binds every reference in a document back to the document.

use crate::OpenApiDocument;
use crate::walker::{Node, Visitor, Walker};
use std::sync::Arc;
use tracing::debug;

/// Visitor setting the host document of each reference it meets.
///
/// References that already have a host keep it, so running the setter again
/// over the same document changes nothing.
pub struct ReferenceHostDocumentSetter {
    document: Arc<OpenApiDocument>,
    bound: usize,
}

impl ReferenceHostDocumentSetter {
    pub fn new(document: Arc<OpenApiDocument>) -> Self {
        Self { document, bound: 0 }
    }

    /// Walk the document; returns how many references were newly bound
    pub fn run(mut self) -> usize {
        let document = Arc::clone(&self.document);
        Walker::new(&mut self).walk_document(&document);
        debug!(
            "Bound {} references to document {}",
            self.bound, document.base_uri
        );
        self.bound
    }
}

impl Visitor for ReferenceHostDocumentSetter {
    fn visit(&mut self, node: Node<'_>) {
        if let Node::Reference(reference) = node {
            if reference.ensure_host_document_is_set(&self.document) {
                self.bound += 1;
            }
        }
    }
}
