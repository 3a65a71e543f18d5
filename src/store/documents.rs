//! Document Cache Module
//!
//! In-memory content cache keyed by document identifier.

use std::collections::HashMap;

use crate::identifier::StableDocumentIdentifier;
use crate::request::CachedDocument;

// == Document Cache ==
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: HashMap<StableDocumentIdentifier, CachedDocument>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document, returning the one it replaced.
    pub fn put(
        &mut self,
        identifier: StableDocumentIdentifier,
        document: CachedDocument,
    ) -> Option<CachedDocument> {
        self.documents.insert(identifier, document)
    }

    /// Non-mutating lookup.
    pub fn peek_request(&self, identifier: &StableDocumentIdentifier) -> Option<&CachedDocument> {
        self.documents.get(identifier)
    }

    pub fn remove(&mut self, identifier: &StableDocumentIdentifier) -> Option<CachedDocument> {
        self.documents.remove(identifier)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }
}
