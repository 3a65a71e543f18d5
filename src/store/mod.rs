//! Store Module
//!
//! The collaborators the cache policy reads from and writes to, and an
//! in-memory store bundling them.

mod documents;
mod notifications;

pub use documents::DocumentCache;
pub use notifications::{CacheEvent, NotificationManager, Subscription};

use serde_json::Value;
use tracing::debug;

use crate::identifier::{IdentifierCache, StableDocumentIdentifier};
use crate::policy::{CachePolicy, InvalidationRecord};
use crate::request::{CachedDocument, RequestInfo, ResponseInfo};

// == Policy Store ==
/// What a cache policy needs from the store it is asked about.
///
/// The store owns its invalidation record, so the bookkeeping lives exactly
/// as long as the store does.
pub trait PolicyStore {
    /// Non-mutating lookup in the content cache.
    fn peek_request(&self, identifier: &StableDocumentIdentifier) -> Option<&CachedDocument>;

    /// Broadcasts a cache event.
    fn notify(&self, identifier: &StableDocumentIdentifier, event: CacheEvent) -> bool;

    fn invalidation(&self) -> &InvalidationRecord;

    fn invalidation_mut(&mut self) -> &mut InvalidationRecord;
}

// == Store ==
/// In-memory store: identifiers, cached documents, notifications and the
/// invalidation record scoped to them.
#[derive(Debug, Default)]
pub struct Store {
    identifiers: IdentifierCache,
    documents: DocumentCache,
    notifications: NotificationManager,
    invalidation: InvalidationRecord,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identifiers(identifiers: IdentifierCache) -> Self {
        Self {
            identifiers,
            ..Self::default()
        }
    }

    pub fn identifiers(&self) -> &IdentifierCache {
        &self.identifiers
    }

    pub fn identifiers_mut(&mut self) -> &mut IdentifierCache {
        &mut self.identifiers
    }

    pub fn documents(&self) -> &DocumentCache {
        &self.documents
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationManager {
        &mut self.notifications
    }

    // == Record Response ==
    /// Handles a completed request the way a dispatcher would: resolves
    /// its document identifier, caches the response when the request is
    /// cacheable, then lets the policy update its bookkeeping.
    ///
    /// Returns the document identifier, `None` for uncacheable requests.
    pub fn record_response(
        &mut self,
        policy: &CachePolicy,
        request: RequestInfo,
        response: Option<ResponseInfo>,
        content: Value,
    ) -> Option<StableDocumentIdentifier> {
        let identifier = self.identifiers.get_or_create_document_identifier(&request);

        if let (Some(identifier), Some(response)) = (&identifier, &response) {
            let document = CachedDocument {
                request: request.clone(),
                response: Some(response.clone()),
                content,
            };
            let event = match self.documents.put(identifier.clone(), document) {
                Some(_) => CacheEvent::Updated,
                None => CacheEvent::Added,
            };
            self.notifications.notify(identifier, event);
        }

        policy.did_request(&request, response.as_ref(), identifier.as_ref(), self);
        identifier
    }

    // == Forget Document ==
    /// Drops a document, its invalidation state and its identifier.
    pub fn forget_document(&mut self, identifier: &StableDocumentIdentifier) {
        if self.documents.remove(identifier).is_some() {
            self.notifications.notify(identifier, CacheEvent::Removed);
        }
        self.invalidation.forget(identifier);
        self.identifiers.forget_document_identifier(identifier);
        debug!(lid = identifier.lid(), "document forgotten");
    }

    // == Reset ==
    /// Tears the store down. Every identifier issued so far becomes invalid.
    pub fn reset(&mut self) {
        self.identifiers.reset();
        self.documents.clear();
        self.invalidation.clear();
    }
}

impl PolicyStore for Store {
    fn peek_request(&self, identifier: &StableDocumentIdentifier) -> Option<&CachedDocument> {
        self.documents.peek_request(identifier)
    }

    fn notify(&self, identifier: &StableDocumentIdentifier, event: CacheEvent) -> bool {
        self.notifications.notify(identifier, event)
    }

    fn invalidation(&self) -> &InvalidationRecord {
        &self.invalidation
    }

    fn invalidation_mut(&mut self) -> &mut InvalidationRecord {
        &mut self.invalidation
    }
}
