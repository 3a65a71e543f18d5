//! Identifier Cache Module
//!
//! Hands out one stable identifier per record (type + id, or lid) and per
//! cacheable request, and keeps its indexes in sync as ids get assigned.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{ConfigurationError, ConsistencyError};
use crate::identifier::{
    Bucket, DefaultStrategy, IdentifierStrategy, ResourceData, StableDocumentIdentifier,
    StableRecordIdentifier,
};
use crate::request::RequestInfo;

// == Identifier Cache ==
/// Store-scoped identity allocator.
pub struct IdentifierCache {
    /// Installed lifecycle hooks
    strategy: Box<dyn IdentifierStrategy>,
    /// lid -> identifier, including lids aliased by a merge
    lids: HashMap<String, StableRecordIdentifier>,
    /// type -> id -> identifier
    types: HashMap<String, HashMap<String, StableRecordIdentifier>>,
    /// document lid -> identifier
    documents: HashMap<String, StableDocumentIdentifier>,
    /// Set by reset, cleared on the next allocation
    is_reset: bool,
}

impl IdentifierCache {
    // == Constructor ==
    /// Creates a cache using the default strategy.
    pub fn new() -> Self {
        Self::with_strategy(Box::new(DefaultStrategy))
    }

    pub fn builder() -> IdentifierCacheBuilder {
        IdentifierCacheBuilder::default()
    }

    fn with_strategy(strategy: Box<dyn IdentifierStrategy>) -> Self {
        Self {
            strategy,
            lids: HashMap::new(),
            types: HashMap::new(),
            documents: HashMap::new(),
            is_reset: false,
        }
    }

    // == Record Lookup ==
    /// Finds an existing identifier by lid, then by type + id.
    ///
    /// A lid hit must agree with `data`: same type, and the same id when
    /// both carry one.
    pub fn peek_record_identifier(
        &self,
        data: &ResourceData,
    ) -> Result<Option<StableRecordIdentifier>, ConsistencyError> {
        if let Some(found) = data.lid.as_ref().and_then(|lid| self.lids.get(lid)) {
            let id_agrees = match (found.id(), data.id.as_deref()) {
                (Some(known), Some(requested)) => known == requested,
                _ => true,
            };
            if found.resource_type() != data.resource_type || !id_agrees {
                return Err(lid_conflict(found, data));
            }
            return Ok(Some(found.clone()));
        }
        let Some(id) = data.id.as_ref() else {
            return Ok(None);
        };
        Ok(self
            .types
            .get(&data.resource_type)
            .and_then(|ids| ids.get(id))
            .cloned())
    }

    /// Resolves `data` to its identifier, generating one if nothing matches.
    ///
    /// Fails if the generated lid already belongs to another record.
    pub fn get_or_create_record_identifier(
        &mut self,
        data: &ResourceData,
    ) -> Result<StableRecordIdentifier, ConsistencyError> {
        if let Some(found) = self.peek_record_identifier(data)? {
            return Ok(found);
        }

        let lid = self.strategy.generate_record_lid(data);
        if let Some(found) = self.lids.get(&lid) {
            if found.resource_type() == data.resource_type && found.id() == data.id.as_deref() {
                return Ok(found.clone());
            }
            return Err(lid_conflict(found, data));
        }

        Ok(self.insert_record(lid, data.resource_type.clone(), data.id.clone()))
    }

    /// Allocates an identifier for a record created on the client.
    pub fn create_identifier_for_new_record(
        &mut self,
        resource_type: &str,
        id: Option<&str>,
    ) -> Result<StableRecordIdentifier, ConsistencyError> {
        let data = ResourceData {
            resource_type: resource_type.to_string(),
            id: id.map(str::to_string),
            lid: None,
        };
        if let Some(existing) = self.peek_record_identifier(&data)? {
            return Err(ConsistencyError::AlreadyExists {
                lid: existing.lid().to_string(),
            });
        }

        let lid = self.strategy.generate_record_lid(&data);
        if self.lids.contains_key(&lid) {
            return Err(ConsistencyError::AlreadyExists { lid });
        }
        Ok(self.insert_record(lid, data.resource_type, data.id))
    }

    fn insert_record(
        &mut self,
        lid: String,
        resource_type: String,
        id: Option<String>,
    ) -> StableRecordIdentifier {
        self.is_reset = false;
        let identifier = StableRecordIdentifier::new(lid.clone(), resource_type.clone(), id.clone());
        if let Some(id) = id {
            self.types
                .entry(resource_type)
                .or_default()
                .insert(id, identifier.clone());
        }
        self.lids.insert(lid, identifier.clone());
        debug!(lid = identifier.lid(), "record identifier created");
        identifier
    }

    // == Update ==
    /// Applies new authoritative data to an identifier.
    ///
    /// Returns the identifier callers should use from now on. That is a
    /// different token when the new id already belonged to another
    /// identifier of the same type: the existing one is kept and the
    /// updated one's lid resolves to it afterwards.
    pub fn update_record_identifier(
        &mut self,
        identifier: &StableRecordIdentifier,
        data: &ResourceData,
    ) -> Result<StableRecordIdentifier, ConsistencyError> {
        if !self.is_tracked(identifier) {
            return Err(ConsistencyError::Released(identifier.lid().to_string()));
        }
        self.strategy.update(identifier, data)?;

        let Some(new_id) = data.id.as_deref() else {
            return Ok(identifier.clone());
        };
        if let Some(current) = identifier.id() {
            if current != new_id {
                return Err(ConsistencyError::IdChanged {
                    lid: identifier.lid().to_string(),
                    current: current.to_string(),
                    attempted: new_id.to_string(),
                });
            }
            return Ok(identifier.clone());
        }

        let existing = self
            .types
            .get(identifier.resource_type())
            .and_then(|ids| ids.get(new_id))
            .cloned();
        if let Some(kept) = existing {
            debug!(
                abandoned = identifier.lid(),
                kept = kept.lid(),
                "merging record identifiers"
            );
            self.strategy.forget(identifier.lid(), Bucket::Record);
            self.lids.insert(identifier.lid().to_string(), kept.clone());
            return Ok(kept);
        }

        identifier
            .assign_id(new_id.to_string())
            .map_err(|_| ConsistencyError::IdChanged {
                lid: identifier.lid().to_string(),
                current: identifier.id().unwrap_or_default().to_string(),
                attempted: new_id.to_string(),
            })?;
        self.types
            .entry(identifier.resource_type().to_string())
            .or_default()
            .insert(new_id.to_string(), identifier.clone());
        Ok(identifier.clone())
    }

    // == Forget ==
    /// Releases a record identifier and every lid resolving to it.
    ///
    /// Unknown identifiers are ignored.
    pub fn forget_record_identifier(&mut self, identifier: &StableRecordIdentifier) {
        if !self.is_tracked(identifier) {
            return;
        }
        self.strategy.forget(identifier.lid(), Bucket::Record);
        self.lids.retain(|_, known| known != identifier);
        if let (Some(id), Some(ids)) = (identifier.id(), self.types.get_mut(identifier.resource_type())) {
            ids.remove(id);
        }
        debug!(lid = identifier.lid(), "record identifier forgotten");
    }

    /// True if `identifier` is the live token for its lid.
    pub fn is_tracked(&self, identifier: &StableRecordIdentifier) -> bool {
        self.lids
            .get(identifier.lid())
            .map_or(false, |known| known == identifier)
    }

    // == Documents ==
    /// Resolves the cache identifier for a request.
    ///
    /// An explicit `cache_options.key` wins over the strategy. `None` means
    /// the request result must not be cached.
    pub fn get_or_create_document_identifier(
        &mut self,
        request: &RequestInfo,
    ) -> Option<StableDocumentIdentifier> {
        let lid = match request.cache_key() {
            Some(key) => key.to_string(),
            None => self.strategy.generate_document_lid(request)?,
        };
        self.is_reset = false;
        let identifier = self
            .documents
            .entry(lid)
            .or_insert_with_key(|lid| StableDocumentIdentifier::new(lid))
            .clone();
        Some(identifier)
    }

    pub fn peek_document_identifier(&self, lid: &str) -> Option<StableDocumentIdentifier> {
        self.documents.get(lid).cloned()
    }

    pub fn forget_document_identifier(&mut self, identifier: &StableDocumentIdentifier) {
        if self.documents.remove(identifier.lid()).is_some() {
            self.strategy.forget(identifier.lid(), Bucket::Document);
        }
    }

    // == Reset ==
    /// Invalidates every issued identifier. Repeated calls are no-ops.
    pub fn reset(&mut self) {
        if self.is_reset {
            return;
        }
        self.strategy.reset();
        self.lids.clear();
        self.types.clear();
        self.documents.clear();
        self.is_reset = true;
        debug!("identifier cache reset");
    }

    // == Counts ==
    /// Number of live record identifiers.
    pub fn record_count(&self) -> usize {
        self.lids
            .iter()
            .filter(|(lid, known)| known.lid() == lid.as_str())
            .count()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

fn lid_conflict(found: &StableRecordIdentifier, data: &ResourceData) -> ConsistencyError {
    ConsistencyError::LidConflict {
        lid: found.lid().to_string(),
        existing: record_label(found.resource_type(), found.id()),
        requested: record_label(&data.resource_type, data.id.as_deref()),
    }
}

fn record_label(resource_type: &str, id: Option<&str>) -> String {
    format!("{}:{}", resource_type, id.unwrap_or("<new>"))
}

impl Default for IdentifierCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentifierCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierCache")
            .field("lids", &self.lids.len())
            .field("documents", &self.documents.len())
            .field("is_reset", &self.is_reset)
            .finish()
    }
}

// == Builder ==
/// Installs a custom strategy before the cache is created.
#[derive(Default)]
pub struct IdentifierCacheBuilder {
    strategy: Option<Box<dyn IdentifierStrategy>>,
}

impl IdentifierCacheBuilder {
    /// Registers the strategy. Fails if one was already registered.
    pub fn strategy(
        mut self,
        strategy: impl IdentifierStrategy + 'static,
    ) -> Result<Self, ConfigurationError> {
        if self.strategy.is_some() {
            return Err(ConfigurationError::StrategyAlreadyRegistered);
        }
        self.strategy = Some(Box::new(strategy));
        Ok(self)
    }

    pub fn build(self) -> IdentifierCache {
        IdentifierCache::with_strategy(self.strategy.unwrap_or_else(|| Box::new(DefaultStrategy)))
    }
}
