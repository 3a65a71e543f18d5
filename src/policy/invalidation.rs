//! Invalidation Module
//!
//! Per-store bookkeeping of invalidated documents and type dependencies.

use std::collections::{HashMap, HashSet};

use crate::identifier::StableDocumentIdentifier;

// == Invalidation Record ==
/// Invalidation state owned by exactly one store.
///
/// Dropped together with the store that owns it.
#[derive(Debug, Default)]
pub struct InvalidationRecord {
    /// Documents explicitly marked stale
    invalidated: HashSet<StableDocumentIdentifier>,
    /// Resource type -> documents whose result depends on it
    types: HashMap<String, HashSet<StableDocumentIdentifier>>,
}

impl InvalidationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a document invalidated. Returns false if it already was.
    pub fn invalidate(&mut self, identifier: &StableDocumentIdentifier) -> bool {
        self.invalidated.insert(identifier.clone())
    }

    pub fn is_invalidated(&self, identifier: &StableDocumentIdentifier) -> bool {
        self.invalidated.contains(identifier)
    }

    /// Clears the invalidated mark. Returns true if it was set.
    pub fn revalidate(&mut self, identifier: &StableDocumentIdentifier) -> bool {
        self.invalidated.remove(identifier)
    }

    /// Records that `identifier` depends on `resource_type`.
    pub fn register(&mut self, identifier: &StableDocumentIdentifier, resource_type: &str) {
        self.types
            .entry(resource_type.to_string())
            .or_default()
            .insert(identifier.clone());
    }

    /// Marks every document depending on `resource_type` invalidated and
    /// returns them.
    pub fn invalidate_type(&mut self, resource_type: &str) -> Vec<StableDocumentIdentifier> {
        let Some(dependents) = self.types.get(resource_type) else {
            return Vec::new();
        };
        let mut affected: Vec<_> = dependents.iter().cloned().collect();
        affected.sort();
        self.invalidated.extend(affected.iter().cloned());
        affected
    }

    pub fn dependents(&self, resource_type: &str) -> Vec<StableDocumentIdentifier> {
        let mut dependents: Vec<_> = self
            .types
            .get(resource_type)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        dependents.sort();
        dependents
    }

    /// Drops every trace of a released document.
    pub fn forget(&mut self, identifier: &StableDocumentIdentifier) {
        self.invalidated.remove(identifier);
        self.types.retain(|_, dependents| {
            dependents.remove(identifier);
            !dependents.is_empty()
        });
    }

    pub fn invalidated_count(&self) -> usize {
        self.invalidated.len()
    }

    pub fn clear(&mut self) {
        self.invalidated.clear();
        self.types.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lid: &str) -> StableDocumentIdentifier {
        StableDocumentIdentifier::new(lid)
    }

    #[test]
    fn test_invalidate_and_revalidate() {
        let mut record = InvalidationRecord::new();
        let users = doc("/users");

        assert!(record.invalidate(&users));
        assert!(!record.invalidate(&users));
        assert!(record.is_invalidated(&users));

        assert!(record.revalidate(&users));
        assert!(!record.is_invalidated(&users));
    }

    #[test]
    fn test_invalidate_type_marks_dependents() {
        let mut record = InvalidationRecord::new();
        let (users, teams, posts) = (doc("/users"), doc("/teams"), doc("/posts"));
        record.register(&users, "user");
        record.register(&teams, "user");
        record.register(&posts, "post");

        let affected = record.invalidate_type("user");

        assert_eq!(affected, vec![teams, users.clone()]);
        assert!(record.is_invalidated(&users));
        assert!(!record.is_invalidated(&posts));
        assert_eq!(record.invalidated_count(), 2);
    }

    #[test]
    fn test_invalidate_unknown_type_is_noop() {
        let mut record = InvalidationRecord::new();
        assert!(record.invalidate_type("ghost").is_empty());
        assert_eq!(record.invalidated_count(), 0);
    }

    #[test]
    fn test_forget_purges_everything() {
        let mut record = InvalidationRecord::new();
        let users = doc("/users");
        record.register(&users, "user");
        record.invalidate(&users);

        record.forget(&users);

        assert!(!record.is_invalidated(&users));
        assert!(record.dependents("user").is_empty());
    }
}
