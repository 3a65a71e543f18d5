//! Identifier Types
//!
//! Stable identity tokens for documents and records.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

// == Bucket ==
/// Namespace an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Record,
    Document,
}

// == Resource Data ==
/// Raw resource reference used to look up or create a record identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub lid: Option<String>,
}

impl ResourceData {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: Some(id.into()),
            lid: None,
        }
    }

    /// Reference to a record the server has not assigned an id to yet.
    pub fn new_record(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            lid: None,
        }
    }

    pub fn with_lid(mut self, lid: impl Into<String>) -> Self {
        self.lid = Some(lid.into());
        self
    }
}

// == Document Identifier ==
/// Cache key for one cacheable request result.
///
/// Equality is token identity, like [`StableRecordIdentifier`]: a token kept
/// after its document was forgotten never equals the one issued for the same
/// lid later. Ordering is by lid.
#[derive(Clone)]
pub struct StableDocumentIdentifier {
    lid: Arc<str>,
}

impl StableDocumentIdentifier {
    pub(crate) fn new(lid: &str) -> Self {
        Self { lid: Arc::from(lid) }
    }

    pub fn lid(&self) -> &str {
        &self.lid
    }

    fn token(&self) -> usize {
        self.lid.as_ptr() as usize
    }
}

impl PartialEq for StableDocumentIdentifier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lid, &other.lid)
    }
}

impl Eq for StableDocumentIdentifier {}

impl Hash for StableDocumentIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lid.hash(state);
    }
}

impl Ord for StableDocumentIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lid
            .cmp(&other.lid)
            .then_with(|| self.token().cmp(&other.token()))
    }
}

impl PartialOrd for StableDocumentIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for StableDocumentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document({})", self.lid)
    }
}

impl fmt::Display for StableDocumentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lid)
    }
}

// == Record Identifier ==
#[derive(Debug)]
struct RecordIdentity {
    lid: String,
    resource_type: String,
    id: OnceLock<String>,
}

/// Stable token for one logical resource.
///
/// Cloning shares the token. Equality is token identity: two identifiers are
/// equal only if they were issued by the same allocation. The id may be
/// assigned once, after which it never changes.
#[derive(Clone)]
pub struct StableRecordIdentifier {
    inner: Arc<RecordIdentity>,
}

impl StableRecordIdentifier {
    pub(crate) fn new(lid: String, resource_type: String, id: Option<String>) -> Self {
        let cell = OnceLock::new();
        if let Some(id) = id {
            let _ = cell.set(id);
        }
        Self {
            inner: Arc::new(RecordIdentity {
                lid,
                resource_type,
                id: cell,
            }),
        }
    }

    pub fn lid(&self) -> &str {
        &self.inner.lid
    }

    pub fn resource_type(&self) -> &str {
        &self.inner.resource_type
    }

    pub fn id(&self) -> Option<&str> {
        self.inner.id.get().map(String::as_str)
    }

    /// Assigns the id. Returns the id already held if one was set before.
    pub(crate) fn assign_id(&self, id: String) -> Result<(), String> {
        self.inner.id.set(id)
    }
}

impl PartialEq for StableRecordIdentifier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for StableRecordIdentifier {}

impl Hash for StableRecordIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.lid.hash(state);
    }
}

impl fmt::Debug for StableRecordIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("lid", &self.lid())
            .field("type", &self.resource_type())
            .field("id", &self.id())
            .finish()
    }
}

impl fmt::Display for StableRecordIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_identity_is_by_token() {
        let a = StableRecordIdentifier::new("@lid:user-1".into(), "user".into(), None);
        let b = StableRecordIdentifier::new("@lid:user-1".into(), "user".into(), None);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_id_assigned_once() {
        let identifier = StableRecordIdentifier::new("@lid:user-x".into(), "user".into(), None);
        assert!(identifier.id().is_none());

        identifier.assign_id("1".into()).unwrap();
        assert!(identifier.assign_id("2".into()).is_err());
        assert_eq!(identifier.id(), Some("1"));
    }

    #[test]
    fn test_document_identity_is_by_token() {
        let a = StableDocumentIdentifier::new("/users");
        let b = StableDocumentIdentifier::new("/users");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.lid(), b.lid());
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_resource_data_deserialize() {
        let data: ResourceData = serde_json::from_str(r#"{"type":"user","lid":"abc"}"#).unwrap();
        assert_eq!(data.resource_type, "user");
        assert!(data.id.is_none());
        assert_eq!(data.lid.as_deref(), Some("abc"));
    }
}
