//! Identifier Strategies
//!
//! Replaceable generate/update/forget/reset behavior for the identifier cache.

use uuid::Uuid;

use crate::error::ConsistencyError;
use crate::identifier::{Bucket, ResourceData, StableRecordIdentifier};
use crate::request::RequestInfo;

// == Identifier Strategy ==
/// Hooks the identifier cache calls at each point of an identifier's life.
///
/// A strategy is installed once per cache and replaced as a whole.
pub trait IdentifierStrategy: Send + Sync {
    /// Builds the lid for a record no existing identifier matched.
    ///
    /// Must return the same lid for the same `type` + `id` (or `lid`).
    fn generate_record_lid(&self, data: &ResourceData) -> String;

    /// Builds the cache key for a request, `None` to leave it uncached.
    fn generate_document_lid(&self, request: &RequestInfo) -> Option<String>;

    /// Called before new authoritative data is applied to an identifier.
    fn update(
        &self,
        identifier: &StableRecordIdentifier,
        data: &ResourceData,
    ) -> Result<(), ConsistencyError>;

    /// Called right before an identifier is released. Must not fail.
    fn forget(&self, lid: &str, bucket: Bucket);

    /// Called once when the owning cache is torn down.
    fn reset(&self);
}

// == Default Strategy ==
/// Lids of the form `@lid:{type}-{id}`; documents keyed by GET url.
///
/// `-` and `%` inside the type or id are percent-encoded, so the separator
/// is the only bare `-` and distinct pairs never share a lid.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStrategy;

impl IdentifierStrategy for DefaultStrategy {
    fn generate_record_lid(&self, data: &ResourceData) -> String {
        if let Some(lid) = &data.lid {
            return lid.clone();
        }
        let resource_type = escape_segment(&data.resource_type);
        match &data.id {
            Some(id) => format!("@lid:{}-{}", resource_type, escape_segment(id)),
            None => format!("@lid:{}-{}", resource_type, Uuid::new_v4()),
        }
    }

    fn generate_document_lid(&self, request: &RequestInfo) -> Option<String> {
        if request.is_get() {
            request.url.clone()
        } else {
            None
        }
    }

    fn update(
        &self,
        identifier: &StableRecordIdentifier,
        data: &ResourceData,
    ) -> Result<(), ConsistencyError> {
        match (identifier.id(), data.id.as_deref()) {
            (Some(current), Some(attempted)) if current != attempted => {
                Err(ConsistencyError::IdChanged {
                    lid: identifier.lid().to_string(),
                    current: current.to_string(),
                    attempted: attempted.to_string(),
                })
            }
            (None, None) => Err(ConsistencyError::MissingId {
                lid: identifier.lid().to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn forget(&self, _lid: &str, _bucket: Bucket) {}

    fn reset(&self) {}
}

fn escape_segment(raw: &str) -> String {
    raw.replace('%', "%25").replace('-', "%2D")
}
