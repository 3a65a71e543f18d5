//! Response DTOs for the policy service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::identifier::StableRecordIdentifier;
use crate::policy::CacheDecision;

/// Response body for `PUT /documents`
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    /// Document lid, absent for uncacheable requests
    pub lid: Option<String>,
    /// Whether the response was stored
    pub cached: bool,
}

/// Response body for `GET /documents/expiration`
#[derive(Debug, Clone, Serialize)]
pub struct ExpirationResponse {
    pub lid: String,
    pub hard_expired: bool,
    pub soft_expired: bool,
    pub decision: CacheDecision,
}

impl ExpirationResponse {
    pub fn new(lid: impl Into<String>, hard_expired: bool, soft_expired: bool) -> Self {
        Self {
            lid: lid.into(),
            hard_expired,
            soft_expired,
            decision: CacheDecision::from_verdicts(hard_expired, soft_expired),
        }
    }
}

/// Response body for the invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Number of documents affected
    pub invalidated: usize,
}

impl InvalidateResponse {
    pub fn document(lid: &str) -> Self {
        Self {
            message: format!("Document '{}' invalidated", lid),
            invalidated: 1,
        }
    }

    pub fn resource_type(resource_type: &str, invalidated: usize) -> Self {
        Self {
            message: format!("Requests depending on '{}' invalidated", resource_type),
            invalidated,
        }
    }
}

/// Response body for `POST /records/identify`
#[derive(Debug, Clone, Serialize)]
pub struct RecordIdentifierResponse {
    pub lid: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: Option<String>,
}

impl From<&StableRecordIdentifier> for RecordIdentifierResponse {
    fn from(identifier: &StableRecordIdentifier) -> Self {
        Self {
            lid: identifier.lid().to_string(),
            resource_type: identifier.resource_type().to_string(),
            id: identifier.id().map(str::to_string),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
