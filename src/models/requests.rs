//! Request DTOs for the policy service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::identifier::ResourceData;
use crate::request::{RequestInfo, ResponseInfo};

/// Request body for `PUT /documents`
///
/// A request the client finished, with the response it received.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletedRequest {
    pub request: RequestInfo,
    #[serde(default)]
    pub response: Option<ResponseInfo>,
    #[serde(default)]
    pub content: Value,
}

impl CompletedRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.request.url.as_deref().map_or(true, str::is_empty)
            && self.request.cache_key().is_none()
        {
            return Some("Request needs a url or a cache key".to_string());
        }
        if self
            .request
            .records
            .iter()
            .any(|record| record.resource_type.is_empty())
        {
            return Some("Record type cannot be empty".to_string());
        }
        None
    }
}

/// Query string for `GET /documents/expiration`
#[derive(Debug, Clone, Deserialize)]
pub struct ExpirationQuery {
    pub lid: String,
}

/// Request body for `POST /documents/invalidate`
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateDocumentRequest {
    pub lid: String,
}

/// Validates resource data posted to `POST /records/identify`.
pub fn validate_resource(data: &ResourceData) -> Option<String> {
    if data.resource_type.is_empty() {
        return Some("Record type cannot be empty".to_string());
    }
    if data.id.as_deref() == Some("") {
        return Some("Record id cannot be empty".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_request_deserialize() {
        let json = r#"{
            "request": {"url": "/users", "cacheOptions": {"types": ["user"]}},
            "response": {"status": 200, "headers": {"Date": "Sun, 06 Nov 1994 08:49:37 GMT"}}
        }"#;
        let req: CompletedRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.request.url.as_deref(), Some("/users"));
        assert_eq!(req.response.as_ref().unwrap().status, 200);
        assert!(req.content.is_null());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_completed_request_needs_url_or_key() {
        let req: CompletedRequest = serde_json::from_str(r#"{"request": {}}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_resource() {
        assert!(validate_resource(&ResourceData::new("user", "1")).is_none());
        assert!(validate_resource(&ResourceData::new_record("")).is_some());
        assert!(validate_resource(&ResourceData::new("user", "")).is_some());
    }
}
