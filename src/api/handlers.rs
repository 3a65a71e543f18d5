//! API Handlers
//!
//! HTTP request handlers for each policy service endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::identifier::ResourceData;
use crate::models::requests::validate_resource;
use crate::models::{
    CompletedRequest, DocumentResponse, ExpirationQuery, ExpirationResponse, HealthResponse,
    InvalidateDocumentRequest, InvalidateResponse, RecordIdentifierResponse,
};
use crate::policy::CachePolicy;
use crate::store::{PolicyStore, Store};

/// Application state shared across all handlers.
///
/// The store sits behind a lock; the policy is shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub policy: Arc<CachePolicy>,
}

impl AppState {
    pub fn new(store: Store, policy: CachePolicy) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            policy: Arc::new(policy),
        }
    }

    /// Creates a new AppState from configuration, on the wall clock.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Store::new(), CachePolicy::new(config.policy.clone()))
    }
}

/// Handler for PUT /documents
///
/// Records a completed request and caches its response when cacheable.
pub async fn put_document_handler(
    State(state): State<AppState>,
    Json(req): Json<CompletedRequest>,
) -> Result<Json<DocumentResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(Error::InvalidRequest(error_msg));
    }

    let cached = req.response.is_some();
    let mut store = state.store.write().await;
    let identifier = store.record_response(&state.policy, req.request, req.response, req.content);

    Ok(Json(DocumentResponse {
        cached: cached && identifier.is_some(),
        lid: identifier.map(|identifier| identifier.lid().to_string()),
    }))
}

/// Handler for GET /documents/expiration?lid=
///
/// Reports both expiration checks for a known document.
pub async fn expiration_handler(
    State(state): State<AppState>,
    Query(query): Query<ExpirationQuery>,
) -> Result<Json<ExpirationResponse>> {
    let store = state.store.read().await;
    let identifier = store
        .identifiers()
        .peek_document_identifier(&query.lid)
        .ok_or_else(|| Error::NotFound(query.lid.clone()))?;

    let hard_expired = state.policy.is_hard_expired(&identifier, &*store);
    let soft_expired = state.policy.is_soft_expired(&identifier, &*store);

    Ok(Json(ExpirationResponse::new(
        query.lid,
        hard_expired,
        soft_expired,
    )))
}

/// Handler for POST /documents/invalidate
pub async fn invalidate_document_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateDocumentRequest>,
) -> Result<Json<InvalidateResponse>> {
    let mut store = state.store.write().await;
    let identifier = store
        .identifiers()
        .peek_document_identifier(&req.lid)
        .ok_or_else(|| Error::NotFound(req.lid.clone()))?;

    state.policy.invalidate_request(&identifier, &mut *store);

    Ok(Json(InvalidateResponse::document(&req.lid)))
}

/// Handler for POST /types/:type/invalidate
pub async fn invalidate_type_handler(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    let mut store = state.store.write().await;
    let count = state
        .policy
        .invalidate_requests_for_type(&resource_type, &mut *store);
    info!(resource_type = %resource_type, count, "type invalidated via API");

    Ok(Json(InvalidateResponse::resource_type(&resource_type, count)))
}

/// Handler for POST /records/identify
///
/// Resolves resource data to its stable record identifier.
pub async fn identify_record_handler(
    State(state): State<AppState>,
    Json(data): Json<ResourceData>,
) -> Result<Json<RecordIdentifierResponse>> {
    if let Some(error_msg) = validate_resource(&data) {
        return Err(Error::InvalidRequest(error_msg));
    }

    let mut store = state.store.write().await;
    let identifier = store.identifiers_mut().get_or_create_record_identifier(&data)?;

    Ok(Json(RecordIdentifierResponse::from(&identifier)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
