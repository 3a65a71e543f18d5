//! API Routes
//!
//! Configures the Axum router with all policy service endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    expiration_handler, health_handler, identify_record_handler, invalidate_document_handler,
    invalidate_type_handler, put_document_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /documents` - Record a completed request
/// - `GET /documents/expiration?lid=` - Hard/soft expiration of a document
/// - `POST /documents/invalidate` - Invalidate one document
/// - `POST /types/:type/invalidate` - Invalidate every document depending on a type
/// - `POST /records/identify` - Resolve a stable record identifier
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/documents", put(put_document_handler))
        .route("/documents/expiration", get(expiration_handler))
        .route("/documents/invalidate", post(invalidate_document_handler))
        .route("/types/:type/invalidate", post(invalidate_type_handler))
        .route("/records/identify", post(identify_record_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
