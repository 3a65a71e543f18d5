//! API Module
//!
//! HTTP handlers and routing for the request cache policy service.
//!
//! # Endpoints
//! - `PUT /documents` - Record a completed request
//! - `GET /documents/expiration?lid=` - Expiration verdicts for a document
//! - `POST /documents/invalidate` - Invalidate one document
//! - `POST /types/:type/invalidate` - Invalidate documents by resource type
//! - `POST /records/identify` - Resolve a stable record identifier
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
