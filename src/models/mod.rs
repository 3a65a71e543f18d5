//! Request and Response models for the policy service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CompletedRequest, ExpirationQuery, InvalidateDocumentRequest};
pub use responses::{
    DocumentResponse, ExpirationResponse, HealthResponse, InvalidateResponse,
    RecordIdentifierResponse,
};
