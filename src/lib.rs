//! Request Cache - expiration and invalidation policy for cached requests
//!
//! Decides whether a cached response is still usable (hard and soft
//! expiration), tracks which cached requests depend on which resource
//! types, and issues stable identifiers for records and documents.

pub mod api;
pub mod config;
pub mod error;
pub mod identifier;
pub mod models;
pub mod policy;
pub mod request;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use error::{ConfigurationError, ConsistencyError, Error, Result};
pub use identifier::{
    IdentifierCache, IdentifierStrategy, ResourceData, StableDocumentIdentifier,
    StableRecordIdentifier,
};
pub use policy::{CacheDecision, CachePolicy, PolicyConfig};
pub use request::{CachedDocument, RequestInfo, ResponseHeaders, ResponseInfo};
pub use store::{PolicyStore, Store};
