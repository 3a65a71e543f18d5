//! Identifier Module
//!
//! Stable identity for records and cacheable documents.

mod cache;
mod strategy;
mod types;

pub use cache::{IdentifierCache, IdentifierCacheBuilder};
pub use strategy::{DefaultStrategy, IdentifierStrategy};
pub use types::{Bucket, ResourceData, StableDocumentIdentifier, StableRecordIdentifier};
