//! Policy Module
//!
//! Expiration engine for cached request documents.

mod cache_control;
mod clock;
mod config;
mod engine;
mod invalidation;
mod lru;


pub use cache_control::{
    parse_cache_control, CacheControlMemo, CacheControlValue, CACHE_CONTROL_MEMO_SIZE,
};
pub use clock::{format_http_date, parse_http_date, Clock, ManualClock, SystemClock};
pub use config::{
    Constraints, Environment, ExpirationPredicate, HeaderConstraints, PolicyConfig,
};
pub use engine::{CacheDecision, CachePolicy, VerdictReason};
pub use invalidation::InvalidationRecord;
pub use lru::LruTracker;
