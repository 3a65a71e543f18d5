//! Request and Document Envelopes
//!
//! Describes completed requests and the cached documents built from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identifier::ResourceData;

/// Request operation that creates a record on the server.
pub const CREATE_RECORD_OP: &str = "createRecord";

// == Cache Options ==
/// Request-level caching hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheOptions {
    /// Explicit cache key; bypasses document lid generation
    #[serde(default)]
    pub key: Option<String>,
    /// Always fetch, regardless of expiration
    #[serde(default)]
    pub reload: bool,
    /// Serve cached data but refresh it in the background
    #[serde(default)]
    pub background_reload: bool,
    /// Resource types whose mutation invalidates this request's result
    #[serde(default)]
    pub types: Vec<String>,
}

// == Request Info ==
/// Immutable description of an outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    #[serde(default)]
    pub url: Option<String>,
    /// HTTP method, `None` means GET
    #[serde(default)]
    pub method: Option<String>,
    /// Logical operation name, e.g. `createRecord` or `query`
    #[serde(default)]
    pub op: Option<String>,
    /// Records carried in the request payload
    #[serde(default)]
    pub records: Vec<ResourceData>,
    #[serde(default)]
    pub cache_options: Option<CacheOptions>,
}

impl RequestInfo {
    /// Creates a GET request for the given url.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_records(mut self, records: Vec<ResourceData>) -> Self {
        self.records = records;
        self
    }

    pub fn with_cache_options(mut self, options: CacheOptions) -> Self {
        self.cache_options = Some(options);
        self
    }

    /// True when the method is absent or GET (case-insensitive).
    pub fn is_get(&self) -> bool {
        self.method
            .as_deref()
            .map_or(true, |m| m.eq_ignore_ascii_case("GET"))
    }

    pub fn is_create(&self) -> bool {
        self.op.as_deref() == Some(CREATE_RECORD_OP)
    }

    /// Dependent types declared in the cache options.
    pub fn cache_types(&self) -> &[String] {
        self.cache_options
            .as_ref()
            .map(|o| o.types.as_slice())
            .unwrap_or(&[])
    }

    pub fn cache_key(&self) -> Option<&str> {
        self.cache_options.as_ref().and_then(|o| o.key.as_deref())
    }
}

// == Response Headers ==
/// Case-insensitive response header map.
///
/// Names are stored lowercased; values are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ResponseHeaders {
    entries: BTreeMap<String, String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, String>> for ResponseHeaders {
    fn from(raw: BTreeMap<String, String>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<ResponseHeaders> for BTreeMap<String, String> {
    fn from(headers: ResponseHeaders) -> Self {
        headers.entries
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

// == Response Info ==
/// Status and headers of a completed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub status: u16,
    #[serde(default)]
    pub headers: Option<ResponseHeaders>,
}

impl ResponseInfo {
    pub fn new(status: u16, headers: ResponseHeaders) -> Self {
        Self {
            status,
            headers: Some(headers),
        }
    }

    /// True for 2xx and 3xx statuses.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

// == Cached Document ==
/// Response envelope held by the content cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedDocument {
    #[serde(default)]
    pub request: RequestInfo,
    #[serde(default)]
    pub response: Option<ResponseInfo>,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl CachedDocument {
    pub fn new(request: RequestInfo, response: ResponseInfo) -> Self {
        Self {
            request,
            response: Some(response),
            content: serde_json::Value::Null,
        }
    }

    pub fn headers(&self) -> Option<&ResponseHeaders> {
        self.response.as_ref().and_then(|r| r.headers.as_ref())
    }
}
