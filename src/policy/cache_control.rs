//! Cache-Control Module
//!
//! Parses `Cache-Control` header values and memoizes the results.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::error::MalformedHeaderError;
use crate::policy::LruTracker;

/// Maximum number of distinct header values kept parsed.
pub const CACHE_CONTROL_MEMO_SIZE: usize = 200;

// == Cache-Control Value ==
/// Directives read from one `Cache-Control` header.
///
/// Numeric directives are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControlValue {
    pub immutable: bool,
    pub max_age: Option<u64>,
    pub must_revalidate: bool,
    pub must_understand: bool,
    pub no_cache: bool,
    pub no_store: bool,
    pub no_transform: bool,
    pub only_if_cached: bool,
    pub private: bool,
    pub proxy_revalidate: bool,
    pub public: bool,
    pub s_maxage: Option<u64>,
    pub stale_if_error: Option<u64>,
    pub stale_while_revalidate: Option<u64>,
    /// Directives not listed above, with their raw value (empty if none)
    pub extensions: BTreeMap<String, String>,
}

impl CacheControlValue {
    /// `max-age`, falling back to `s-maxage`.
    pub fn freshness_lifetime(&self) -> Option<u64> {
        self.max_age.or(self.s_maxage)
    }

    fn apply(&mut self, name: &str, value: Option<&str>) {
        let numeric = match name {
            "max-age" => &mut self.max_age,
            "s-maxage" => &mut self.s_maxage,
            "stale-if-error" => &mut self.stale_if_error,
            "stale-while-revalidate" => &mut self.stale_while_revalidate,
            _ => {
                self.apply_flag(name, value);
                return;
            }
        };

        let raw = value.unwrap_or_default();
        *numeric = Some(parse_delta_seconds(raw).unwrap_or_else(|| {
            let err = MalformedHeaderError {
                directive: name.to_string(),
                value: raw.to_string(),
            };
            warn!("{}; using 0", err);
            0
        }));
    }

    fn apply_flag(&mut self, name: &str, value: Option<&str>) {
        let flag = match name {
            "immutable" => &mut self.immutable,
            "must-revalidate" => &mut self.must_revalidate,
            "must-understand" => &mut self.must_understand,
            "no-cache" => &mut self.no_cache,
            "no-store" => &mut self.no_store,
            "no-transform" => &mut self.no_transform,
            "only-if-cached" => &mut self.only_if_cached,
            "private" => &mut self.private,
            "proxy-revalidate" => &mut self.proxy_revalidate,
            "public" => &mut self.public,
            _ => {
                self.extensions
                    .insert(name.to_string(), unquote(value.unwrap_or_default()).to_string());
                return;
            }
        };
        *flag = true;
    }
}

// == Parse ==
/// Parses a comma separated `name[=value]` list.
///
/// Names are case-insensitive. Commas inside quoted values do not split.
/// A numeric directive that does not start with a non-negative integer is
/// logged and read as `0`; the rest of the header is still parsed.
pub fn parse_cache_control(header: &str) -> CacheControlValue {
    let mut parsed = CacheControlValue::default();
    for directive in split_directives(header) {
        let directive = directive.trim();
        if directive.is_empty() {
            continue;
        }
        let (name, value) = match directive.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (directive, None),
        };
        parsed.apply(&name.to_ascii_lowercase(), value);
    }
    parsed
}

fn split_directives(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (at, ch) in header.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&header[start..at]);
                start = at + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(raw)
}

/// Reads the leading integer of `raw`, so `"10abc"` is 10.
///
/// `None` for anything negative or without leading digits. Values beyond
/// `u64` saturate.
fn parse_delta_seconds(raw: &str) -> Option<u64> {
    let raw = unquote(raw.trim());
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    Some(digits[..end].parse().unwrap_or(u64::MAX))
}

// == Memo ==
/// Parsed header values keyed by the raw header string.
#[derive(Debug)]
pub struct CacheControlMemo {
    entries: HashMap<String, CacheControlValue>,
    lru: LruTracker<String>,
}

impl CacheControlMemo {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CONTROL_MEMO_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::with_capacity(capacity),
        }
    }

    /// Returns the parse of `header`, parsing it on first sight.
    pub fn get_or_parse(&mut self, header: &str) -> CacheControlValue {
        let parsed = match self.entries.get(header) {
            Some(parsed) => parsed.clone(),
            None => {
                let parsed = parse_cache_control(header);
                self.entries.insert(header.to_string(), parsed.clone());
                parsed
            }
        };
        if let Some(evicted) = self.lru.touch(header.to_string()) {
            self.entries.remove(&evicted);
        }
        parsed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, header: &str) -> bool {
        self.entries.contains_key(header)
    }
}

impl Default for CacheControlMemo {
    fn default() -> Self {
        Self::new()
    }
}
