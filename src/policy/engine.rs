//! Cache Policy Engine
//!
//! Decides whether a cached document is fresh, stale or expired, and keeps
//! the per-store invalidation record current as requests complete.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::debug;

use crate::identifier::StableDocumentIdentifier;
use crate::policy::{
    parse_http_date, CacheControlMemo, CacheControlValue, Clock, PolicyConfig, SystemClock,
};
use crate::request::{RequestInfo, ResponseHeaders, ResponseInfo};
use crate::store::{CacheEvent, PolicyStore};

pub const HEADER_AGE: &str = "age";
pub const HEADER_CACHE_CONTROL: &str = "cache-control";
pub const HEADER_DATE: &str = "date";
pub const HEADER_EXPIRES: &str = "expires";
pub const HEADER_WARPDRIVE_EXPIRES: &str = "x-warpdrive-expires";

/// Logs a verdict when built with the `verdict-trace` feature.
macro_rules! trace_verdict {
    ($check:expr, $identifier:expr, $expired:expr, $reason:expr) => {{
        #[cfg(feature = "verdict-trace")]
        tracing::debug!(
            check = $check,
            identifier = %$identifier,
            expired = $expired,
            reason = %$reason,
            "cache policy verdict"
        );
        #[cfg(not(feature = "verdict-trace"))]
        let _ = (&$identifier, &$reason);
    }};
}

// == Cache Decision ==
/// What a dispatcher should do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheDecision {
    /// Serve from cache
    Fresh,
    /// Serve from cache and refresh in the background
    Stale,
    /// Fetch before serving
    Expired,
}

impl CacheDecision {
    pub fn from_verdicts(hard_expired: bool, soft_expired: bool) -> Self {
        if hard_expired {
            CacheDecision::Expired
        } else if soft_expired {
            CacheDecision::Stale
        } else {
            CacheDecision::Fresh
        }
    }
}

// == Verdict Reason ==
/// The rule that decided a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictReason {
    Invalidated,
    NotCached,
    Predicate,
    NoHeaders,
    WarpDriveExpires,
    CacheControl,
    Expires,
    NoDate,
    Age,
    TestEnvironment,
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            VerdictReason::Invalidated => "explicitly invalidated",
            VerdictReason::NotCached => "no cached response",
            VerdictReason::Predicate => "custom isExpired predicate",
            VerdictReason::NoHeaders => "response has no headers",
            VerdictReason::WarpDriveExpires => "X-WarpDrive-Expires header",
            VerdictReason::CacheControl => "Cache-Control max-age against Age",
            VerdictReason::Expires => "Expires header",
            VerdictReason::NoDate => "response has no Date header",
            VerdictReason::Age => "time since Date header",
            VerdictReason::TestEnvironment => "test environment",
        };
        f.write_str(reason)
    }
}

// == Cache Policy ==
pub struct CachePolicy {
    config: PolicyConfig,
    clock: Arc<dyn Clock>,
    /// Shared across stores; locked only for the parse lookup
    cache_control: Mutex<CacheControlMemo>,
}

impl CachePolicy {
    // == Constructor ==
    pub fn new(config: PolicyConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: PolicyConfig, clock: impl Clock + 'static) -> Self {
        Self {
            config,
            clock: Arc::new(clock),
            cache_control: Mutex::new(CacheControlMemo::new()),
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    // == Invalidate Request ==
    /// Marks one document hard-expired until a later request re-registers it.
    pub fn invalidate_request<S: PolicyStore + ?Sized>(
        &self,
        identifier: &StableDocumentIdentifier,
        store: &mut S,
    ) {
        if store.invalidation_mut().invalidate(identifier) {
            debug!(lid = identifier.lid(), "request invalidated");
        }
    }

    // == Invalidate Requests For Type ==
    /// Invalidates every document depending on `resource_type` and emits an
    /// `invalidated` event for each. Returns how many documents that was.
    pub fn invalidate_requests_for_type<S: PolicyStore + ?Sized>(
        &self,
        resource_type: &str,
        store: &mut S,
    ) -> usize {
        let affected = store.invalidation_mut().invalidate_type(resource_type);
        for identifier in &affected {
            store.notify(identifier, CacheEvent::Invalidated);
        }
        if !affected.is_empty() {
            debug!(
                resource_type,
                count = affected.len(),
                "requests invalidated for type"
            );
        }
        affected.len()
    }

    // == Did Request ==
    /// Updates invalidation bookkeeping after any request completes.
    ///
    /// A successful create invalidates every document depending on the
    /// created records' types and on the request's declared types.
    /// Any other request with an identifier registers that identifier
    /// under its declared types and clears its invalidated mark.
    pub fn did_request<S: PolicyStore + ?Sized>(
        &self,
        request: &RequestInfo,
        response: Option<&ResponseInfo>,
        identifier: Option<&StableDocumentIdentifier>,
        store: &mut S,
    ) {
        if request.is_create() {
            if response.map_or(false, ResponseInfo::is_success) {
                let types: BTreeSet<&str> = request
                    .records
                    .iter()
                    .map(|record| record.resource_type.as_str())
                    .chain(request.cache_types().iter().map(String::as_str))
                    .collect();
                for resource_type in types {
                    self.invalidate_requests_for_type(resource_type, store);
                }
            }
            return;
        }

        let Some(identifier) = identifier else {
            return;
        };
        let record = store.invalidation_mut();
        for resource_type in request.cache_types() {
            record.register(identifier, resource_type);
            record.revalidate(identifier);
        }
    }

    // == Hard Expiration ==
    /// True when cached data must not be served without refetching.
    pub fn is_hard_expired<S: PolicyStore + ?Sized>(
        &self,
        identifier: &StableDocumentIdentifier,
        store: &S,
    ) -> bool {
        let (expired, reason) = self.hard_expiration(identifier, store);
        trace_verdict!("hard", identifier, expired, reason);
        expired
    }

    fn hard_expiration<S: PolicyStore + ?Sized>(
        &self,
        identifier: &StableDocumentIdentifier,
        store: &S,
    ) -> (bool, VerdictReason) {
        if store.invalidation().is_invalidated(identifier) {
            return (true, VerdictReason::Invalidated);
        }
        let Some(document) = store.peek_request(identifier) else {
            return (true, VerdictReason::NotCached);
        };
        if let Some(verdict) = self
            .config
            .constraints
            .is_expired
            .as_ref()
            .and_then(|predicate| predicate(document))
        {
            return (verdict, VerdictReason::Predicate);
        }
        let Some(headers) = document.headers() else {
            return (true, VerdictReason::NoHeaders);
        };

        let now = self.clock.now_ms();
        let constraints = self.config.constraints.headers;

        if constraints.x_warpdrive_expires {
            if let Some(at) = headers.get(HEADER_WARPDRIVE_EXPIRES).and_then(parse_http_date) {
                return (now >= at, VerdictReason::WarpDriveExpires);
            }
        }
        if constraints.cache_control {
            if let Some(deadline) = self.cache_control_deadline(headers) {
                return (now >= deadline, VerdictReason::CacheControl);
            }
        }
        if constraints.expires {
            if let Some(at) = headers.get(HEADER_EXPIRES).and_then(parse_http_date) {
                return (now >= at, VerdictReason::Expires);
            }
        }

        let Some(date) = headers.get(HEADER_DATE).and_then(parse_http_date) else {
            return (true, VerdictReason::NoDate);
        };
        let threshold = if self.config.uses_test_shortcut() {
            self.config.api_cache_soft_expires
        } else {
            self.config.api_cache_hard_expires
        };
        (now >= offset(date, threshold), VerdictReason::Age)
    }

    /// `Date + (max-age - Age)` in ms, if every input header is usable.
    fn cache_control_deadline(&self, headers: &ResponseHeaders) -> Option<i64> {
        let raw = headers.get(HEADER_CACHE_CONTROL)?;
        let age: i64 = headers.get(HEADER_AGE)?.trim().parse().ok()?;
        let max_age = self.parse_cache_control(raw).freshness_lifetime()?;
        let date = headers.get(HEADER_DATE).and_then(parse_http_date)?;

        let remaining = i64::try_from(max_age)
            .unwrap_or(i64::MAX)
            .saturating_sub(age)
            .saturating_mul(1000);
        Some(date.saturating_add(remaining))
    }

    /// Memoized Cache-Control parse.
    pub fn parse_cache_control(&self, header: &str) -> CacheControlValue {
        self.cache_control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_parse(header)
    }

    // == Soft Expiration ==
    /// True when cached data may be served but should be refreshed.
    pub fn is_soft_expired<S: PolicyStore + ?Sized>(
        &self,
        identifier: &StableDocumentIdentifier,
        store: &S,
    ) -> bool {
        let (expired, reason) = self.soft_expiration(identifier, store);
        trace_verdict!("soft", identifier, expired, reason);
        expired
    }

    fn soft_expiration<S: PolicyStore + ?Sized>(
        &self,
        identifier: &StableDocumentIdentifier,
        store: &S,
    ) -> (bool, VerdictReason) {
        if self.config.uses_test_shortcut() {
            return (false, VerdictReason::TestEnvironment);
        }
        let Some(document) = store.peek_request(identifier) else {
            return (true, VerdictReason::NotCached);
        };
        let Some(date) = document
            .headers()
            .and_then(|headers| headers.get(HEADER_DATE))
            .and_then(parse_http_date)
        else {
            return (true, VerdictReason::NoDate);
        };
        let now = self.clock.now_ms();
        (
            now >= offset(date, self.config.api_cache_soft_expires),
            VerdictReason::Age,
        )
    }

    // == Evaluate ==
    /// Combines both checks with the request's `reload` and
    /// `background_reload` options. Uncacheable requests always fetch.
    pub fn evaluate<S: PolicyStore + ?Sized>(
        &self,
        request: &RequestInfo,
        identifier: Option<&StableDocumentIdentifier>,
        store: &S,
    ) -> CacheDecision {
        let Some(identifier) = identifier else {
            return CacheDecision::Expired;
        };
        let options = request.cache_options.as_ref();
        if options.map_or(false, |o| o.reload) || self.is_hard_expired(identifier, store) {
            return CacheDecision::Expired;
        }
        if options.map_or(false, |o| o.background_reload) || self.is_soft_expired(identifier, store) {
            return CacheDecision::Stale;
        }
        CacheDecision::Fresh
    }
}

impl fmt::Debug for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePolicy")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish()
    }
}

fn offset(timestamp_ms: i64, delta_ms: u64) -> i64 {
    timestamp_ms.saturating_add(i64::try_from(delta_ms).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::ResourceData;
    use crate::policy::{format_http_date, Environment, HeaderConstraints, ManualClock};
    use crate::request::{CacheOptions, CachedDocument, CREATE_RECORD_OP};
    use crate::store::Store;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    const NOW: i64 = 1_700_000_000_000;

    fn clock() -> ManualClock {
        ManualClock::new(NOW)
    }

    fn config() -> PolicyConfig {
        PolicyConfig::new(30_000, 60_000)
    }

    fn date(offset_ms: i64) -> String {
        format_http_date(NOW + offset_ms).unwrap()
    }

    fn cache(
        policy: &CachePolicy,
        store: &mut Store,
        request: RequestInfo,
        headers: Option<ResponseHeaders>,
    ) -> StableDocumentIdentifier {
        let response = ResponseInfo {
            status: 200,
            headers,
        };
        store
            .record_response(policy, request, Some(response), Value::Null)
            .unwrap()
    }

    fn typed_get(url: &str, types: &[&str]) -> RequestInfo {
        RequestInfo::get(url).with_cache_options(CacheOptions {
            types: types.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_no_entry_is_hard_and_soft_expired() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let identifier = store
            .identifiers_mut()
            .get_or_create_document_identifier(&RequestInfo::get("/users"))
            .unwrap();

        assert!(policy.is_hard_expired(&identifier, &store));
        assert!(policy.is_soft_expired(&identifier, &store));
    }

    #[test]
    fn test_between_soft_and_hard_threshold() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(-45_000));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(!policy.is_hard_expired(&identifier, &store));
        assert!(policy.is_soft_expired(&identifier, &store));
        assert_eq!(
            policy.evaluate(&RequestInfo::get("/users"), Some(&identifier), &store),
            CacheDecision::Stale
        );
    }

    #[test]
    fn test_past_hard_threshold() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(-70_000));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_fresh_then_ages_with_clock() {
        let clock = clock();
        let policy = CachePolicy::with_clock(config(), clock.clone());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(0));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert_eq!(
            policy.evaluate(&RequestInfo::get("/users"), Some(&identifier), &store),
            CacheDecision::Fresh
        );

        clock.advance(30_000);
        assert!(policy.is_soft_expired(&identifier, &store));
        assert!(!policy.is_hard_expired(&identifier, &store));

        clock.advance(30_000);
        assert!(policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_missing_headers_is_hard_expired() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), None);

        assert!(policy.is_hard_expired(&identifier, &store));
        assert!(policy.is_soft_expired(&identifier, &store));
    }

    #[test]
    fn test_missing_date_is_hard_expired() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Content-Type", "application/json");
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_cache_control_past_max_age() {
        let config = config().with_header_constraints(HeaderConstraints {
            cache_control: true,
            ..Default::default()
        });
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new()
            .with("Cache-Control", "max-age=100")
            .with("Age", "150")
            .with("Date", date(-10_000));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_cache_control_within_max_age_overrides_date_threshold() {
        let config = config().with_header_constraints(HeaderConstraints {
            cache_control: true,
            ..Default::default()
        });
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        // Two minutes old, past the 60s threshold, but max-age allows 300s
        let headers = ResponseHeaders::new()
            .with("Cache-Control", "s-maxage=300")
            .with("Age", "0")
            .with("Date", date(-120_000));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(!policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_cache_control_ignored_when_constraint_disabled() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new()
            .with("Cache-Control", "max-age=100")
            .with("Age", "150")
            .with("Date", date(-10_000));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(!policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_cache_control_without_age_falls_through() {
        let config = config().with_header_constraints(HeaderConstraints::all());
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new()
            .with("Cache-Control", "max-age=0")
            .with("Date", date(-10_000));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        // Falls through to the Date threshold
        assert!(!policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_expires_header() {
        let config = config().with_header_constraints(HeaderConstraints {
            expires: true,
            ..Default::default()
        });
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        let future = ResponseHeaders::new()
            .with("Expires", date(5_000))
            .with("Date", date(-300_000));
        let past = ResponseHeaders::new()
            .with("Expires", date(-5_000))
            .with("Date", date(0));
        let fresh = cache(&policy, &mut store, RequestInfo::get("/a"), Some(future));
        let stale = cache(&policy, &mut store, RequestInfo::get("/b"), Some(past));

        assert!(!policy.is_hard_expired(&fresh, &store));
        assert!(policy.is_hard_expired(&stale, &store));
    }

    #[test]
    fn test_warpdrive_expires_takes_precedence() {
        let config = config().with_header_constraints(HeaderConstraints::all());
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new()
            .with("X-WarpDrive-Expires", date(-1_000))
            .with("Expires", date(60_000))
            .with("Date", date(0));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_unparseable_expires_falls_through() {
        let config = config().with_header_constraints(HeaderConstraints::all());
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new()
            .with("Expires", "0")
            .with("Date", date(0));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(!policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_custom_predicate_wins_over_headers() {
        let config = config().with_expiration_predicate(|document: &CachedDocument| {
            match document.request.url.as_deref() {
                Some("/always-fresh") => Some(false),
                Some("/always-expired") => Some(true),
                _ => None,
            }
        });
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        let fresh = cache(&policy, &mut store, RequestInfo::get("/always-fresh"), None);
        let expired = cache(
            &policy,
            &mut store,
            RequestInfo::get("/always-expired"),
            Some(ResponseHeaders::new().with("Date", date(0))),
        );
        let deferred = cache(
            &policy,
            &mut store,
            RequestInfo::get("/other"),
            Some(ResponseHeaders::new().with("Date", date(0))),
        );

        assert!(!policy.is_hard_expired(&fresh, &store));
        assert!(policy.is_hard_expired(&expired, &store));
        assert!(!policy.is_hard_expired(&deferred, &store));
    }

    #[test]
    fn test_test_environment_uses_soft_threshold() {
        let config = config().with_environment(Environment::Test);
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(-45_000));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(policy.is_hard_expired(&identifier, &store));
        assert!(!policy.is_soft_expired(&identifier, &store));
    }

    #[test]
    fn test_test_environment_optimization_disabled() {
        let config = config()
            .with_environment(Environment::Test)
            .with_test_optimization_disabled();
        let policy = CachePolicy::with_clock(config, clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(-45_000));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        assert!(!policy.is_hard_expired(&identifier, &store));
        assert!(policy.is_soft_expired(&identifier, &store));
    }

    #[test]
    fn test_invalidate_request_until_refetched_with_types() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let identifier = cache(
            &policy,
            &mut store,
            typed_get("/users", &["user"]),
            Some(ResponseHeaders::new().with("Date", date(0))),
        );

        policy.invalidate_request(&identifier, &mut store);
        policy.invalidate_request(&identifier, &mut store);
        assert!(policy.is_hard_expired(&identifier, &store));

        // A refetch without declared types keeps the mark
        cache(
            &policy,
            &mut store,
            RequestInfo::get("/users"),
            Some(ResponseHeaders::new().with("Date", date(0))),
        );
        assert!(policy.is_hard_expired(&identifier, &store));

        cache(
            &policy,
            &mut store,
            typed_get("/users", &["user"]),
            Some(ResponseHeaders::new().with("Date", date(0))),
        );
        assert!(!policy.is_hard_expired(&identifier, &store));
    }

    #[test]
    fn test_invalidate_for_type_notifies_each_dependent() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.notifications_mut().subscribe(move |identifier, event| {
            if event == CacheEvent::Invalidated {
                sink.lock().unwrap().push(identifier.lid().to_string());
            }
        });
        let headers = ResponseHeaders::new().with("Date", date(0));
        let users = cache(&policy, &mut store, typed_get("/users", &["user"]), Some(headers.clone()));
        let teams = cache(&policy, &mut store, typed_get("/teams", &["team", "user"]), Some(headers.clone()));
        let posts = cache(&policy, &mut store, typed_get("/posts", &["post"]), Some(headers));

        assert_eq!(policy.invalidate_requests_for_type("user", &mut store), 2);

        assert!(policy.is_hard_expired(&users, &store));
        assert!(policy.is_hard_expired(&teams, &store));
        assert!(!policy.is_hard_expired(&posts, &store));
        assert_eq!(seen.lock().unwrap().as_slice(), ["/teams", "/users"]);

        assert_eq!(policy.invalidate_requests_for_type("ghost", &mut store), 0);
    }

    #[test]
    fn test_successful_create_invalidates_dependents() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(0));
        let people = cache(&policy, &mut store, typed_get("/people", &["person"]), Some(headers.clone()));
        let teams = cache(&policy, &mut store, typed_get("/teams", &["team"]), Some(headers.clone()));

        let create = RequestInfo::get("/people")
            .with_method("POST")
            .with_op(CREATE_RECORD_OP)
            .with_records(vec![ResourceData::new("person", "1")]);
        store.record_response(
            &policy,
            create,
            Some(ResponseInfo::new(201, headers)),
            Value::Null,
        );

        assert!(policy.is_hard_expired(&people, &store));
        assert!(!policy.is_hard_expired(&teams, &store));
    }

    #[test]
    fn test_create_invalidates_declared_types_too() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(0));
        let teams = cache(&policy, &mut store, typed_get("/teams", &["team"]), Some(headers.clone()));

        let create = typed_get("/people", &["team"])
            .with_method("POST")
            .with_op(CREATE_RECORD_OP)
            .with_records(vec![ResourceData::new_record("person")]);
        policy.did_request(&create, Some(&ResponseInfo::new(200, headers)), None, &mut store);

        assert!(policy.is_hard_expired(&teams, &store));
    }

    #[test]
    fn test_failed_create_invalidates_nothing() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(0));
        let people = cache(&policy, &mut store, typed_get("/people", &["person"]), Some(headers.clone()));

        let create = RequestInfo::get("/people")
            .with_method("POST")
            .with_op(CREATE_RECORD_OP)
            .with_records(vec![ResourceData::new("person", "1")]);
        policy.did_request(&create, Some(&ResponseInfo::new(422, headers)), None, &mut store);
        policy.did_request(&create, None, None, &mut store);

        assert!(!policy.is_hard_expired(&people, &store));
    }

    #[test]
    fn test_create_does_not_register_identifier() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let identifier = store
            .identifiers_mut()
            .get_or_create_document_identifier(&RequestInfo::get("/people"))
            .unwrap();

        let create = typed_get("/people", &["person"]).with_op(CREATE_RECORD_OP);
        policy.did_request(
            &create,
            Some(&ResponseInfo::new(201, ResponseHeaders::new())),
            Some(&identifier),
            &mut store,
        );

        assert!(store.invalidation().dependents("person").is_empty());
    }

    #[test]
    fn test_evaluate_honors_reload_options() {
        let policy = CachePolicy::with_clock(config(), clock());
        let mut store = Store::new();
        let headers = ResponseHeaders::new().with("Date", date(0));
        let identifier = cache(&policy, &mut store, RequestInfo::get("/users"), Some(headers));

        let reload = RequestInfo::get("/users").with_cache_options(CacheOptions {
            reload: true,
            ..Default::default()
        });
        let background = RequestInfo::get("/users").with_cache_options(CacheOptions {
            background_reload: true,
            ..Default::default()
        });

        assert_eq!(policy.evaluate(&reload, Some(&identifier), &store), CacheDecision::Expired);
        assert_eq!(policy.evaluate(&background, Some(&identifier), &store), CacheDecision::Stale);
        assert_eq!(
            policy.evaluate(&RequestInfo::get("/users"), None, &store),
            CacheDecision::Expired
        );
    }

    #[test]
    fn test_decision_from_verdicts() {
        assert_eq!(CacheDecision::from_verdicts(true, true), CacheDecision::Expired);
        assert_eq!(CacheDecision::from_verdicts(false, true), CacheDecision::Stale);
        assert_eq!(CacheDecision::from_verdicts(false, false), CacheDecision::Fresh);
    }

    #[test]
    fn test_parse_cache_control_is_memoized() {
        let policy = CachePolicy::new(config());
        let first = policy.parse_cache_control("max-age=not-a-number");
        let second = policy.parse_cache_control("max-age=not-a-number");

        assert_eq!(first.max_age, Some(0));
        assert_eq!(first, second);
    }
}
