//! Policy Configuration
//!
//! Expiration thresholds and header constraints for the cache policy.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigurationError;
use crate::request::CachedDocument;

/// Custom expiration check. `None` defers to the header rules.
pub type ExpirationPredicate = Arc<dyn Fn(&CachedDocument) -> Option<bool> + Send + Sync>;

// == Environment ==
/// Where the policy runs. Under `Test` the soft threshold doubles as the
/// hard one and nothing is ever soft-expired, unless disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Test,
}

// == Header Constraints ==
/// Which response headers take part in hard expiration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConstraints {
    #[serde(rename = "Cache-Control", default)]
    pub cache_control: bool,
    #[serde(rename = "Expires", default)]
    pub expires: bool,
    #[serde(rename = "X-WarpDrive-Expires", default)]
    pub x_warpdrive_expires: bool,
}

impl HeaderConstraints {
    pub fn all() -> Self {
        Self {
            cache_control: true,
            expires: true,
            x_warpdrive_expires: true,
        }
    }
}

// == Constraints ==
#[derive(Clone, Default)]
pub struct Constraints {
    pub headers: HeaderConstraints,
    pub is_expired: Option<ExpirationPredicate>,
}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraints")
            .field("headers", &self.headers)
            .field("is_expired", &self.is_expired.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

// == Policy Config ==
/// Thresholds are in milliseconds, measured from the response `Date`.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    pub api_cache_soft_expires: u64,
    pub api_cache_hard_expires: u64,
    pub disable_test_optimization: bool,
    pub environment: Environment,
    pub constraints: Constraints,
}

impl PolicyConfig {
    pub fn new(api_cache_soft_expires: u64, api_cache_hard_expires: u64) -> Self {
        Self {
            api_cache_soft_expires,
            api_cache_hard_expires,
            disable_test_optimization: false,
            environment: Environment::Production,
            constraints: Constraints::default(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_test_optimization_disabled(mut self) -> Self {
        self.disable_test_optimization = true;
        self
    }

    pub fn with_header_constraints(mut self, headers: HeaderConstraints) -> Self {
        self.constraints.headers = headers;
        self
    }

    pub fn with_expiration_predicate(
        mut self,
        predicate: impl Fn(&CachedDocument) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        self.constraints.is_expired = Some(Arc::new(predicate));
        self
    }

    /// True when the test-environment shortcut applies.
    pub fn uses_test_shortcut(&self) -> bool {
        self.environment == Environment::Test && !self.disable_test_optimization
    }

    // == From JSON ==
    /// Reads the camelCase configuration object.
    ///
    /// Both durations are required and must be non-negative numbers.
    pub fn from_json(raw: &str) -> Result<Self, ConfigurationError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| ConfigurationError::InvalidField {
                field: "config".to_string(),
                reason: err.to_string(),
            })?;
        let object = value
            .as_object()
            .ok_or_else(|| ConfigurationError::InvalidField {
                field: "config".to_string(),
                reason: "expected an object".to_string(),
            })?;

        let mut config = Self::new(
            duration_field(object.get("apiCacheSoftExpires"), "apiCacheSoftExpires")?,
            duration_field(object.get("apiCacheHardExpires"), "apiCacheHardExpires")?,
        );

        if let Some(flag) = object.get("disableTestOptimization") {
            config.disable_test_optimization =
                flag.as_bool()
                    .ok_or_else(|| ConfigurationError::InvalidField {
                        field: "disableTestOptimization".to_string(),
                        reason: "expected a boolean".to_string(),
                    })?;
        }

        if let Some(environment) = object.get("environment") {
            config.environment = serde_json::from_value(environment.clone()).map_err(|err| {
                ConfigurationError::InvalidField {
                    field: "environment".to_string(),
                    reason: err.to_string(),
                }
            })?;
        }

        if let Some(headers) = object.get("constraints").and_then(|c| c.get("headers")) {
            config.constraints.headers =
                serde_json::from_value(headers.clone()).map_err(|err| {
                    ConfigurationError::InvalidField {
                        field: "constraints.headers".to_string(),
                        reason: err.to_string(),
                    }
                })?;
        }

        Ok(config)
    }
}

fn duration_field(value: Option<&Value>, field: &str) -> Result<u64, ConfigurationError> {
    let value = value.ok_or_else(|| ConfigurationError::MissingField(field.to_string()))?;
    match value.as_f64() {
        Some(ms) if ms.is_finite() && ms >= 0.0 => Ok(ms as u64),
        _ => Err(ConfigurationError::InvalidField {
            field: field.to_string(),
            reason: format!("expected a non-negative number of milliseconds, got {}", value),
        }),
    }
}
