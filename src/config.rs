//! Configuration Module
//!
//! Loads the service and cache policy configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::ConfigurationError;
use crate::policy::{Environment, HeaderConstraints, PolicyConfig};

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Expiration policy
    pub policy: PolicyConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `API_CACHE_SOFT_EXPIRES` - Soft expiration in ms (default: 30000)
    /// - `API_CACHE_HARD_EXPIRES` - Hard expiration in ms (default: 60000)
    /// - `DISABLE_TEST_OPTIMIZATION` - Keep production thresholds in tests (default: false)
    /// - `POLICY_ENVIRONMENT` - `production` or `test` (default: production)
    /// - `CACHE_CONTROL_CONSTRAINT`, `EXPIRES_CONSTRAINT`,
    ///   `WARPDRIVE_EXPIRES_CONSTRAINT` - Header constraints (default: false)
    ///
    /// Unset variables take their default; set but unparseable ones fail.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();

        let mut policy = PolicyConfig::new(
            parse_var(&lookup, "API_CACHE_SOFT_EXPIRES", defaults.policy.api_cache_soft_expires)?,
            parse_var(&lookup, "API_CACHE_HARD_EXPIRES", defaults.policy.api_cache_hard_expires)?,
        )
        .with_header_constraints(HeaderConstraints {
            cache_control: parse_flag(&lookup, "CACHE_CONTROL_CONSTRAINT")?,
            expires: parse_flag(&lookup, "EXPIRES_CONSTRAINT")?,
            x_warpdrive_expires: parse_flag(&lookup, "WARPDRIVE_EXPIRES_CONSTRAINT")?,
        });
        policy.disable_test_optimization = parse_flag(&lookup, "DISABLE_TEST_OPTIMIZATION")?;
        policy.environment = match lookup("POLICY_ENVIRONMENT").as_deref().map(str::trim) {
            None | Some("") => Environment::Production,
            Some(raw) if raw.eq_ignore_ascii_case("production") => Environment::Production,
            Some(raw) if raw.eq_ignore_ascii_case("test") => Environment::Test,
            Some(raw) => {
                return Err(ConfigurationError::InvalidField {
                    field: "POLICY_ENVIRONMENT".to_string(),
                    reason: format!("expected 'production' or 'test', got '{}'", raw),
                })
            }
        };

        Ok(Self {
            server_port: parse_var(&lookup, "SERVER_PORT", defaults.server_port)?,
            policy,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            policy: PolicyConfig::new(30_000, 60_000),
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err: T::Err| ConfigurationError::InvalidField {
                field: name.to_string(),
                reason: format!("'{}': {}", raw, err),
            }),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<bool, ConfigurationError> {
    match lookup(name).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") => Ok(true),
        Some("0") => Ok(false),
        Some(raw) => raw.to_ascii_lowercase().parse().map_err(|_| {
            ConfigurationError::InvalidField {
                field: name.to_string(),
                reason: format!("expected a boolean, got '{}'", raw),
            }
        }),
    }
}
