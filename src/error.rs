//! Error types for the request cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Configuration Error ==
/// Raised while building a policy, an identifier cache or the service config.
///
/// Fatal: nothing is partially constructed when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required field is absent
    #[error("Missing configuration field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong type or an unparseable value
    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// An identifier strategy slot was filled twice
    #[error("Identifier strategy already registered")]
    StrategyAlreadyRegistered,
}

// == Consistency Error ==
/// Raised when an identifier update would break the identity invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// The identifier already carries a different id
    #[error("Cannot change id of {lid} from '{current}' to '{attempted}'")]
    IdChanged {
        lid: String,
        current: String,
        attempted: String,
    },

    /// Neither the identifier nor the incoming data carries an id
    #[error("Cannot update {lid}: no id assigned and none supplied")]
    MissingId { lid: String },

    /// A client-created record collides with an existing identifier
    #[error("Identifier {lid} already exists")]
    AlreadyExists { lid: String },

    /// A lid resolved to an identifier of a different record
    #[error("Identifier {lid} belongs to {existing}, not {requested}")]
    LidConflict {
        lid: String,
        existing: String,
        requested: String,
    },

    /// The identifier was forgotten or belongs to a reset cache
    #[error("Identifier {0} is no longer tracked")]
    Released(String),
}

// == Malformed Header Error ==
/// A numeric Cache-Control directive that could not be read.
///
/// Never returned to callers: the parser logs it and substitutes `0`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid Cache-Control value for {directive}: expected a non-negative integer, got '{value}'")]
pub struct MalformedHeaderError {
    pub directive: String,
    pub value: String,
}

// == Error Enum ==
/// Unified error type for the request cache.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// Identifier not known to the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Consistency(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the request cache.
pub type Result<T> = std::result::Result<T, Error>;
