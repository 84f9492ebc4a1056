//! Error types for the API client.
//!
//! # Design
//! Every failure of a call lands in one `ApiError`. Non-2xx responses carry a
//! normalized `ApiErrorResponse` with the raw body kept in `payload`, so
//! callers can match on `code` without losing backend-specific detail.
//! `ApiError::to_response` flattens the other variants into the same shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";
pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";
pub const SERIALIZATION_ERROR_CODE: &str = "SERIALIZATION_ERROR";
pub const PARSE_ERROR_CODE: &str = "PARSE_ERROR";

/// Normalized error body: `{ code, message, payload? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Normalize an arbitrary JSON error body.
    ///
    /// `code` and `message` are read from string fields of the same name;
    /// missing or non-string fields fall back to the unknown-error defaults.
    /// The whole body is kept as the payload.
    pub fn from_body(body: Value) -> Self {
        let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
        let code = field("code").unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string());
        let message = field("message").unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
        Self {
            code,
            message,
            payload: Some(body),
        }
    }
}

/// Failure to obtain a response from the transport.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::with_source(err.to_string(), err)
    }
}

/// Errors returned by `ApiClient` calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request data could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// No response was received (connect, DNS, timeout).
    #[error("network error: {0}")]
    Transport(#[from] TransportError),

    /// The response body was not valid JSON, or did not fit the requested type.
    #[error("deserialization failed (HTTP {status}): {source}")]
    Deserialization {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} {}: {}", .error.code, .error.message)]
    Api { status: u16, error: ApiErrorResponse },
}

impl ApiError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &str {
        match self {
            ApiError::Serialization(_) => SERIALIZATION_ERROR_CODE,
            ApiError::Transport(_) => NETWORK_ERROR_CODE,
            ApiError::Deserialization { .. } => PARSE_ERROR_CODE,
            ApiError::Api { error, .. } => &error.code,
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Deserialization { status, .. } | ApiError::Api { status, .. } => {
                Some(*status)
            }
            ApiError::Serialization(_) | ApiError::Transport(_) => None,
        }
    }

    /// The normalized `{ code, message, payload }` shape of this error.
    pub fn to_response(&self) -> ApiErrorResponse {
        match self {
            ApiError::Api { error, .. } => error.clone(),
            ApiError::Transport(err) => ApiErrorResponse::new(NETWORK_ERROR_CODE, err.message())
                .with_payload(json!({ "originalError": err.message() })),
            ApiError::Serialization(err) => {
                ApiErrorResponse::new(SERIALIZATION_ERROR_CODE, err.to_string())
            }
            ApiError::Deserialization { status, source } => {
                ApiErrorResponse::new(PARSE_ERROR_CODE, source.to_string())
                    .with_payload(json!({ "status": status }))
            }
        }
    }
}
