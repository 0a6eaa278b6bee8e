// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Caller-facing error envelope.

use serde::Serialize;
use thiserror::Error;

/// Failure class reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApiErrorKind {
    /// The request itself is malformed.
    #[serde(rename = "bad_request")]
    BadRequest,
    /// The requested resource does not exist.
    ///
    /// [`crate::FlatGateway`] never returns this; lookup-by-id routes in a
    /// transport adapter report through it so they share the envelope.
    #[serde(rename = "not_found")]
    NotFound,
    /// Storage or rebuild failure on our side.
    #[serde(rename = "internal_server_error")]
    Internal,
}

impl ApiErrorKind {
    /// HTTP-style status code for this class.
    pub const fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

/// Error returned by [`crate::FlatGateway`].
///
/// `message` is stable and safe to show; `cause` carries the underlying error
/// text for logs and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    status: u16,
    #[serde(rename = "error")]
    kind: ApiErrorKind,
    #[serde(skip)]
    cause: Option<String>,
}

impl ApiError {
    fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: kind.status(),
            kind,
            cause: None,
        }
    }

    /// 400-class error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::BadRequest, message)
    }

    /// 404-class error, for transport adapters (see [`ApiErrorKind::NotFound`]).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    /// 500-class error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Internal, message)
    }

    /// Attaches the underlying error text.
    pub fn with_cause(mut self, cause: impl std::fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// Caller-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Failure class.
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// HTTP-style status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Underlying error text, if any.
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// `true` when retrying the same request cannot succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind, ApiErrorKind::BadRequest | ApiErrorKind::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_without_cause() {
        let err = ApiError::internal("error saving the flat_info").with_cause("disk full");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "message": "error saving the flat_info",
                "status": 500,
                "error": "internal_server_error",
            })
        );
        assert_eq!(err.cause(), Some("disk full"));
        assert_eq!(err.to_string(), "error saving the flat_info");
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(ApiError::bad_request("x").is_client_error());
        assert!(ApiError::not_found("x").is_client_error());
        assert!(!ApiError::internal("x").is_client_error());
        assert_eq!(ApiError::not_found("x").status(), 404);
        assert_eq!(
            serde_json::to_value(ApiError::not_found("no flat_info with id abc")).unwrap(),
            json!({ "message": "no flat_info with id abc", "status": 404, "error": "not_found" })
        );
    }
}
