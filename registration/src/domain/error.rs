//! Transport-agnostic error payload for registration outcomes.
//!
//! Route handlers and the CLI turn an [`Error`] into whatever envelope they
//! speak; the `code` stays stable across all of them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure category understood by every caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// One or more submitted fields failed validation.
    InvalidRequest,
    /// The username or email already belongs to another user.
    Conflict,
    /// The user being edited does not exist.
    NotFound,
    /// The user-record store could not be reached.
    ServiceUnavailable,
    /// Any other failure, e.g. a hashing error.
    InternalError,
}

impl ErrorCode {
    /// Wire name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
        }
    }

    /// Message used when a caller supplies a blank one.
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Validation error",
            Self::Conflict => "User already exists.",
            Self::NotFound => "User not found.",
            Self::ServiceUnavailable => "User record store unavailable.",
            Self::InternalError => "Internal error.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned to callers of the registration core.
///
/// ## Invariants
/// - `message` is never blank.
///
/// # Examples
/// ```
/// use registration::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::Conflict, "taken");
/// assert_eq!(err.code(), ErrorCode::Conflict);
/// assert_eq!(Error::conflict("  ").message(), "User already exists.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorPayload", into = "ErrorPayload")]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

/// Short name used throughout the crate.
pub type Error = DomainError;

/// Rejections raised by [`DomainError::try_new`] and deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl DomainError {
    /// Build an error, substituting [`ErrorCode::fallback_message`] for a
    /// blank `message`.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.fallback_message().to_owned(),
            details: None,
        })
    }

    /// Build an error, refusing a blank `message`.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Failure category.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Structured details, e.g. the per-field rejections.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// [`ErrorCode::InvalidRequest`] error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// [`ErrorCode::Conflict`] error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// [`ErrorCode::NotFound`] error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// [`ErrorCode::ServiceUnavailable`] error.
    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// [`ErrorCode::InternalError`] error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for DomainError {}

/// Wire shape of [`DomainError`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorPayload {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<DomainError> for ErrorPayload {
    fn from(error: DomainError) -> Self {
        let DomainError {
            code,
            message,
            details,
        } = error;
        Self {
            code,
            message,
            details,
        }
    }
}

impl TryFrom<ErrorPayload> for DomainError {
    type Error = ErrorValidationError;

    fn try_from(payload: ErrorPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            details: payload.details,
            ..Self::try_new(payload.code, payload.message)?
        })
    }
}
