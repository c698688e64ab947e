//! The closed error taxonomy shared by every layer of the resilient client core.

use crate::utils::security::create_safe_error_message;
use serde::Deserialize;
use thiserror::Error;

/// Stable kind discriminant for a [`Error`], independent of its message or cause.
///
/// This is the only thing retry and circuit-breaker logic ever switch on; the
/// message and wrapped cause are for humans, not control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    CircuitOpen,
    BadGateway,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    RateLimited,
    ValidationError,
    ServiceUnavailable,
    InternalError,
    InvalidCredentials,
}

impl ErrorKind {
    /// The stable upper-snake-case code sent to/received from wire peers.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::CircuitOpen => "CIRCUIT_OPEN",
            ErrorKind::BadGateway => "BAD_GATEWAY",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::InternalError => "INTERNAL_ERROR",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
        }
    }

    /// The canonical HTTP status used when this kind is surfaced outward.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Timeout => 504,
            ErrorKind::CircuitOpen => 503,
            ErrorKind::BadGateway => 502,
            ErrorKind::NotFound => 404,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::Conflict => 409,
            ErrorKind::RateLimited => 429,
            ErrorKind::ValidationError => 400,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::InternalError => 500,
            ErrorKind::InvalidCredentials => 401,
        }
    }

    /// Whether an error of this kind should be retried by the retry engine.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout
                | ErrorKind::ServiceUnavailable
                | ErrorKind::RateLimited
                | ErrorKind::InternalError
        )
    }
}

fn default_message_for_status(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid.",
        401 => "Invalid credentials.",
        403 => "The operation is forbidden.",
        404 => "The resource was not found.",
        408 => "The request timed out.",
        409 => "The request conflicts with existing state.",
        429 => "Too many requests.",
        502 => "Upstream returned a bad gateway response.",
        503 => "The service is temporarily unavailable.",
        504 => "The request timed out upstream.",
        s if (500..600).contains(&s) => "An internal error occurred upstream.",
        _ => "The request failed.",
    }
}

/// Returns `true` iff `status` is one of the retryable HTTP status codes.
///
/// This is the only status-based retry signal the retry engine consults;
/// it is intentionally independent of [`ErrorKind::is_retryable`] so a
/// transport error (no status at all) can still be judged purely on kind.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::ValidationError,
        401 => ErrorKind::InvalidCredentials,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        408 => ErrorKind::Timeout,
        409 => ErrorKind::Conflict,
        429 => ErrorKind::RateLimited,
        502 => ErrorKind::BadGateway,
        503 => ErrorKind::ServiceUnavailable,
        504 => ErrorKind::Timeout,
        s if (500..600).contains(&s) => ErrorKind::InternalError,
        s if (400..500).contains(&s) => ErrorKind::ValidationError,
        _ => ErrorKind::InternalError,
    }
}

/// The wire envelope for an upstream error body: `{"error":{"code":...,"message":...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorEnvelopeInner,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelopeInner {
    #[allow(dead_code)]
    code: Option<String>,
    message: Option<String>,
}

/// Fallback envelope: a bare top-level `{"message": ...}`.
#[derive(Debug, Deserialize)]
struct BareMessage {
    message: String,
}

const MAX_PLAIN_BODY_LEN: usize = 200;

/// Central error type for the resilient client core.
///
/// Every outward-facing failure is this single variant. The `kind`,
/// `message`, and optional `status`/`source` are the only things callers
/// should rely on, never match on the `Display` text.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP status that produced this error, if any; falls back to the
    /// kind's canonical status otherwise.
    pub fn http_status(&self) -> u16 {
        self.status.unwrap_or_else(|| self.kind.http_status())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Timeout, message)
    }

    pub fn circuit_open(service_name: &str) -> Self {
        Error::new(
            ErrorKind::CircuitOpen,
            format!("circuit breaker '{service_name}' is open"),
        )
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::BadGateway, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::ValidationError, message)
    }

    /// Returns `true` iff this error's kind should be retried.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Maps a raw HTTP status and response body into a [`Error`].
    ///
    /// Body parsing order: structured `{"error":{...}}` envelope, then a
    /// bare `{"message":...}`, then a short plain-text body (<=200 bytes),
    /// then a status-keyed default message.
    pub fn map_http_status(status: u16, body: &[u8]) -> Self {
        let kind = kind_for_status(status);
        let text = String::from_utf8_lossy(body);
        let trimmed = text.trim();

        let message = if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(trimmed) {
            envelope
                .error
                .message
                .unwrap_or_else(|| default_message_for_status(status).to_string())
        } else if let Ok(bare) = serde_json::from_str::<BareMessage>(trimmed) {
            bare.message
        } else if !trimmed.is_empty() && trimmed.len() <= MAX_PLAIN_BODY_LEN {
            trimmed.to_string()
        } else {
            default_message_for_status(status).to_string()
        };

        let safe_message = create_safe_error_message(&message, "upstream error");
        Error::new(kind, safe_message).with_status(status)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
