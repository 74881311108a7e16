//! Shared error type across auditgate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Consumer is not allowed to call the method.
    AccessDenied,
    /// Unknown method.
    NotFound,
    /// Event bus has been shut down.
    Unavailable,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AccessDenied => "ACCESS_DENIED",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("access denied: consumer={consumer:?} method={method}")]
    AccessDenied { consumer: String, method: String },
    #[error("unknown method: {0}")]
    NotFound(String),
    #[error("event bus closed")]
    BusClosed,
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("transport: {0}")]
    Transport(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl AuditError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            AuditError::BadRequest(_) => ClientCode::BadRequest,
            AuditError::AccessDenied { .. } => ClientCode::AccessDenied,
            AuditError::NotFound(_) => ClientCode::NotFound,
            AuditError::BusClosed => ClientCode::Unavailable,
            AuditError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            AuditError::Transport(_) | AuditError::Internal(_) => ClientCode::Internal,
        }
    }
}
