//! Error types for the Oracle abstraction layer
//!
//! This module defines all error types that can occur while driving a native
//! statement handle, from connection establishment through parameter binding,
//! execution, and fetching. It also provides the dual-representation error
//! diagnostics (`error_code`/`error_info`) exposed on connections and
//! statements.

use thiserror::Error;

use crate::driver::NativeError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// SQLSTATE-style success sentinel returned when no error is pending
pub const SQLSTATE_SUCCESS: &str = "00000";

/// SQLSTATE-style general-error sentinel returned for any pending native error
pub const SQLSTATE_GENERAL_ERROR: &str = "HY000";

/// Main error type for the Oracle abstraction layer
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Connection Errors
    // =========================================================================
    /// Session establishment failed
    #[error("connection failed{}: {message}",
        code.map(|c| format!(" (ORA-{:05})", c)).unwrap_or_default())]
    Connection {
        /// Native driver error code, when the driver reported one
        code: Option<u32>,
        /// Native driver error message
        message: String,
    },

    /// Invalid target descriptor (DSN)
    #[error("invalid connection string: {0}")]
    InvalidDsn(String),

    /// Connection has been closed
    #[error("connection is closed")]
    ConnectionClosed,

    // =========================================================================
    // Statement Errors
    // =========================================================================
    /// SQL parse/prepare failed
    #[error("statement error: {0}")]
    Statement(String),

    /// Cursor has been closed, no further fetches are possible
    #[error("cursor is closed")]
    CursorClosed,

    /// Parameter binding failed
    #[error("bind error on parameter {marker}: {message}")]
    Bind {
        /// The offending parameter marker
        marker: String,
        /// What went wrong, including the rejected value where known
        message: String,
    },

    /// Native execute call failed
    #[error("execution error: {0}")]
    Execution(String),

    // =========================================================================
    // Transaction Errors
    // =========================================================================
    /// Illegal transaction-state transition
    #[error("transaction error: {0}")]
    Transaction(&'static str),

    // =========================================================================
    // Capability Errors
    // =========================================================================
    /// Caller requested a capability this layer deliberately does not implement
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl Error {
    /// Create a connection error from a native driver error
    pub fn connection(native: NativeError) -> Self {
        Error::Connection {
            code: Some(native.code),
            message: native.message,
        }
    }

    /// Create a bind error naming the offending marker
    pub fn bind(marker: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Bind {
            marker: marker.into(),
            message: message.into(),
        }
    }

    /// Create a not-supported error
    pub fn not_supported(what: impl Into<String>) -> Self {
        Error::NotSupported(what.into())
    }

    /// Check if this is a transaction-state error
    pub fn is_transaction_error(&self) -> bool {
        matches!(self, Error::Transaction(_))
    }

    /// Check if this is a deliberate capability gap
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Error::NotSupported(_))
    }

    /// Check if this is a bind failure
    pub fn is_bind_error(&self) -> bool {
        matches!(self, Error::Bind { .. })
    }
}

/// Dual-representation error detail for `error_info` calls.
///
/// Callers check the coarse `sqlstate` first and only then inspect the native
/// code and message. The success form carries no detail at all.
///
/// # Example
///
/// ```rust
/// use oracle_dbal::{ErrorInfo, SQLSTATE_SUCCESS};
///
/// let info = ErrorInfo::success();
/// assert_eq!(info.sqlstate, SQLSTATE_SUCCESS);
/// assert!(info.code.is_none());
/// assert!(info.message.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Coarse status code (`"00000"` success, `"HY000"` general error)
    pub sqlstate: &'static str,
    /// Native numeric error code, absent on success
    pub code: Option<u32>,
    /// Native error message text, absent on success
    pub message: Option<String>,
}

impl ErrorInfo {
    /// The success sentinel with null detail
    pub fn success() -> Self {
        ErrorInfo {
            sqlstate: SQLSTATE_SUCCESS,
            code: None,
            message: None,
        }
    }

    /// The general-error sentinel plus native code and message
    pub fn general(code: u32, message: impl Into<String>) -> Self {
        ErrorInfo {
            sqlstate: SQLSTATE_GENERAL_ERROR,
            code: Some(code),
            message: Some(message.into()),
        }
    }

    /// Build from the native driver's last-error state
    pub fn from_last_error(last: Option<NativeError>) -> Self {
        match last {
            None => ErrorInfo::success(),
            Some(native) => ErrorInfo::general(native.code, native.message),
        }
    }

    /// Check whether this is the success sentinel
    pub fn is_success(&self) -> bool {
        self.sqlstate == SQLSTATE_SUCCESS
    }
}
