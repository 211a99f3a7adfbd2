use crate::{Dialect, Error};
use thiserror::Error;

/// Failure reported by a native driver.
///
/// `code` is whatever the backend uses to identify the failure: the SQLSTATE, the vendor error
/// number or the sqlite extended result code, always rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct NativeError {
    pub code: String,
    pub message: String,
}

impl NativeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Classified database failure.
///
/// It travels inside [`Error`](crate::Error), use [`DatabaseError::of`] or
/// `error.downcast_ref::<DatabaseError>()` to inspect it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    /// Misuse detected while compiling, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Operation `{operation}` is not supported by {dialect}")]
    UnsupportedOperation {
        operation: String,
        dialect: Dialect,
    },
    #[error("Deadlock detected: {0}")]
    Deadlock(NativeError),
    #[error("Connection lost: {0}")]
    ConnectionLost(NativeError),
    /// The statement ran inside a transaction that can no longer be trusted, the whole business
    /// transaction must be restarted by the caller.
    #[error("Transaction lost at depth {depth}: {cause}")]
    TransactionLost { depth: u32, cause: NativeError },
    #[error("There is no active transaction")]
    NoActiveTransaction,
    #[error(transparent)]
    Driver(#[from] NativeError),
}

impl DatabaseError {
    pub fn configuration(message: impl Into<String>) -> Self {
        DatabaseError::Configuration(message.into())
    }

    pub fn unsupported(operation: impl Into<String>, dialect: Dialect) -> Self {
        DatabaseError::UnsupportedOperation {
            operation: operation.into(),
            dialect,
        }
    }

    /// Returns the classified error carried by `error`, if any.
    pub fn of(error: &Error) -> Option<&DatabaseError> {
        error.downcast_ref::<DatabaseError>()
    }

    /// Copy of the classified error, unclassified errors become configuration errors.
    pub(crate) fn capture(error: &Error) -> DatabaseError {
        match DatabaseError::of(error) {
            Some(e) => e.clone(),
            None => DatabaseError::Configuration(format!("{:#}", error)),
        }
    }
}
