//! Error types for marketplace operations.
//!
//! The clients sort every error into one of two buckets. Backend failures
//! (RPC down, contract revert, wrong network, unknown token) trigger the
//! demo-mode fallback and never reach the caller. Caller errors (no signing
//! identity, malformed input) are returned as-is because no demo result can
//! stand in for them.

use std::fmt;

/// Error codes for diagnostics and status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum MarketErrorCode {
    /// Feature not compiled in
    Unimplemented = 1000,
    /// Transport/network layer error
    Transport = 2000,
    /// Connection failed
    ConnectionFailed = 2001,
    /// Connection timeout
    ConnectionTimeout = 2002,
    /// JSON-RPC error object returned by the node
    Rpc = 2100,
    /// Contract call reverted
    Reverted = 2101,
    /// Node reports a different chain than configured
    NetworkMismatch = 2102,
    /// No signing identity available
    NoSigner = 3000,
    /// Token symbol has no configured address
    UnknownToken = 4000,
    /// Invalid request/data
    InvalidData = 5000,
    /// Serialization error
    Serialization = 5002,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Comprehensive error type for marketplace operations.
#[derive(Debug)]
pub enum MarketError {
    /// Feature not compiled in.
    Unimplemented(&'static str),

    /// Transport/network layer error.
    Transport(String),

    /// Connection failed.
    ConnectionFailed {
        /// Target endpoint or service
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Connection timeout.
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The node answered with a JSON-RPC error object.
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the node
        message: String,
    },

    /// A contract call or transaction reverted.
    Reverted {
        /// Contract function that reverted
        method: String,
        /// Revert reason, if the node supplied one
        reason: String,
    },

    /// The backend is on a different chain than the one configured.
    NetworkMismatch {
        /// Configured chain id
        expected: u64,
        /// Chain id reported by the node
        actual: u64,
    },

    /// No signing identity could be obtained (no wallet, no unlocked account).
    NoSigner(String),

    /// The streaming token symbol has no known address.
    UnknownToken(String),

    /// Invalid data provided.
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Serialization/deserialization error.
    Serialization(String),

    /// Internal/unexpected error.
    Internal(String),
}

impl MarketError {
    /// Get the numeric error code.
    pub fn code(&self) -> MarketErrorCode {
        match self {
            Self::Unimplemented(_) => MarketErrorCode::Unimplemented,
            Self::Transport(_) => MarketErrorCode::Transport,
            Self::ConnectionFailed { .. } => MarketErrorCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => MarketErrorCode::ConnectionTimeout,
            Self::Rpc { .. } => MarketErrorCode::Rpc,
            Self::Reverted { .. } => MarketErrorCode::Reverted,
            Self::NetworkMismatch { .. } => MarketErrorCode::NetworkMismatch,
            Self::NoSigner(_) => MarketErrorCode::NoSigner,
            Self::UnknownToken(_) => MarketErrorCode::UnknownToken,
            Self::InvalidData { .. } => MarketErrorCode::InvalidData,
            Self::Serialization(_) => MarketErrorCode::Serialization,
            Self::Internal(_) => MarketErrorCode::Internal,
        }
    }

    /// Returns true if this error means the backend is unusable and the
    /// client should fall back to demo mode.
    ///
    /// Caller errors return false: a missing signer or malformed input is
    /// surfaced rather than masked.
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, Self::NoSigner(_) | Self::InvalidData { .. })
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a revert error.
    pub fn reverted(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reverted {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unimplemented(label) => write!(f, "{} is not implemented", label),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::ConnectionFailed { target, reason } => {
                write!(f, "connection to {} failed: {}", target, reason)
            }
            Self::ConnectionTimeout {
                operation,
                timeout_ms,
            } => {
                write!(f, "{} timed out after {}ms", operation, timeout_ms)
            }
            Self::Rpc { code, message } => write!(f, "rpc error {}: {}", code, message),
            Self::Reverted { method, reason } => {
                if reason.is_empty() {
                    write!(f, "{} reverted", method)
                } else {
                    write!(f, "{} reverted: {}", method, reason)
                }
            }
            Self::NetworkMismatch { expected, actual } => {
                write!(
                    f,
                    "network mismatch: expected chain {}, backend is on chain {}",
                    expected, actual
                )
            }
            Self::NoSigner(msg) => write!(f, "no signing identity: {}", msg),
            Self::UnknownToken(symbol) => write!(f, "unknown super token: {}", symbol),
            Self::InvalidData { field, reason } => write!(f, "invalid {}: {}", field, reason),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for MarketError {}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MarketError::NetworkMismatch {
            expected: 80002,
            actual: 1,
        };
        assert_eq!(err.code(), MarketErrorCode::NetworkMismatch);
        assert!(err.is_backend_failure());
        assert_eq!(MarketError::NoSigner(String::new()).code() as i32, 3000);
    }

    #[test]
    fn caller_errors_are_not_backend_failures() {
        assert!(!MarketError::NoSigner("no accounts".into()).is_backend_failure());
        assert!(!MarketError::invalid_data("flow_rate", "negative").is_backend_failure());
        assert!(MarketError::Transport("refused".into()).is_backend_failure());
        assert!(MarketError::UnknownToken("fDAIx".into()).is_backend_failure());
    }

    #[test]
    fn test_error_display() {
        let err = MarketError::reverted("startSession", "listing busy");
        assert_eq!(err.to_string(), "startSession reverted: listing busy");

        let err = MarketError::reverted("stopSession", "");
        assert_eq!(err.to_string(), "stopSession reverted");
    }
}
