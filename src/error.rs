//! Error types for the provider bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use ton_provider_bridge::{Error, Result};
//!
//! async fn balance(provider: &Provider) -> Result<String> {
//!     provider.request_as("ton_getBalance", vec!["addr1".into()]).await
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Request | [`Error::InvalidArgument`], [`Error::RequestTimeout`] |
//! | Remote | [`Error::Rpc`] |
//! | Transport | [`Error::Transport`], [`Error::ChannelClosed`] |
//! | External | [`Error::Json`] |
//!
//! Malformed inbound traffic is never an error: the router drops it
//! silently, see [`crate::provider::router`].

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a [`crate::BridgeConfigBuilder`] holds an invalid value.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Request Errors
    // ========================================================================
    /// Invalid argument passed to a request.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Caller-layered timeout expired before the wallet answered.
    ///
    /// The bridge never times out on its own; this is only produced by
    /// [`crate::PendingRequest::with_timeout`].
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// The wallet answered with an error payload.
    ///
    /// The payload is kept exactly as the wallet sent it.
    #[error("Wallet returned error: {payload}")]
    Rpc {
        /// Error payload reported by the wallet context.
        payload: Value,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The host transport refused an outbound message.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The pending request was dropped without a response.
    ///
    /// Happens when the provider slot is torn down.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates a remote error carrying the wallet's payload.
    #[inline]
    pub fn rpc(payload: Value) -> Self {
        Self::Rpc { payload }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a caller-layered timeout.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns `true` if the wallet reported this failure.
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Rpc { .. })
    }

    /// Returns the wallet's error payload, if this is a remote error.
    #[inline]
    #[must_use]
    pub fn remote_payload(&self) -> Option<&Value> {
        match self {
            Self::Rpc { payload } => Some(payload),
            _ => None,
        }
    }

    /// Returns `true` if this is a transport error.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::ChannelClosed(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
