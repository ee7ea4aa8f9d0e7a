//! Request and Response message types.
//!
//! Defines the JSON-RPC payloads carried inside transport envelopes
//! between the page (Rust) and the wallet context (extension).

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::RequestId;

// ============================================================================
// Constants
// ============================================================================

/// Protocol-version marker carried by every JSON-RPC message.
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// RequestEnvelope
// ============================================================================

/// A JSON-RPC request from the page to the wallet.
///
/// # Format
///
/// ```json
/// {
///   "jsonrpc": "2.0",
///   "id": 0,
///   "method": "ton_getBalance",
///   "params": ["addr1"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Protocol-version marker (always `"2.0"`).
    pub jsonrpc: String,

    /// Correlation id matching the eventual response.
    pub id: RequestId,

    /// Wallet method name.
    pub method: String,

    /// Positional parameters.
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RequestEnvelope {
    /// Creates a new request envelope.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// ResponseEnvelope
// ============================================================================

/// A JSON-RPC response from the wallet, already classified.
///
/// `outcome` is `Ok(result)` on success and `Err(payload)` when the wallet
/// reported a failure. The error payload is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Result or error payload.
    pub outcome: Result<Value, Value>,
}

impl ResponseEnvelope {
    /// Creates a successful response.
    #[inline]
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            id,
            outcome: Ok(result),
        }
    }

    /// Creates a failed response.
    #[inline]
    #[must_use]
    pub fn failure(id: RequestId, error: Value) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }

    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Classifies a nested `message` object that carries an `id`.
    ///
    /// Returns `None` when the id is not a non-negative integer; such a
    /// response can never match a pending request.
    ///
    /// An `error_class` envelope rejects with the whole message. Otherwise a
    /// non-null `error` field rejects with that field, and anything else
    /// resolves with `result` (`null` when absent).
    pub(crate) fn from_message(message: &Value, error_class: bool) -> Option<Self> {
        let id = RequestId::new(message.get("id")?.as_u64()?);

        if error_class {
            return Some(Self::failure(id, message.clone()));
        }

        match message.get("error") {
            Some(error) if !error.is_null() => Some(Self::failure(id, error.clone())),
            _ => Some(Self::success(
                id,
                message.get("result").cloned().unwrap_or(Value::Null),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
