//! Inbound message events and outbound target origins.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// MessageData
// ============================================================================

/// Payload of a page message event.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageData {
    /// String payload, expected to hold JSON.
    Text(String),
    /// Already-structured payload (structured clone).
    Structured(Value),
}

impl MessageData {
    /// Returns the payload as JSON.
    ///
    /// Returns `None` if a text payload is not valid JSON or if the payload
    /// is a falsy value (`null`, `false`, `0`, empty string).
    #[must_use]
    pub fn parse(&self) -> Option<Cow<'_, Value>> {
        match self {
            Self::Text(text) if text.is_empty() => None,
            Self::Text(text) => serde_json::from_str(text).ok().map(Cow::Owned),
            Self::Structured(value) if is_falsy(value) => None,
            Self::Structured(value) => Some(Cow::Borrowed(value)),
        }
    }
}

impl From<String> for MessageData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for MessageData {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// JavaScript truthiness of a JSON value, as the page sees it.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

// ============================================================================
// MessageEvent
// ============================================================================

/// A message event observed on the page channel.
///
/// The router sees every message on the page, not just wallet traffic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageEvent {
    /// Event payload, if any.
    pub data: Option<MessageData>,
}

impl MessageEvent {
    /// Creates an event carrying a payload.
    #[inline]
    #[must_use]
    pub fn new(data: impl Into<MessageData>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }

    /// Creates an event without a payload.
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates an event carrying the JSON text of `value`.
    ///
    /// Matches how the wallet content script encodes its replies.
    #[must_use]
    pub fn json(value: &Value) -> Self {
        Self::new(MessageData::Text(value.to_string()))
    }
}

// ============================================================================
// TargetOrigin
// ============================================================================

/// Scope an outbound message is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TargetOrigin {
    /// Any origin (`"*"`).
    #[default]
    Any,
    /// The page's own origin (`"/"`).
    SameOrigin,
    /// A specific serialized origin, e.g. `https://wallet.example`.
    Origin(String),
}

impl TargetOrigin {
    /// Restricts delivery to the origin of `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `url` cannot be parsed or has an opaque
    /// origin (`data:`, `file:` and similar).
    pub fn origin(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::config(format!("invalid target origin {url:?}: {e}")))?;
        let origin = parsed.origin();
        if !origin.is_tuple() {
            return Err(Error::config(format!("target origin {url:?} is opaque")));
        }
        Ok(Self::Origin(origin.ascii_serialization()))
    }

    /// Returns the string form passed to the host's `postMessage`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::SameOrigin => "/",
            Self::Origin(origin) => origin,
        }
    }
}

impl FromStr for TargetOrigin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "*" => Ok(Self::Any),
            "/" => Ok(Self::SameOrigin),
            other => Self::origin(other),
        }
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
