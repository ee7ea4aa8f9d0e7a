//! Type-safe identifiers.
//!
//! Newtype wrappers keep correlation ids from being mixed up with other
//! integers flowing through the bridge.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// JSON-RPC correlation id.
///
/// Serialized as a bare integer (`"id": 7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================================
// IdCounter
// ============================================================================

/// Monotonic correlation id source.
///
/// Starts at 0. Shared between provider instances on re-injection so ids
/// are never reused while a request is outstanding.
#[derive(Debug, Default)]
pub struct IdCounter(AtomicU64);

impl IdCounter {
    /// Creates a counter starting at 0.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value and advances the counter.
    #[inline]
    pub fn next(&self) -> RequestId {
        RequestId(self.0.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the id the next call to [`IdCounter::next`] will hand out.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> RequestId {
        RequestId(self.0.load(Ordering::Relaxed))
    }
}

// ============================================================================
// Tests
// ============================================================================
