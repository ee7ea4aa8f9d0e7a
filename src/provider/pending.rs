//! Pending-request table.
//!
//! Maps correlation ids to the one-shot continuations of in-flight
//! requests. Written by [`crate::Provider::send`] and settled by the
//! router; every entry is removed exactly once.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::ready;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::ResponseEnvelope;

use super::core::ProviderState;

// ============================================================================
// Types
// ============================================================================

/// Settle handle for one request.
pub type Continuation = oneshot::Sender<Result<Value>>;

// ============================================================================
// PendingTable
// ============================================================================

/// Correlation id → continuation map.
#[derive(Debug, Default)]
pub struct PendingTable {
    entries: Mutex<FxHashMap<RequestId, Continuation>>,
}

impl PendingTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the continuation for `id`.
    ///
    /// Ids come from a monotonic counter, so a collision means the caller
    /// reused an id; the older continuation is dropped and fails with
    /// [`Error::ChannelClosed`].
    pub fn register(&self, id: RequestId, continuation: Continuation) {
        if self.entries.lock().insert(id, continuation).is_some() {
            warn!(%id, "Replaced pending request with duplicate id");
        }
    }

    /// Resolves and removes the continuation for `id`.
    ///
    /// Returns `false` (and does nothing) if `id` is not pending.
    pub fn resolve_and_clear(&self, id: RequestId, result: Value) -> bool {
        self.settle_with(id, Ok(result))
    }

    /// Rejects and removes the continuation for `id` with the wallet's
    /// error payload.
    ///
    /// Returns `false` (and does nothing) if `id` is not pending.
    pub fn reject_and_clear(&self, id: RequestId, error: Value) -> bool {
        self.settle_with(id, Err(Error::rpc(error)))
    }

    /// Settles a classified response.
    pub fn settle(&self, response: ResponseEnvelope) -> bool {
        match response.outcome {
            Ok(result) => self.resolve_and_clear(response.id, result),
            Err(error) => self.reject_and_clear(response.id, error),
        }
    }

    fn settle_with(&self, id: RequestId, outcome: Result<Value>) -> bool {
        let Some(continuation) = self.entries.lock().remove(&id) else {
            return false;
        };

        if continuation.send(outcome).is_err() {
            trace!(%id, "Caller dropped pending request before settlement");
        }
        true
    }

    /// Removes the continuation for `id` without settling it.
    ///
    /// The caller's future fails with [`Error::ChannelClosed`].
    pub fn remove(&self, id: RequestId) -> bool {
        self.entries.lock().remove(&id).is_some()
    }

    /// Drops every continuation, failing all pending futures.
    ///
    /// Returns the number of requests failed.
    pub fn fail_all(&self) -> usize {
        let pending: Vec<_> = self.entries.lock().drain().collect();
        let count = pending.len();

        if count > 0 {
            debug!(count, "Failed pending requests");
        }
        count
    }

    /// Returns `true` if `id` is pending.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: RequestId) -> bool {
        self.entries.lock().contains_key(&id)
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if no request is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

// ============================================================================
// PendingRequest
// ============================================================================

/// Future returned by [`crate::Provider::send`].
///
/// Resolves with the wallet's result decoded as `T`, or fails with
/// [`Error::Rpc`] carrying the wallet's error payload. It stays pending
/// until the wallet answers; use [`PendingRequest::with_timeout`] to bound
/// the wait.
#[must_use = "the request is settled only when the future is awaited"]
#[derive(Debug)]
pub struct PendingRequest<T = Value> {
    id: RequestId,
    rx: oneshot::Receiver<Result<Value>>,
    state: Weak<ProviderState>,
    _result: PhantomData<fn() -> T>,
}

impl<T> PendingRequest<T> {
    pub(crate) fn new(
        id: RequestId,
        rx: oneshot::Receiver<Result<Value>>,
        state: Weak<ProviderState>,
    ) -> Self {
        Self {
            id,
            rx,
            state,
            _result: PhantomData,
        }
    }

    /// Returns the request's correlation id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl<T: DeserializeOwned> PendingRequest<T> {
    /// Awaits the response for at most `duration`.
    ///
    /// On expiry the request is removed from the pending table, so a late
    /// response is dropped like any unmatched one.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestTimeout`] if no response arrived in time
    /// - any error the request itself settles with
    pub async fn with_timeout(self, duration: Duration) -> Result<T> {
        let id = self.id;
        let state = self.state.clone();

        match timeout(duration, self).await {
            Ok(outcome) => outcome,
            Err(_) => {
                if let Some(state) = state.upgrade() {
                    state.pending().remove(id);
                }
                debug!(%id, timeout_ms = duration.as_millis() as u64, "Request timed out");
                Err(Error::request_timeout(id, duration.as_millis() as u64))
            }
        }
    }
}

impl<T: DeserializeOwned> Future for PendingRequest<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let outcome = ready!(Pin::new(&mut self.rx).poll(cx));
        Poll::Ready(
            outcome
                .map_err(Error::from)
                .and_then(|settled| settled)
                .and_then(|value| serde_json::from_value(value).map_err(Error::from)),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
