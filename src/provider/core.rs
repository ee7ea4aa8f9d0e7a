//! Provider facade.
//!
//! [`Provider`] combines the listener registry, the correlation counter
//! and the pending-request table behind the page-facing API: request
//! submission, subscriptions and the connect handshake.
//!
//! The three pieces of mutable state live in a shared [`ProviderState`] so
//! a provider installed over an existing one (script re-injection) keeps
//! every in-flight request and subscriber. See [`super::slot`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identifiers::{IdCounter, RequestId};
use crate::protocol::{ACCOUNTS_CHANGED_EVENT, NOTIFICATION_EVENT, Outbound, RequestEnvelope};
use crate::transport::Transport;

use super::config::BridgeConfig;
use super::events::{EventEmitter, Listener};
use super::pending::{PendingRequest, PendingTable};

// ============================================================================
// ProviderState
// ============================================================================

/// Mutable state shared by every provider instance on a page.
#[derive(Debug, Default)]
pub struct ProviderState {
    listeners: EventEmitter<Value>,
    next_id: IdCounter,
    pending: PendingTable,
}

impl ProviderState {
    /// Creates fresh state: no listeners, no pending requests, ids from 0.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener registry.
    #[inline]
    #[must_use]
    pub fn listeners(&self) -> &EventEmitter<Value> {
        &self.listeners
    }

    /// Pending-request table.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &PendingTable {
        &self.pending
    }

    /// Correlation id counter.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &IdCounter {
        &self.next_id
    }

    /// Fails every pending request and drops every listener.
    pub(crate) fn reset(&self) {
        self.pending.fail_all();
        self.listeners.clear();
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Page-side wallet provider.
///
/// # Example
///
/// ```ignore
/// let (transport, remote, inbound) = ChannelTransport::channel();
/// let provider = ProviderSlot::global().install(BridgeConfig::default(), transport);
/// provider.spawn_listener(inbound);
///
/// let balance: String = provider
///     .request_as("ton_getBalance", vec!["addr1".into()])
///     .await?;
/// ```
pub struct Provider {
    config: BridgeConfig,
    state: Arc<ProviderState>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Provider - Constructor
// ============================================================================

impl Provider {
    /// Creates a standalone provider with fresh state.
    ///
    /// Posts the connect announcement immediately. Prefer
    /// [`super::ProviderSlot::install`], which enforces one provider per page.
    pub fn new(config: BridgeConfig, transport: impl Transport + 'static) -> Self {
        Self::with_state(config, Arc::new(transport), Arc::default())
    }

    /// Creates a provider over existing shared state.
    pub(crate) fn with_state(
        config: BridgeConfig,
        transport: Arc<dyn Transport>,
        state: Arc<ProviderState>,
    ) -> Self {
        let provider = Self {
            config,
            state,
            transport,
        };

        if let Err(e) = provider.connect() {
            warn!(error = %e, "Connect announcement failed");
        }

        provider
    }

    /// Posts the connect announcement to the wallet.
    ///
    /// Fire-and-forget: any acknowledgement arrives as ordinary inbound
    /// traffic. Called on construction; hosts may call it again to
    /// re-announce.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the host refuses the message.
    pub fn connect(&self) -> Result<()> {
        let message = serde_json::to_value(Outbound::Connect.into_message(&self.config))?;
        self.transport
            .post_message(message, self.config.target_origin())?;

        debug!(bridge = %self.config.bridge_name(), "Connect announced");
        Ok(())
    }

    /// Dispatches the configured ready event on the page.
    pub(crate) fn announce_ready(&self) {
        let event = self.config.ready_event();
        match self.transport.dispatch_event(event) {
            Ok(()) => debug!(event, "Ready event dispatched"),
            Err(e) => warn!(event, error = %e, "Ready event dispatch failed"),
        }
    }
}

// ============================================================================
// Provider - Requests
// ============================================================================

impl Provider {
    /// Sends a JSON-RPC request to the wallet.
    ///
    /// Allocates the next correlation id, registers the continuation and
    /// posts `{ type: "<bridge>_<namespace>_provider_write", message }`.
    /// The returned future resolves with the wallet's result.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `method` is empty (no id is consumed)
    /// - [`Error::Transport`] if the host refuses the message
    pub fn send(&self, method: &str, params: Vec<Value>) -> Result<PendingRequest> {
        self.send_as(method, params)
    }

    /// Like [`Provider::send`], decoding the result as `T`.
    ///
    /// # Errors
    ///
    /// See [`Provider::send`].
    pub fn send_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<PendingRequest<T>> {
        if method.is_empty() {
            return Err(Error::invalid_argument("method name must not be empty"));
        }

        let id = self.state.next_id.next();
        let request = RequestEnvelope::new(id, method, params);
        let message = serde_json::to_value(Outbound::Write(request).into_message(&self.config))?;

        // Register before posting: a synchronous host may answer inside post.
        let (tx, rx) = oneshot::channel();
        self.state.pending.register(id, tx);

        if let Err(e) = self
            .transport
            .post_message(message, self.config.target_origin())
        {
            self.state.pending.remove(id);
            warn!(%id, method, error = %e, "Failed to post request");
            return Err(e);
        }

        debug!(%id, method, "Request sent");
        Ok(PendingRequest::new(id, rx, Arc::downgrade(&self.state)))
    }

    /// Sends a request and awaits the result.
    ///
    /// # Errors
    ///
    /// - errors from [`Provider::send`]
    /// - [`Error::Rpc`] if the wallet reports a failure
    /// - [`Error::ChannelClosed`] if the provider is torn down first
    pub async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.send(method, params)?.await
    }

    /// Sends a request and awaits the result decoded as `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Provider::request`], plus [`Error::Json`] if the result
    /// does not decode as `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T> {
        self.send_as(method, params)?.await
    }
}

// ============================================================================
// Provider - Events
// ============================================================================

impl Provider {
    /// Registers `listener` under `event`. Returns `self` for chaining.
    pub fn on(&self, event: &str, listener: Listener) -> &Self {
        self.state.listeners.on(event, listener);
        self
    }

    /// Registers `listener` for the next `event` only.
    pub fn once(&self, event: &str, listener: Listener) -> &Self {
        self.state.listeners.once(event, listener);
        self
    }

    /// Removes `listener` from `event`. No-op if absent.
    pub fn remove_listener(&self, event: &str, listener: &Listener) -> bool {
        self.state.listeners.remove_listener(event, listener)
    }

    /// Emits `event` to its listeners. Returns whether any listener existed.
    pub fn emit(&self, event: &str, args: &Value) -> bool {
        self.state.listeners.emit(event, args)
    }

    /// Subscribes to wallet subscription notifications.
    ///
    /// Returns the registered listener for later removal.
    pub fn on_notification(&self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Listener {
        let listener = Listener::new(callback);
        self.on(NOTIFICATION_EVENT, listener.clone());
        listener
    }

    /// Subscribes to account-list changes.
    ///
    /// Returns the registered listener for later removal.
    pub fn on_accounts_changed(
        &self,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Listener {
        let listener = Listener::new(callback);
        self.on(ACCOUNTS_CHANGED_EVENT, listener.clone());
        listener
    }
}

// ============================================================================
// Provider - Accessors
// ============================================================================

impl Provider {
    /// Always `true`; lets dapps detect the wallet.
    #[inline]
    #[must_use]
    pub fn is_wallet(&self) -> bool {
        true
    }

    /// Bridge configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Shared state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &Arc<ProviderState> {
        &self.state
    }

    /// Returns the number of requests awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.pending.len()
    }

    /// Returns the id the next request will use.
    #[inline]
    #[must_use]
    pub fn next_request_id(&self) -> RequestId {
        self.state.next_id.peek()
    }

    /// Returns `true` if both providers share listeners, ids and pending
    /// requests.
    #[inline]
    #[must_use]
    pub fn shares_state_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

// ============================================================================
// Tests
// ============================================================================
