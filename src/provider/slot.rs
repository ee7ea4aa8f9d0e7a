//! Single-instance provider slot.
//!
//! A page holds at most one provider. The bridge script can be injected
//! more than once, so installing over an occupied slot must not orphan
//! anything: the new provider adopts the occupant's listeners, id counter
//! and pending requests.
//!
//! # Lifecycle
//!
//! | Operation | Slot empty | Slot occupied |
//! |-----------|------------|---------------|
//! | [`ProviderSlot::install`] | fresh state, ready event fired | state adopted, no ready event |
//! | [`ProviderSlot::get_or_install`] | same as install | occupant returned untouched |
//! | [`ProviderSlot::teardown`] | no-op | pending requests failed, listeners dropped |
//!
//! Every install (re)announces the connection to the wallet.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, LazyLock};

use futures_util::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::transport::{InboundReceiver, MessageEvent, Transport};

use super::config::BridgeConfig;
use super::core::Provider;
use super::router::{Dispatch, receiver_stream};

// ============================================================================
// Constants
// ============================================================================

/// Protocol compatibility marker advertised by an installed bridge.
pub const PROTOCOL_VERSION: u32 = 1;

/// Process-wide slot.
static GLOBAL_SLOT: LazyLock<ProviderSlot> = LazyLock::new(ProviderSlot::new);

// ============================================================================
// ProviderSlot
// ============================================================================

#[derive(Default)]
struct SlotInner {
    current: RwLock<Option<Arc<Provider>>>,
    /// Serializes installs; never held by readers.
    install: Mutex<()>,
    /// 0 until the first install.
    protocol_version: AtomicU32,
}

/// Well-known slot holding a page's provider.
///
/// Cheap to clone; clones refer to the same slot.
#[derive(Clone, Default)]
pub struct ProviderSlot {
    inner: Arc<SlotInner>,
}

impl fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSlot")
            .field("installed", &self.is_installed())
            .field("protocol_version", &self.protocol_version())
            .finish()
    }
}

impl ProviderSlot {
    /// Creates an empty slot, independent of the global one.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide slot.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_SLOT.clone()
    }

    /// Installs a provider, adopting the occupant's state if there is one.
    ///
    /// Sets the protocol version marker, constructs the provider (which
    /// posts the connect announcement), publishes it, and dispatches the
    /// configured ready event only if the slot was empty.
    ///
    /// The slot is not locked while the provider is constructed, so a host
    /// answering the connect announcement synchronously may route the reply
    /// back through [`ProviderSlot::handle_message`].
    pub fn install(
        &self,
        config: BridgeConfig,
        transport: impl Transport + 'static,
    ) -> Arc<Provider> {
        let _install = self.inner.install.lock();

        let adopted = self
            .inner
            .current
            .read()
            .as_ref()
            .map(|previous| Arc::clone(previous.state()));
        let first_install = adopted.is_none();

        self.inner
            .protocol_version
            .store(PROTOCOL_VERSION, Ordering::Release);

        let provider = Arc::new(Provider::with_state(
            config,
            Arc::new(transport),
            adopted.unwrap_or_default(),
        ));
        *self.inner.current.write() = Some(Arc::clone(&provider));

        debug!(
            first_install,
            pending = provider.pending_count(),
            next_id = %provider.next_request_id(),
            "Provider installed"
        );

        if first_install {
            provider.announce_ready();
        }
        provider
    }

    /// Returns the occupant, installing a provider if the slot is empty.
    ///
    /// `transport` is dropped unused when the slot is occupied.
    pub fn get_or_install(
        &self,
        config: BridgeConfig,
        transport: impl Transport + 'static,
    ) -> Arc<Provider> {
        match self.get() {
            Some(provider) => provider,
            None => self.install(config, transport),
        }
    }

    /// Returns the installed provider, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<Provider>> {
        self.inner.current.read().clone()
    }

    /// Returns `true` if a provider is installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.inner.current.read().is_some()
    }

    /// Returns the advertised protocol version, or `None` before the first
    /// install and after teardown.
    #[must_use]
    pub fn protocol_version(&self) -> Option<u32> {
        match self.inner.protocol_version.load(Ordering::Acquire) {
            0 => None,
            version => Some(version),
        }
    }

    /// Empties the slot.
    ///
    /// Every pending request fails with [`crate::Error::ChannelClosed`] and
    /// every listener is dropped. The next install starts from fresh state
    /// and fires the ready event again.
    pub fn teardown(&self) -> Option<Arc<Provider>> {
        let _install = self.inner.install.lock();
        let provider = self.inner.current.write().take()?;
        self.inner.protocol_version.store(0, Ordering::Release);

        let failed = provider.pending_count();
        provider.state().reset();
        debug!(failed, "Provider slot torn down");

        Some(provider)
    }

    /// Routes an inbound message to the current occupant.
    ///
    /// Returns [`Dispatch::Ignored`] when the slot is empty.
    pub fn handle_message(&self, event: &MessageEvent) -> Dispatch {
        match self.get() {
            Some(provider) => provider.handle_message(event),
            None => Dispatch::Ignored,
        }
    }

    /// Spawns a task routing `inbound` to whichever provider occupies the
    /// slot when each message arrives.
    ///
    /// Unlike [`Provider::spawn_listener`], re-installs never leave a second
    /// listener behind, so notifications are emitted once.
    pub fn spawn_listener(&self, inbound: InboundReceiver) -> JoinHandle<()> {
        let slot = self.clone();
        tokio::spawn(async move {
            let mut events = std::pin::pin!(receiver_stream(inbound));
            while let Some(event) = events.next().await {
                slot.handle_message(&event);
            }
            debug!("Slot inbound stream ended");
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
