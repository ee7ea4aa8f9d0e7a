//! TON Provider Bridge - page-side wallet provider.
//!
//! This library implements the object a wallet extension injects into a
//! web page so dapps can talk to the wallet: JSON-RPC requests correlated
//! by id, pushed notifications, and a single provider per page that
//! survives re-injection of the bridge script.
//!
//! # Architecture
//!
//! The bridge follows a client-server model over the page's message
//! channel:
//!
//! - **Page (Rust)**: posts requests, routes responses and notifications
//! - **Wallet (Extension)**: answers requests, pushes notifications
//!
//! Key design principles:
//!
//! - One inbound handler sees all page traffic and never fails
//! - Requests settle exactly once; unknown or duplicate replies are dropped
//! - Re-installing the provider adopts listeners, ids and pending requests
//! - No timeouts inside the bridge; callers opt in per request
//!
//! # Quick Start
//!
//! ```no_run
//! use serde_json::json;
//! use ton_provider_bridge::{BridgeConfig, ChannelTransport, ProviderSlot, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (transport, _wallet, inbound) = ChannelTransport::channel();
//!
//!     let slot = ProviderSlot::global();
//!     let provider = slot.install(BridgeConfig::default(), transport);
//!     slot.spawn_listener(inbound);
//!
//!     provider.on_notification(|params| println!("notification: {params}"));
//!
//!     let balance: String = provider
//!         .request_as("ton_getBalance", vec![json!("addr1")])
//!         .await?;
//!     println!("balance: {balance}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`provider`] | [`Provider`], [`ProviderSlot`], listeners, pending table |
//! | [`protocol`] | Envelope and JSON-RPC message types |
//! | [`transport`] | [`Transport`] trait and the in-process channel |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Correlation id types |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Bridge protocol message types.
pub mod protocol;

/// Provider facade, listener registry, pending table and slot.
pub mod provider;

/// Page transport abstraction.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Provider types
pub use provider::{
    BridgeConfig, BridgeConfigBuilder, Dispatch, EventEmitter, Listener, PROTOCOL_VERSION,
    PendingRequest, PendingTable, Provider, ProviderSlot, ProviderState,
};

// Transport types
pub use transport::{
    ChannelTransport, InboundReceiver, MessageData, MessageEvent, PostedMessage, RemoteEnd,
    TargetOrigin, Transport,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::RequestId;

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use tracing_subscriber::EnvFilter;

    /// Installs a test-writer subscriber honouring `RUST_LOG`.
    pub(crate) fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// ============================================================================
// Tests
// ============================================================================
