//! Wallet provider module.
//!
//! This module provides the page-facing bridge object and its parts.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Provider`] | Facade: requests, subscriptions, connect handshake |
//! | [`ProviderSlot`] | One provider per page, adopt-on-reinjection |
//! | [`EventEmitter`] | Listener registry |
//! | [`PendingTable`] | Correlation id → continuation map |
//! | [`PendingRequest`] | Future returned by [`Provider::send`] |
//! | [`BridgeConfig`] | Channel names and target origin |
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use ton_provider_bridge::{BridgeConfig, ChannelTransport, ProviderSlot, Result};
//!
//! # async fn example() -> Result<()> {
//! let (transport, _remote, inbound) = ChannelTransport::channel();
//! let slot = ProviderSlot::global();
//! let provider = slot.install(BridgeConfig::default(), transport);
//! slot.spawn_listener(inbound);
//!
//! provider.on_accounts_changed(|accounts| println!("accounts: {accounts}"));
//! let balance = provider.request("ton_getBalance", vec![json!("addr1")]).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for [`BridgeConfig`].
pub mod builder;

/// Bridge configuration.
pub mod config;

/// Provider facade and shared state.
pub mod core;

/// Listener registry.
pub mod events;

/// Pending-request table.
pub mod pending;

/// Inbound message router.
pub mod router;

/// Single-instance slot.
pub mod slot;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BridgeConfigBuilder;
pub use config::BridgeConfig;
pub use self::core::{Provider, ProviderState};
pub use events::{EventEmitter, Listener};
pub use pending::{PendingRequest, PendingTable};
pub use router::Dispatch;
pub use slot::{PROTOCOL_VERSION, ProviderSlot};
