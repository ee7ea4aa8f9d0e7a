//! Bridge protocol message types.
//!
//! This module defines the envelopes exchanged between the page (Rust)
//! and the wallet context over the page's message channel.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Outbound::Connect` | Page → Wallet | Connect announcement |
//! | `Outbound::Write` | Page → Wallet | JSON-RPC request |
//! | `Inbound::Response` | Wallet → Page | Result or error for a request |
//! | `Inbound::Notification` | Wallet → Page | Subscription / account push |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | Transport envelopes and inbound classification |
//! | `event` | Notification types and event names |
//! | `request` | Request and Response payloads |

// ============================================================================
// Submodules
// ============================================================================

/// Transport envelopes.
pub mod envelope;

/// Notification message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{ERROR_TAG, Inbound, Outbound, OutboundMessage};
pub use event::{ACCOUNTS_CHANGED_EVENT, NOTIFICATION_EVENT, Notification, NotificationKind};
pub use request::{JSONRPC_VERSION, RequestEnvelope, ResponseEnvelope};
