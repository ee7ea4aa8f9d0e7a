//! Page transport layer.
//!
//! The bridge does not own the page's message channel. It talks to it
//! through the [`Transport`] trait: outbound envelopes are posted with a
//! target origin, inbound traffic arrives as [`MessageEvent`] values fed to
//! the router.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Page (Rust)    │                              │  Wallet         │
//! │                 │      window message          │  (Extension)    │
//! │  Provider       │◄────────────────────────────►│                 │
//! │  → Transport    │      channel, any origin     │  Content        │
//! │                 │                              │  Script         │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | In-process transport backed by tokio channels |
//! | `message` | Inbound events and target origins |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// In-process page channel.
pub mod channel;

/// Inbound events and target origins.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{ChannelTransport, InboundReceiver, PostedMessage, RemoteEnd};
pub use message::{MessageData, MessageEvent, TargetOrigin};

// ============================================================================
// Transport
// ============================================================================

/// The host page's messaging surface.
///
/// Implementations must not block; both methods are fire-and-forget.
pub trait Transport: Send + Sync {
    /// Posts a message on the cross-context channel.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if the host refuses the message.
    fn post_message(&self, message: Value, target_origin: &TargetOrigin) -> Result<()>;

    /// Dispatches a local page event (no payload) to page scripts.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if the host refuses the event.
    fn dispatch_event(&self, name: &str) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    #[inline]
    fn post_message(&self, message: Value, target_origin: &TargetOrigin) -> Result<()> {
        (**self).post_message(message, target_origin)
    }

    #[inline]
    fn dispatch_event(&self, name: &str) -> Result<()> {
        (**self).dispatch_event(name)
    }
}
