//! In-process page channel.
//!
//! Stands in for the browser's `window.postMessage` when the bridge runs
//! outside a page, and is what the crate's own tests drive. The page side
//! holds a [`ChannelTransport`]; the wallet side holds a [`RemoteEnd`] that
//! reads posted envelopes and dispatched events and pushes replies back.
//!
//! # Example
//!
//! ```ignore
//! let (transport, mut remote, inbound) = ChannelTransport::channel();
//! let provider = ProviderSlot::new().install(BridgeConfig::default(), transport);
//! provider.spawn_listener(inbound);
//!
//! let posted = remote.next_posted().await.expect("connect");
//! remote.reply(&json!({"type": "TONHoldAPI", "message": {...}}))?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{Error, Result};

use super::{MessageEvent, TargetOrigin, Transport};

// ============================================================================
// Types
// ============================================================================

/// Receiver of inbound page events, consumed by the provider's listener.
pub type InboundReceiver = mpsc::UnboundedReceiver<MessageEvent>;

/// A message posted by the page, as observed by the wallet side.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    /// Envelope as posted.
    pub message: Value,
    /// Scope the envelope was addressed to.
    pub target_origin: TargetOrigin,
}

impl PostedMessage {
    /// Returns the envelope's `type` discriminator.
    #[inline]
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        self.message.get("type").and_then(Value::as_str)
    }
}

// ============================================================================
// ChannelTransport
// ============================================================================

/// Page side of the in-process channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    /// Posted envelopes, read by the remote end.
    posted_tx: mpsc::UnboundedSender<PostedMessage>,
    /// Dispatched local events, read by the remote end.
    events_tx: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    /// Creates a connected page/wallet pair plus the page's inbound stream.
    #[must_use]
    pub fn channel() -> (Self, RemoteEnd, InboundReceiver) {
        let (posted_tx, posted_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let transport = Self {
            posted_tx,
            events_tx,
        };
        let remote = RemoteEnd {
            posted_rx,
            events_rx,
            inbound_tx,
        };

        (transport, remote, inbound_rx)
    }
}

impl Transport for ChannelTransport {
    fn post_message(&self, message: Value, target_origin: &TargetOrigin) -> Result<()> {
        trace!(%target_origin, "Posting message");
        self.posted_tx
            .send(PostedMessage {
                message,
                target_origin: target_origin.clone(),
            })
            .map_err(|_| Error::transport("page channel closed"))
    }

    fn dispatch_event(&self, name: &str) -> Result<()> {
        trace!(event = name, "Dispatching page event");
        self.events_tx
            .send(name.to_string())
            .map_err(|_| Error::transport("page channel closed"))
    }
}

// ============================================================================
// RemoteEnd
// ============================================================================

/// Wallet side of the in-process channel.
#[derive(Debug)]
pub struct RemoteEnd {
    posted_rx: mpsc::UnboundedReceiver<PostedMessage>,
    events_rx: mpsc::UnboundedReceiver<String>,
    inbound_tx: mpsc::UnboundedSender<MessageEvent>,
}

impl RemoteEnd {
    /// Waits for the next envelope posted by the page.
    ///
    /// Returns `None` once every page-side handle is dropped.
    pub async fn next_posted(&mut self) -> Option<PostedMessage> {
        self.posted_rx.recv().await
    }

    /// Returns an already-posted envelope without waiting.
    pub fn try_next_posted(&mut self) -> Option<PostedMessage> {
        self.posted_rx.try_recv().ok()
    }

    /// Returns an already-dispatched page event without waiting.
    pub fn try_next_event(&mut self) -> Option<String> {
        self.events_rx.try_recv().ok()
    }

    /// Delivers a string-encoded JSON reply to the page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the page's listener is gone.
    pub fn reply(&self, value: &Value) -> Result<()> {
        self.deliver(MessageEvent::json(value))
    }

    /// Delivers an arbitrary event to the page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the page's listener is gone.
    pub fn deliver(&self, event: MessageEvent) -> Result<()> {
        self.inbound_tx
            .send(event)
            .map_err(|_| Error::transport("page listener closed"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[tokio::test]
    async fn test_post_reaches_remote() {
        let (transport, mut remote, _inbound) = ChannelTransport::channel();

        transport
            .post_message(json!({"type": "ping"}), &TargetOrigin::Any)
            .expect("post");

        let posted = remote.next_posted().await.expect("posted");
        assert_eq!(posted.message_type(), Some("ping"));
        assert_eq!(posted.target_origin, TargetOrigin::Any);
    }

    #[test]
    fn test_dispatch_event() {
        let (transport, mut remote, _inbound) = ChannelTransport::channel();
        transport.dispatch_event("tonready").expect("dispatch");
        assert_eq!(remote.try_next_event().as_deref(), Some("tonready"));
        assert!(remote.try_next_event().is_none());
    }

    #[test]
    fn test_post_fails_when_remote_dropped() {
        let (transport, remote, _inbound) = ChannelTransport::channel();
        drop(remote);

        let err = transport
            .post_message(json!({}), &TargetOrigin::Any)
            .unwrap_err();
        assert!(err.is_transport_error());
    }

    #[test]
    fn test_reply_reaches_inbound() {
        let (_transport, remote, mut inbound) = ChannelTransport::channel();
        remote.reply(&json!({"type": "TONHoldAPI"})).expect("reply");

        let event = inbound.try_recv().expect("event");
        assert_eq!(event, MessageEvent::json(&json!({"type": "TONHoldAPI"})));
    }
}
