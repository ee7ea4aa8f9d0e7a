//! Message router.
//!
//! The single inbound handler for the page channel. It sees every message
//! posted on the page, not only wallet traffic, so it never fails: anything
//! that is not a well-formed bridge envelope is dropped.
//!
//! # Dispatch
//!
//! 1. No payload, unparseable payload, foreign `type`, no `jsonrpc`
//!    marker → ignored
//! 2. `message.id` present → settle the pending request (unknown ids are
//!    dropped)
//! 3. otherwise → emit `"notification"` or `"accountsChanged"`

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use futures_util::stream::{self, Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::identifiers::RequestId;
use crate::protocol::Inbound;
use crate::transport::{InboundReceiver, MessageEvent};

use super::config::BridgeConfig;
use super::core::{Provider, ProviderState};

// ============================================================================
// Dispatch
// ============================================================================

/// Outcome of routing one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not bridge protocol traffic.
    Ignored,
    /// A pending request was settled.
    Settled {
        /// Correlation id of the settled request.
        id: RequestId,
        /// `true` if resolved, `false` if rejected.
        success: bool,
    },
    /// A response arrived for an id that is not pending.
    Unmatched(RequestId),
    /// A notification was emitted.
    Emitted {
        /// Event name it was emitted under.
        event: &'static str,
        /// `true` if at least one listener ran.
        delivered: bool,
    },
}

/// Routes one inbound message against `state`.
pub(crate) fn route(
    state: &ProviderState,
    config: &BridgeConfig,
    event: &MessageEvent,
) -> Dispatch {
    let Some(data) = event.data.as_ref() else {
        return Dispatch::Ignored;
    };

    let Some(payload) = data.parse() else {
        trace!("Ignoring unparseable page message");
        return Dispatch::Ignored;
    };

    match Inbound::classify(&payload, config) {
        None => Dispatch::Ignored,

        Some(Inbound::Response(response)) => {
            let id = response.id;
            let success = response.is_success();
            if state.pending().settle(response) {
                debug!(%id, success, "Request settled");
                Dispatch::Settled { id, success }
            } else {
                trace!(%id, "Response for unknown request");
                Dispatch::Unmatched(id)
            }
        }

        Some(Inbound::Notification(notification)) => {
            let event = notification.event_name();
            let delivered = state.listeners().emit(event, &notification.params);
            trace!(event, method = %notification.method, delivered, "Notification routed");
            Dispatch::Emitted { event, delivered }
        }
    }
}

// ============================================================================
// Provider - Inbound
// ============================================================================

impl Provider {
    /// Routes one inbound page message.
    ///
    /// Never fails; see [`Dispatch`] for what happened.
    pub fn handle_message(&self, event: &MessageEvent) -> Dispatch {
        route(self.state(), self.config(), event)
    }

    /// Routes every message from `events` until the stream ends.
    pub async fn listen<S>(&self, events: S)
    where
        S: Stream<Item = MessageEvent>,
    {
        let mut events = std::pin::pin!(events);
        while let Some(event) = events.next().await {
            self.handle_message(&event);
        }
        debug!("Inbound stream ended");
    }

    /// Spawns a task routing every message from `inbound`.
    ///
    /// The page equivalent of `addEventListener("message", ...)`.
    pub fn spawn_listener(self: &Arc<Self>, inbound: InboundReceiver) -> JoinHandle<()> {
        let provider = Arc::clone(self);
        tokio::spawn(async move { provider.listen(receiver_stream(inbound)).await })
    }
}

/// Adapts an inbound receiver into a stream.
pub(crate) fn receiver_stream(mut inbound: InboundReceiver) -> impl Stream<Item = MessageEvent> {
    stream::poll_fn(move |cx| inbound.poll_recv(cx))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use proptest::prelude::*;
    use serde_json::{Value, json};
    use tokio::sync::oneshot;

    use crate::error::Error;
    use crate::provider::{Listener, PendingRequest};
    use crate::transport::MessageData;

    fn pending(state: &Arc<ProviderState>) -> PendingRequest {
        let id = state.ids().next();
        let (tx, rx) = oneshot::channel();
        state.pending().register(id, tx);
        PendingRequest::new(id, rx, Arc::downgrade(state))
    }

    fn inbound(message: Value) -> MessageEvent {
        MessageEvent::json(&json!({"type": "TONHoldAPI", "message": message}))
    }

    #[tokio::test]
    async fn test_balance_scenario() {
        crate::test_support::init_tracing();
        let state = Arc::new(ProviderState::new());
        let config = BridgeConfig::default();
        let request = pending(&state);
        assert_eq!(request.id(), RequestId::new(0));

        let dispatch = route(
            &state,
            &config,
            &inbound(json!({"jsonrpc": "2.0", "id": 0, "result": "1000"})),
        );

        assert_eq!(dispatch, Dispatch::Settled { id: RequestId::new(0), success: true });
        assert!(state.pending().is_empty());
        assert_eq!(request.await.expect("resolved"), json!("1000"));
    }

    #[tokio::test]
    async fn test_duplicate_response_is_noop() {
        let state = Arc::new(ProviderState::new());
        let config = BridgeConfig::default();
        let request = pending(&state);
        let reply = inbound(json!({"jsonrpc": "2.0", "id": 0, "result": 1}));

        route(&state, &config, &reply);
        assert_eq!(route(&state, &config, &reply), Dispatch::Unmatched(RequestId::new(0)));
        assert_eq!(request.await.expect("resolved"), json!(1));
    }

    #[test]
    fn test_unknown_id_dropped() {
        let state = ProviderState::new();
        let dispatch = route(
            &state,
            &BridgeConfig::default(),
            &inbound(json!({"jsonrpc": "2.0", "id": 77, "result": 1})),
        );
        assert_eq!(dispatch, Dispatch::Unmatched(RequestId::new(77)));
    }

    #[tokio::test]
    async fn test_error_field_rejects() {
        let state = Arc::new(ProviderState::new());
        let request = pending(&state);

        let dispatch = route(
            &state,
            &BridgeConfig::default(),
            &inbound(json!({"jsonrpc": "2.0", "id": 0, "error": {"code": 4001}})),
        );

        assert_eq!(dispatch, Dispatch::Settled { id: RequestId::new(0), success: false });
        let err = request.await.unwrap_err();
        assert_eq!(err.remote_payload(), Some(&json!({"code": 4001})));
    }

    #[tokio::test]
    async fn test_error_envelope_rejects_with_message() {
        let state = Arc::new(ProviderState::new());
        let request = pending(&state);
        let message = json!({"jsonrpc": "2.0", "id": 0, "result": "ignored"});

        route(
            &state,
            &BridgeConfig::default(),
            &MessageEvent::json(&json!({"type": "error", "message": message})),
        );

        match request.await {
            Err(Error::Rpc { payload }) => assert_eq!(payload, message),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_subscription_scenario() {
        let state = ProviderState::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = Arc::clone(&seen);
        state.listeners().on(
            "notification",
            Listener::new(move |params: &Value| inner.lock().push(params.clone())),
        );

        let dispatch = route(
            &state,
            &BridgeConfig::default(),
            &inbound(json!({
                "jsonrpc": "2.0",
                "method": "balance_subscription",
                "params": {"addr": "addr1", "balance": "900"}
            })),
        );

        assert_eq!(dispatch, Dispatch::Emitted { event: "notification", delivered: true });
        assert_eq!(*seen.lock(), vec![json!({"addr": "addr1", "balance": "900"})]);
    }

    #[test]
    fn test_accounts_changed_scenario() {
        let state = ProviderState::new();
        let seen = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&seen);
        state.listeners().on(
            "accountsChanged",
            Listener::new(move |params: &Value| *inner.lock() = Some(params.clone())),
        );

        route(
            &state,
            &BridgeConfig::default(),
            &inbound(json!({
                "jsonrpc": "2.0",
                "method": "ton_accounts",
                "params": ["addr1", "addr2"]
            })),
        );

        assert_eq!(*seen.lock(), Some(json!(["addr1", "addr2"])));
    }

    #[test]
    fn test_notification_without_listeners() {
        let state = ProviderState::new();
        let dispatch = route(
            &state,
            &BridgeConfig::default(),
            &inbound(json!({"jsonrpc": "2.0", "method": "ton_accounts", "params": []})),
        );
        assert_eq!(dispatch, Dispatch::Emitted { event: "accountsChanged", delivered: false });
    }

    #[test]
    fn test_unknown_method_ignored() {
        let state = ProviderState::new();
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let listener = Listener::new(move |_: &Value| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        state.listeners().on("notification", listener.clone());
        state.listeners().on("accountsChanged", listener);

        let dispatch = route(
            &state,
            &BridgeConfig::default(),
            &inbound(json!({"jsonrpc": "2.0", "method": "ton_chainChanged", "params": 1})),
        );

        assert_eq!(dispatch, Dispatch::Ignored);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_noise_ignored() {
        let state = ProviderState::new();
        let config = BridgeConfig::default();
        let noise = [
            MessageEvent::empty(),
            MessageEvent::new("not json"),
            MessageEvent::new(""),
            MessageEvent::new("null"),
            MessageEvent::new(r#"{"type":"TONHoldAPI"}"#),
            MessageEvent::new(MessageData::Structured(
                json!({"type": "TONHoldAPI_ton_provider_connect"}),
            )),
            MessageEvent::new(MessageData::Structured(Value::Null)),
        ];

        for event in &noise {
            assert_eq!(route(&state, &config, event), Dispatch::Ignored, "event: {event:?}");
        }
    }

    #[tokio::test]
    async fn test_structured_payload_routed() {
        let state = Arc::new(ProviderState::new());
        let request = pending(&state);

        route(
            &state,
            &BridgeConfig::default(),
            &MessageEvent::new(json!({
                "type": "TONHoldAPI",
                "message": {"jsonrpc": "2.0", "id": 0, "result": [1, 2]}
            })),
        );

        assert_eq!(request.await.expect("resolved"), json!([1, 2]));
    }

    #[tokio::test]
    async fn test_out_of_order_responses() {
        let state = Arc::new(ProviderState::new());
        let config = BridgeConfig::default();
        let first = pending(&state);
        let second = pending(&state);

        route(&state, &config, &inbound(json!({"jsonrpc": "2.0", "id": 1, "result": "b"})));
        route(&state, &config, &inbound(json!({"jsonrpc": "2.0", "id": 0, "result": "a"})));

        assert_eq!(second.await.expect("second"), json!("b"));
        assert_eq!(first.await.expect("first"), json!("a"));
    }

    proptest! {
        #[test]
        fn prop_arbitrary_text_never_panics(text in ".*") {
            let state = ProviderState::new();
            let config = BridgeConfig::default();
            let dispatch = route(&state, &config, &MessageEvent::new(text));
            let handled = matches!(
                dispatch,
                Dispatch::Ignored | Dispatch::Unmatched(_) | Dispatch::Emitted { .. }
            );
            prop_assert!(handled, "unexpected dispatch: {:?}", dispatch);
        }

        #[test]
        fn prop_foreign_envelopes_ignored(tag in "[A-Za-z_]{1,16}", id in 0u64..1000) {
            prop_assume!(tag != "TONHoldAPI" && tag != "error");
            let state = Arc::new(ProviderState::new());
            let _request = pending(&state);
            let event = MessageEvent::json(&json!({
                "type": tag,
                "message": {"jsonrpc": "2.0", "id": id, "result": 1}
            }));

            prop_assert_eq!(route(&state, &BridgeConfig::default(), &event), Dispatch::Ignored);
            prop_assert_eq!(state.pending().len(), 1);
        }
    }
}
