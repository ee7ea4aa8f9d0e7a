//! Transport-level envelopes.
//!
//! Every message on the page channel is wrapped in an object with a `type`
//! discriminator. Outbound envelopes use `<bridge>_<namespace>_provider_*`
//! tags, inbound envelopes use the bare bridge name.
//!
//! # Format
//!
//! Outbound:
//! ```json
//! { "type": "TONHoldAPI_ton_provider_connect" }
//! { "type": "TONHoldAPI_ton_provider_write", "message": { "jsonrpc": "2.0", ... } }
//! ```
//!
//! Inbound (usually string-encoded):
//! ```json
//! { "type": "TONHoldAPI", "message": { "jsonrpc": "2.0", "id": 0, "result": "1000" } }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::provider::BridgeConfig;
use crate::transport::message::is_falsy;

use super::{Notification, RequestEnvelope, ResponseEnvelope};

// ============================================================================
// Constants
// ============================================================================

/// Outer discriminator that forces rejection of the matching request.
pub const ERROR_TAG: &str = "error";

// ============================================================================
// Outbound
// ============================================================================

/// Messages the bridge posts to the wallet context.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Connect announcement sent on construction.
    Connect,
    /// A JSON-RPC request.
    Write(RequestEnvelope),
}

impl Outbound {
    /// Wraps the message in its transport envelope.
    #[must_use]
    pub fn into_message(self, config: &BridgeConfig) -> OutboundMessage {
        match self {
            Self::Connect => OutboundMessage {
                message_type: config.connect_type(),
                message: None,
            },
            Self::Write(request) => OutboundMessage {
                message_type: config.write_type(),
                message: Some(request),
            },
        }
    }
}

/// Serialized form of an [`Outbound`] message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    /// Envelope discriminator.
    #[serde(rename = "type")]
    pub message_type: String,

    /// Request payload, absent for the connect announcement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<RequestEnvelope>,
}

// ============================================================================
// Inbound
// ============================================================================

/// Protocol messages the bridge accepts from the wallet context.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Reply to an earlier request.
    Response(ResponseEnvelope),
    /// Unsolicited push.
    Notification(Notification),
}

impl Inbound {
    /// Classifies a parsed transport payload.
    ///
    /// Returns `None` for anything that is not this bridge's protocol
    /// traffic: foreign discriminators, missing `message`, missing
    /// `jsonrpc` marker, unroutable ids and unknown notification methods.
    #[must_use]
    pub fn classify(data: &Value, config: &BridgeConfig) -> Option<Self> {
        let tag = data.get("type")?.as_str()?;
        let error_class = tag == ERROR_TAG;
        if !error_class && tag != config.bridge_name() {
            return None;
        }

        let message = data.get("message")?;
        if !message.is_object() || !has_version_marker(message) {
            return None;
        }

        if message.get("id").is_some() {
            return ResponseEnvelope::from_message(message, error_class).map(Self::Response);
        }

        // Error-class envelopes only settle requests.
        if error_class {
            return None;
        }

        Notification::from_message(message, config).map(Self::Notification)
    }
}

/// Returns `true` if the message carries a usable `jsonrpc` marker.
fn has_version_marker(message: &Value) -> bool {
    message.get("jsonrpc").is_some_and(|marker| !is_falsy(marker))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::identifiers::RequestId;
    use crate::protocol::NotificationKind;

    #[test]
    fn test_connect_message() {
        let config = BridgeConfig::default();
        let message = Outbound::Connect.into_message(&config);
        let value = serde_json::to_value(&message).expect("serialize");
        assert_eq!(value, json!({"type": "TONHoldAPI_ton_provider_connect"}));
    }

    #[test]
    fn test_write_message() {
        let config = BridgeConfig::default();
        let request = RequestEnvelope::new(
            RequestId::new(3),
            "ton_sendTransaction",
            vec![json!({"to": "x"})],
        );
        let value = serde_json::to_value(Outbound::Write(request).into_message(&config))
            .expect("serialize");

        assert_eq!(
            value,
            json!({
                "type": "TONHoldAPI_ton_provider_write",
                "message": {
                    "jsonrpc": "2.0",
                    "id": 3,
                    "method": "ton_sendTransaction",
                    "params": [{"to": "x"}]
                }
            })
        );
    }

    #[test]
    fn test_classify_response() {
        let config = BridgeConfig::default();
        let data = json!({
            "type": "TONHoldAPI",
            "message": {"jsonrpc": "2.0", "id": 0, "result": "1000"}
        });

        assert_eq!(
            Inbound::classify(&data, &config),
            Some(Inbound::Response(ResponseEnvelope::success(RequestId::new(0), json!("1000"))))
        );
    }

    #[test]
    fn test_classify_error_tag() {
        let config = BridgeConfig::default();
        let data = json!({"type": "error", "message": {"jsonrpc": "2.0", "id": 1, "result": 5}});

        match Inbound::classify(&data, &config) {
            Some(Inbound::Response(response)) => {
                assert_eq!(response.outcome, Err(data["message"].clone()));
            }
            other => panic!("unexpected classification: {other:?}"),
        }

        let notification = json!({
            "type": "error",
            "message": {"jsonrpc": "2.0", "method": "ton_accounts"}
        });
        assert_eq!(Inbound::classify(&notification, &config), None);
    }

    #[test]
    fn test_classify_notification() {
        let config = BridgeConfig::default();
        let data = json!({
            "type": "TONHoldAPI",
            "message": {"jsonrpc": "2.0", "method": "ton_accounts", "params": ["addr1", "addr2"]}
        });

        match Inbound::classify(&data, &config) {
            Some(Inbound::Notification(n)) => {
                assert_eq!(n.kind, NotificationKind::AccountsChanged);
                assert_eq!(n.params, json!(["addr1", "addr2"]));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_ignores_foreign_traffic() {
        let config = BridgeConfig::default();
        let cases = [
            json!("plain string"),
            json!({"type": "SomethingElse", "message": {"jsonrpc": "2.0", "id": 0}}),
            json!({"type": "TONHoldAPI"}),
            json!({"type": "TONHoldAPI", "message": "text"}),
            json!({"type": "TONHoldAPI", "message": {"id": 0, "result": 1}}),
            json!({"type": "TONHoldAPI", "message": {"jsonrpc": "", "id": 0}}),
            json!({"type": "TONHoldAPI", "message": {"jsonrpc": null, "id": 0}}),
            json!({"type": "TONHoldAPI", "message": {"jsonrpc": false, "id": 0}}),
            json!({"type": "TONHoldAPI", "message": {"jsonrpc": 0, "id": 0}}),
            json!({"type": "TONHoldAPI", "message": {"jsonrpc": 0.0, "method": "tx_subscription"}}),
            json!({"type": "TONHoldAPI", "message": {"jsonrpc": "2.0", "method": "ton_getBalance"}}),
            json!({
                "type": "TONHoldAPI_ton_provider_write",
                "message": {"jsonrpc": "2.0", "id": 0, "method": "m"}
            }),
        ];

        for data in &cases {
            assert_eq!(Inbound::classify(data, &config), None, "case: {data}");
        }
    }

    #[test]
    fn test_classify_accepts_any_truthy_version_marker() {
        let config = BridgeConfig::default();
        for marker in [json!("2.0"), json!("1"), json!(2), json!(true), json!({}), json!([])] {
            let data = json!({
                "type": "TONHoldAPI",
                "message": {"jsonrpc": marker, "id": 3, "result": 1}
            });
            assert!(
                matches!(Inbound::classify(&data, &config), Some(Inbound::Response(_))),
                "marker: {marker}"
            );
        }
    }

    #[test]
    fn test_classify_respects_custom_bridge_name() {
        let config = BridgeConfig::builder()
            .bridge_name("OtherWallet")
            .build()
            .expect("valid config");
        let data = json!({
            "type": "OtherWallet",
            "message": {"jsonrpc": "2.0", "id": 9, "result": true}
        });
        assert!(matches!(Inbound::classify(&data, &config), Some(Inbound::Response(_))));

        let default_tag = json!({
            "type": "TONHoldAPI",
            "message": {"jsonrpc": "2.0", "id": 9, "result": true}
        });
        assert_eq!(Inbound::classify(&default_tag, &config), None);
    }
}
