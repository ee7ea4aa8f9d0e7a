//! Notification message types.
//!
//! Notifications are unsolicited messages pushed from the wallet context
//! to the page. They carry no correlation id.
//!
//! | Method | Kind | Emitted as |
//! |--------|------|------------|
//! | contains `_subscription` | [`NotificationKind::Subscription`] | `"notification"` |
//! | `ton_accounts` | [`NotificationKind::AccountsChanged`] | `"accountsChanged"` |

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::provider::BridgeConfig;

// ============================================================================
// Event Names
// ============================================================================

/// Event name for subscription notifications.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Event name for account-list changes.
pub const ACCOUNTS_CHANGED_EVENT: &str = "accountsChanged";

// ============================================================================
// NotificationKind
// ============================================================================

/// Routing class of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Subscription push (method contains the subscription marker).
    Subscription,
    /// The wallet's account list changed.
    AccountsChanged,
}

impl NotificationKind {
    /// Returns the listener event name this kind is emitted under.
    #[inline]
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Subscription => NOTIFICATION_EVENT,
            Self::AccountsChanged => ACCOUNTS_CHANGED_EVENT,
        }
    }

    /// Classifies a notification method name.
    ///
    /// The subscription marker is checked first, so a method that both
    /// contains the marker and equals the account method is a subscription.
    #[must_use]
    pub fn classify(method: &str, config: &BridgeConfig) -> Option<Self> {
        if method.contains(config.subscription_marker()) {
            Some(Self::Subscription)
        } else if method == config.accounts_method() {
            Some(Self::AccountsChanged)
        } else {
            None
        }
    }
}

// ============================================================================
// Notification
// ============================================================================

/// A routed notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Routing class.
    pub kind: NotificationKind,

    /// Original method name.
    pub method: String,

    /// Notification payload (`null` when absent).
    pub params: Value,
}

impl Notification {
    /// Classifies a nested `message` object without an `id`.
    ///
    /// Returns `None` for messages without a string `method` or with a
    /// method that maps to no known kind.
    pub(crate) fn from_message(message: &Value, config: &BridgeConfig) -> Option<Self> {
        let method = message.get("method")?.as_str()?;
        let kind = NotificationKind::classify(method, config)?;

        Some(Self {
            kind,
            method: method.to_string(),
            params: message.get("params").cloned().unwrap_or(Value::Null),
        })
    }

    /// Returns the listener event name.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        self.kind.event_name()
    }
}

// ============================================================================
// Tests
// ============================================================================
