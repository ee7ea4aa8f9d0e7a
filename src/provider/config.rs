//! Bridge configuration.
//!
//! Every name the bridge puts on or expects from the page channel. The
//! defaults match the shipped wallet extension.
//!
//! | Setting | Default | Used for |
//! |---------|---------|----------|
//! | `bridge_name` | `TONHoldAPI` | inbound discriminator, outbound prefix |
//! | `namespace` | `ton` | outbound `<bridge>_<namespace>_provider_*` tags |
//! | `target_origin` | `*` | `postMessage` target scope |
//! | `accounts_method` | `ton_accounts` | `accountsChanged` routing |
//! | `subscription_marker` | `_subscription` | `notification` routing |
//! | `ready_event` | `tonready` | one-time page event on first install |

// ============================================================================
// Imports
// ============================================================================

use crate::transport::TargetOrigin;

use super::builder::BridgeConfigBuilder;

// ============================================================================
// Constants
// ============================================================================

/// Default inbound discriminator and outbound prefix.
pub const DEFAULT_BRIDGE_NAME: &str = "TONHoldAPI";

/// Default provider namespace.
pub const DEFAULT_NAMESPACE: &str = "ton";

/// Default account-change notification method.
pub const DEFAULT_ACCOUNTS_METHOD: &str = "ton_accounts";

/// Default subscription marker substring.
pub const DEFAULT_SUBSCRIPTION_MARKER: &str = "_subscription";

/// Default page event fired on first installation.
pub const DEFAULT_READY_EVENT: &str = "tonready";

// ============================================================================
// BridgeConfig
// ============================================================================

/// Validated bridge configuration.
///
/// Build with [`BridgeConfig::builder()`]; [`BridgeConfig::default()`] gives
/// the shipped wallet's names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub(super) bridge_name: String,
    pub(super) namespace: String,
    pub(super) target_origin: TargetOrigin,
    pub(super) accounts_method: String,
    pub(super) subscription_marker: String,
    pub(super) ready_event: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_name: DEFAULT_BRIDGE_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            target_origin: TargetOrigin::Any,
            accounts_method: DEFAULT_ACCOUNTS_METHOD.to_string(),
            subscription_marker: DEFAULT_SUBSCRIPTION_MARKER.to_string(),
            ready_event: DEFAULT_READY_EVENT.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Creates a builder seeded with the defaults.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// Inbound envelope discriminator.
    #[inline]
    #[must_use]
    pub fn bridge_name(&self) -> &str {
        &self.bridge_name
    }

    /// Provider namespace used in outbound tags.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Scope outbound messages are addressed to.
    #[inline]
    #[must_use]
    pub fn target_origin(&self) -> &TargetOrigin {
        &self.target_origin
    }

    /// Method name routed as `accountsChanged`.
    #[inline]
    #[must_use]
    pub fn accounts_method(&self) -> &str {
        &self.accounts_method
    }

    /// Substring marking a method as a subscription notification.
    #[inline]
    #[must_use]
    pub fn subscription_marker(&self) -> &str {
        &self.subscription_marker
    }

    /// Page event dispatched on first installation.
    #[inline]
    #[must_use]
    pub fn ready_event(&self) -> &str {
        &self.ready_event
    }

    /// Outbound connect discriminator, e.g. `TONHoldAPI_ton_provider_connect`.
    #[must_use]
    pub fn connect_type(&self) -> String {
        format!("{}_{}_provider_connect", self.bridge_name, self.namespace)
    }

    /// Outbound request discriminator, e.g. `TONHoldAPI_ton_provider_write`.
    #[must_use]
    pub fn write_type(&self) -> String {
        format!("{}_{}_provider_write", self.bridge_name, self.namespace)
    }
}

// ============================================================================
// Tests
// ============================================================================
