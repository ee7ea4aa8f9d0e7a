//! Builder pattern for bridge configuration.
//!
//! Provides a fluent API for configuring a [`BridgeConfig`].
//!
//! # Example
//!
//! ```no_run
//! use ton_provider_bridge::BridgeConfig;
//!
//! # fn example() -> ton_provider_bridge::Result<()> {
//! let config = BridgeConfig::builder()
//!     .bridge_name("TONHoldAPI")
//!     .target_origin("https://wallet.example")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::protocol::ERROR_TAG;
use crate::transport::TargetOrigin;

use super::config::BridgeConfig;

// ============================================================================
// BridgeConfigBuilder
// ============================================================================

/// Builder for a [`BridgeConfig`].
///
/// Unset fields keep the defaults of [`BridgeConfig::default()`].
#[derive(Debug, Default, Clone)]
pub struct BridgeConfigBuilder {
    bridge_name: Option<String>,
    namespace: Option<String>,
    target_origin: Option<String>,
    accounts_method: Option<String>,
    subscription_marker: Option<String>,
    ready_event: Option<String>,
}

// ============================================================================
// BridgeConfigBuilder Implementation
// ============================================================================

impl BridgeConfigBuilder {
    /// Creates a builder with no overrides.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inbound discriminator and outbound prefix.
    #[inline]
    #[must_use]
    pub fn bridge_name(mut self, name: impl Into<String>) -> Self {
        self.bridge_name = Some(name.into());
        self
    }

    /// Sets the provider namespace used in outbound tags.
    #[inline]
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the outbound target origin.
    ///
    /// Accepts `"*"`, `"/"` or an absolute URL whose origin is used.
    /// Parsed in [`BridgeConfigBuilder::build`].
    #[inline]
    #[must_use]
    pub fn target_origin(mut self, origin: impl Into<String>) -> Self {
        self.target_origin = Some(origin.into());
        self
    }

    /// Sets the notification method routed as `accountsChanged`.
    #[inline]
    #[must_use]
    pub fn accounts_method(mut self, method: impl Into<String>) -> Self {
        self.accounts_method = Some(method.into());
        self
    }

    /// Sets the substring that marks a subscription notification.
    #[inline]
    #[must_use]
    pub fn subscription_marker(mut self, marker: impl Into<String>) -> Self {
        self.subscription_marker = Some(marker.into());
        self
    }

    /// Sets the page event dispatched on first installation.
    #[inline]
    #[must_use]
    pub fn ready_event(mut self, event: impl Into<String>) -> Self {
        self.ready_event = Some(event.into());
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if any name is empty
    /// - [`Error::Config`] if the bridge name collides with the `"error"` tag
    /// - [`Error::Config`] if the target origin cannot be parsed
    pub fn build(self) -> Result<BridgeConfig> {
        let defaults = BridgeConfig::default();

        let bridge_name = non_empty("bridge_name", self.bridge_name, defaults.bridge_name)?;
        if bridge_name == ERROR_TAG {
            return Err(Error::config(format!(
                "bridge_name {ERROR_TAG:?} is reserved for error envelopes"
            )));
        }

        let target_origin = match self.target_origin {
            Some(origin) => origin.parse::<TargetOrigin>()?,
            None => defaults.target_origin,
        };

        Ok(BridgeConfig {
            bridge_name,
            namespace: non_empty("namespace", self.namespace, defaults.namespace)?,
            target_origin,
            accounts_method: non_empty(
                "accounts_method",
                self.accounts_method,
                defaults.accounts_method,
            )?,
            subscription_marker: non_empty(
                "subscription_marker",
                self.subscription_marker,
                defaults.subscription_marker,
            )?,
            ready_event: non_empty("ready_event", self.ready_event, defaults.ready_event)?,
        })
    }
}

fn non_empty(field: &str, value: Option<String>, default: String) -> Result<String> {
    match value {
        Some(v) if v.is_empty() => Err(Error::config(format!("{field} must not be empty"))),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = BridgeConfigBuilder::new().build().expect("defaults are valid");
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = BridgeConfig::builder()
            .bridge_name("MyWallet")
            .namespace("evm")
            .accounts_method("evm_accounts")
            .subscription_marker("_sub")
            .ready_event("walletready")
            .target_origin("https://wallet.example/inject.js")
            .build()
            .expect("valid config");

        assert_eq!(config.connect_type(), "MyWallet_evm_provider_connect");
        assert_eq!(config.write_type(), "MyWallet_evm_provider_write");
        assert_eq!(config.accounts_method(), "evm_accounts");
        assert_eq!(config.subscription_marker(), "_sub");
        assert_eq!(config.ready_event(), "walletready");
        assert_eq!(
            config.target_origin(),
            &TargetOrigin::Origin("https://wallet.example".to_string())
        );
    }

    #[test]
    fn test_builder_rejects_empty_names() {
        let result = BridgeConfig::builder().namespace("").build();
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = BridgeConfig::builder().subscription_marker("").build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_builder_rejects_error_tag() {
        let result = BridgeConfig::builder().bridge_name("error").build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_builder_rejects_bad_origin() {
        let result = BridgeConfig::builder().target_origin("nope").build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
