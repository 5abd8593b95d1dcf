//! Host environment handed to provider adapters.

use super::DeviceFingerprint;
use std::collections::BTreeMap;

/// Host facts provider adapters probe and register against.
///
/// `settings` holds free-form configuration such as sender identifiers or
/// API keys; adapters inspect it in their manifest check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PushEnvironment {
    device_fingerprint: DeviceFingerprint,
    settings: BTreeMap<String, String>,
}

impl PushEnvironment {
    /// Creates an environment for the given device identity.
    #[must_use]
    pub const fn new(device_fingerprint: DeviceFingerprint) -> Self {
        Self {
            device_fingerprint,
            settings: BTreeMap::new(),
        }
    }

    /// Adds a setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Returns the current device fingerprint.
    #[must_use]
    pub const fn device_fingerprint(&self) -> &DeviceFingerprint {
        &self.device_fingerprint
    }

    /// Replaces the device fingerprint.
    pub fn set_device_fingerprint(&mut self, device_fingerprint: DeviceFingerprint) {
        self.device_fingerprint = device_fingerprint;
    }

    /// Returns a setting value.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }
}
