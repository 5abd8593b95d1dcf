//! Persisted registration record.

use super::{DeviceFingerprint, ProviderName, RegistrationDomainError, RegistrationToken};
use serde::{Deserialize, Serialize};

/// What the persisted record says about the registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEntry {
    /// Nothing is registered or in progress.
    Empty,
    /// A registration attempt against the provider was in flight.
    Registering {
        /// Provider being attempted.
        provider: ProviderName,
    },
    /// The provider issued a token.
    Registered {
        /// Registered provider.
        provider: ProviderName,
        /// Token issued by the provider.
        token: RegistrationToken,
    },
}

/// The single system-wide registration record.
///
/// A token can only be present together with its provider; the type makes
/// the torn state unrepresentable and [`TryFrom`] rejects it at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedRecord", into = "PersistedRecord")]
pub struct RegistrationRecord {
    entry: RecordEntry,
    device_fingerprint: DeviceFingerprint,
}

impl RegistrationRecord {
    /// Creates a record with nothing registered.
    #[must_use]
    pub const fn empty(device_fingerprint: DeviceFingerprint) -> Self {
        Self {
            entry: RecordEntry::Empty,
            device_fingerprint,
        }
    }

    /// Creates a record for an attempt in flight against `provider`.
    #[must_use]
    pub const fn registering(
        provider: ProviderName,
        device_fingerprint: DeviceFingerprint,
    ) -> Self {
        Self {
            entry: RecordEntry::Registering { provider },
            device_fingerprint,
        }
    }

    /// Creates a record for a completed registration.
    #[must_use]
    pub const fn registered(
        provider: ProviderName,
        token: RegistrationToken,
        device_fingerprint: DeviceFingerprint,
    ) -> Self {
        Self {
            entry: RecordEntry::Registered { provider, token },
            device_fingerprint,
        }
    }

    /// Returns the record entry.
    #[must_use]
    pub const fn entry(&self) -> &RecordEntry {
        &self.entry
    }

    /// Returns the recorded provider name, if any.
    #[must_use]
    pub const fn provider_name(&self) -> Option<&ProviderName> {
        match &self.entry {
            RecordEntry::Empty => None,
            RecordEntry::Registering { provider } | RecordEntry::Registered { provider, .. } => {
                Some(provider)
            }
        }
    }

    /// Returns the recorded registration token, if any.
    #[must_use]
    pub const fn registration_token(&self) -> Option<&RegistrationToken> {
        match &self.entry {
            RecordEntry::Registered { token, .. } => Some(token),
            RecordEntry::Empty | RecordEntry::Registering { .. } => None,
        }
    }

    /// Returns the device fingerprint the record was written under.
    #[must_use]
    pub const fn device_fingerprint(&self) -> &DeviceFingerprint {
        &self.device_fingerprint
    }
}

impl Default for RegistrationRecord {
    fn default() -> Self {
        Self::empty(DeviceFingerprint::default())
    }
}

/// Flat storage layout of a [`RegistrationRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    /// Registered or attempted provider.
    pub provider_name: Option<String>,
    /// Token issued by the provider.
    pub registration_token: Option<String>,
    /// Device identity snapshot.
    #[serde(default)]
    pub device_fingerprint: String,
}

impl TryFrom<PersistedRecord> for RegistrationRecord {
    type Error = RegistrationDomainError;

    fn try_from(value: PersistedRecord) -> Result<Self, Self::Error> {
        let device_fingerprint = DeviceFingerprint::new(value.device_fingerprint);
        let entry = match (value.provider_name, value.registration_token) {
            (None, None) => RecordEntry::Empty,
            (None, Some(_)) => return Err(RegistrationDomainError::TokenWithoutProvider),
            (Some(name), None) => RecordEntry::Registering {
                provider: ProviderName::new(name)?,
            },
            (Some(name), Some(token)) => RecordEntry::Registered {
                provider: ProviderName::new(name)?,
                token: RegistrationToken::new(token)?,
            },
        };
        Ok(Self {
            entry,
            device_fingerprint,
        })
    }
}

impl From<RegistrationRecord> for PersistedRecord {
    fn from(value: RegistrationRecord) -> Self {
        let (provider_name, registration_token) = match value.entry {
            RecordEntry::Empty => (None, None),
            RecordEntry::Registering { provider } => (Some(provider.into()), None),
            RecordEntry::Registered { provider, token } => {
                (Some(provider.into()), Some(token.into()))
            }
        };
        Self {
            provider_name,
            registration_token,
            device_fingerprint: value.device_fingerprint.as_str().to_owned(),
        }
    }
}
