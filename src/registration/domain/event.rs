//! Lifecycle events delivered to application listeners.

use super::{ProviderName, RegistrationError, RegistrationToken};
use std::collections::BTreeMap;

/// Key/value payload of an incoming push message.
pub type MessagePayload = BTreeMap<String, String>;

/// A lifecycle event fanned out to every registered listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// A push message arrived.
    Message {
        /// Provider that delivered the message.
        provider: ProviderName,
        /// Message data.
        payload: MessagePayload,
    },
    /// The provider dropped pending messages.
    DeletedMessages {
        /// Provider that dropped the messages.
        provider: ProviderName,
        /// Number of dropped messages; `None` when the provider does not say.
        count: Option<u32>,
    },
    /// A provider issued a registration token.
    Registered {
        /// Registered provider.
        provider: ProviderName,
        /// Issued token.
        token: RegistrationToken,
    },
    /// A registration was removed.
    Unregistered {
        /// Provider that held the registration.
        provider: ProviderName,
        /// Token that is no longer valid.
        token: RegistrationToken,
    },
    /// A registration attempt failed.
    RegistrationError {
        /// Provider the attempt targeted.
        provider: ProviderName,
        /// Failure details.
        error: RegistrationError,
    },
    /// An unregistration attempt failed.
    UnregistrationError {
        /// Provider the attempt targeted.
        provider: ProviderName,
        /// Failure details.
        error: RegistrationError,
    },
    /// No configured provider could be used.
    NoAvailableProvider,
}

impl PushEvent {
    /// Returns a short label for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::DeletedMessages { .. } => "deleted_messages",
            Self::Registered { .. } => "registered",
            Self::Unregistered { .. } => "unregistered",
            Self::RegistrationError { .. } => "registration_error",
            Self::UnregistrationError { .. } => "unregistration_error",
            Self::NoAvailableProvider => "no_available_provider",
        }
    }

    /// Returns the provider the event concerns, if any.
    #[must_use]
    pub const fn provider(&self) -> Option<&ProviderName> {
        match self {
            Self::Message { provider, .. }
            | Self::DeletedMessages { provider, .. }
            | Self::Registered { provider, .. }
            | Self::Unregistered { provider, .. }
            | Self::RegistrationError { provider, .. }
            | Self::UnregistrationError { provider, .. } => Some(provider),
            Self::NoAvailableProvider => None,
        }
    }
}
