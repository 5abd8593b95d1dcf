//! Application listener port.

use crate::registration::domain::{
    MessagePayload, ProviderName, PushEvent, RegistrationError, RegistrationToken,
};

/// Callbacks an application implements to observe push lifecycle events.
///
/// Every method has an empty default so listeners override only what they
/// need. Callbacks run synchronously on the orchestrator worker and should
/// return quickly.
pub trait EventListener: Send + Sync {
    /// A push message arrived.
    fn on_message(&self, _provider: &ProviderName, _payload: &MessagePayload) {}

    /// The provider dropped pending messages; `None` when the count is
    /// unknown.
    fn on_deleted_messages(&self, _provider: &ProviderName, _count: Option<u32>) {}

    /// A provider issued a registration token.
    fn on_registered(&self, _provider: &ProviderName, _token: &RegistrationToken) {}

    /// A registration was removed.
    fn on_unregistered(&self, _provider: &ProviderName, _token: &RegistrationToken) {}

    /// A registration attempt failed.
    fn on_registration_error(&self, _provider: &ProviderName, _error: &RegistrationError) {}

    /// An unregistration attempt failed.
    fn on_unregistration_error(&self, _provider: &ProviderName, _error: &RegistrationError) {}

    /// No configured provider could be used.
    fn on_no_available_provider(&self) {}
}

/// Routes an event to the matching listener callback.
pub fn deliver(event: &PushEvent, listener: &dyn EventListener) {
    match event {
        PushEvent::Message { provider, payload } => listener.on_message(provider, payload),
        PushEvent::DeletedMessages { provider, count } => {
            listener.on_deleted_messages(provider, *count);
        }
        PushEvent::Registered { provider, token } => listener.on_registered(provider, token),
        PushEvent::Unregistered { provider, token } => listener.on_unregistered(provider, token),
        PushEvent::RegistrationError { provider, error } => {
            listener.on_registration_error(provider, error);
        }
        PushEvent::UnregistrationError { provider, error } => {
            listener.on_unregistration_error(provider, error);
        }
        PushEvent::NoAvailableProvider => listener.on_no_available_provider(),
    }
}
