//! Provider adapter port.
//!
//! An adapter wraps one push backend. Probes are synchronous; registration
//! and unregistration are issued asynchronously and report back later
//! through the [`ProviderCallback`] handed to the adapter.

use crate::registration::domain::{
    AttemptTicket, ProviderCapabilities, ProviderErrorCode, ProviderName, PushEnvironment,
    RegistrationToken,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for provider adapter operations.
pub type ProviderAdapterResult<T> = Result<T, ProviderAdapterError>;

/// Contract every push backend integration implements.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Returns the stable provider name used as the persisted identity.
    fn name(&self) -> &ProviderName;

    /// Returns the optional features the provider supports.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Cheap probe for whether the backend can be used on this device.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderAdapterError`] when the probe itself fails; the
    /// candidate is then skipped for the current cycle.
    fn is_available(&self, environment: &PushEnvironment) -> ProviderAdapterResult<bool>;

    /// Checks that the host carries the configuration the backend needs.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderAdapterError`] when the check itself fails; the
    /// candidate is then skipped for the current cycle.
    fn check_manifest(&self, environment: &PushEnvironment) -> ProviderAdapterResult<bool>;

    /// Issues a registration request.
    ///
    /// Returns once the request is issued; the outcome is reported through
    /// `callback`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderAdapterError`] when the request cannot be issued.
    async fn register(
        &self,
        environment: &PushEnvironment,
        callback: ProviderCallback,
    ) -> ProviderAdapterResult<()>;

    /// Issues an unregistration request.
    ///
    /// Returns once the request is issued; the outcome is reported through
    /// `callback`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderAdapterError`] when the request cannot be issued.
    async fn unregister(
        &self,
        environment: &PushEnvironment,
        callback: ProviderCallback,
    ) -> ProviderAdapterResult<()>;
}

/// Errors returned synchronously by provider adapters.
#[derive(Debug, Clone, Error)]
pub enum ProviderAdapterError {
    /// The provider rejected the request with a vendor code.
    #[error("provider rejected request: {0}")]
    Rejected(ProviderErrorCode),

    /// Generic adapter failure.
    #[error("provider adapter error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProviderAdapterError {
    /// Wraps a runtime error from the adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }

    /// Returns the provider code carried by the error.
    ///
    /// Runtime failures carry their message as an unknown code, which
    /// classifies as recoverable.
    #[must_use]
    pub fn code(&self) -> ProviderErrorCode {
        match self {
            Self::Rejected(code) => code.clone(),
            Self::Runtime(err) => ProviderErrorCode::Unknown(err.to_string()),
        }
    }
}

/// Result an adapter reports for an issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// Registration succeeded with the given token.
    Registered(RegistrationToken),
    /// Registration failed.
    RegistrationFailed(ProviderErrorCode),
    /// The registration was removed.
    Unregistered,
    /// Unregistration failed.
    UnregistrationFailed(ProviderErrorCode),
}

impl ProviderOutcome {
    /// Returns a short label for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registered(_) => "registered",
            Self::RegistrationFailed(_) => "registration_failed",
            Self::Unregistered => "unregistered",
            Self::UnregistrationFailed(_) => "unregistration_failed",
        }
    }
}

/// Receiver of adapter outcomes.
///
/// Implementations must not call back into the orchestrator synchronously;
/// the runtime implementation enqueues outcomes onto the worker channel.
pub trait ResultSink: Send + Sync {
    /// Delivers an outcome for the attempt identified by `ticket`.
    fn deliver(&self, ticket: AttemptTicket, outcome: ProviderOutcome);
}

/// Handle an adapter uses to report the outcome of one issued request.
#[derive(Clone)]
pub struct ProviderCallback {
    ticket: AttemptTicket,
    sink: Arc<dyn ResultSink>,
}

impl ProviderCallback {
    /// Creates a callback bound to `ticket`.
    #[must_use]
    pub fn new(ticket: AttemptTicket, sink: Arc<dyn ResultSink>) -> Self {
        Self { ticket, sink }
    }

    /// Returns the ticket this callback reports for.
    #[must_use]
    pub const fn ticket(&self) -> &AttemptTicket {
        &self.ticket
    }

    /// Reports a successful registration.
    pub fn registered(&self, token: RegistrationToken) {
        self.report(ProviderOutcome::Registered(token));
    }

    /// Reports a failed registration.
    pub fn registration_failed(&self, code: ProviderErrorCode) {
        self.report(ProviderOutcome::RegistrationFailed(code));
    }

    /// Reports a completed unregistration.
    pub fn unregistered(&self) {
        self.report(ProviderOutcome::Unregistered);
    }

    /// Reports a failed unregistration.
    pub fn unregistration_failed(&self, code: ProviderErrorCode) {
        self.report(ProviderOutcome::UnregistrationFailed(code));
    }

    /// Reports an arbitrary outcome.
    pub fn report(&self, outcome: ProviderOutcome) {
        self.sink.deliver(self.ticket.clone(), outcome);
    }
}

impl std::fmt::Debug for ProviderCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCallback")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}
