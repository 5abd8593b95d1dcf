//! Scripted provider adapter.
//!
//! Replays pre-programmed replies so hosts and tests can drive the
//! orchestrator without a real push backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::registration::{
    domain::{
        ProviderCapabilities, ProviderErrorCode, ProviderName, PushEnvironment, RegistrationToken,
    },
    ports::{ProviderAdapter, ProviderAdapterError, ProviderAdapterResult, ProviderCallback},
};

/// Programmed reply to a registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Report success with the token.
    Token(RegistrationToken),
    /// Report a failure through the callback.
    Fail(ProviderErrorCode),
    /// Keep the callback; the caller completes it via
    /// [`ScriptedProvider::take_held`].
    Hold,
    /// Refuse to issue the request.
    Reject(ProviderErrorCode),
}

/// Programmed reply to an unregistration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedUnregisterReply {
    /// Report the registration as removed.
    Confirm,
    /// Report a failure through the callback.
    Fail(ProviderErrorCode),
    /// Keep the callback for later completion.
    Hold,
    /// Refuse to issue the request.
    Reject(ProviderErrorCode),
}

#[derive(Debug)]
struct ScriptState {
    available: bool,
    manifest_ok: bool,
    probe_error: Option<ProviderAdapterError>,
    register_replies: VecDeque<ScriptedReply>,
    register_default: ScriptedReply,
    unregister_replies: VecDeque<ScriptedUnregisterReply>,
    unregister_default: ScriptedUnregisterReply,
    held: Vec<ProviderCallback>,
    register_calls: usize,
    unregister_calls: usize,
}

/// [`ProviderAdapter`] that follows a script.
///
/// By default the provider is available, passes the manifest check, holds
/// every registration request and confirms every unregistration.
#[derive(Debug)]
pub struct ScriptedProvider {
    name: ProviderName,
    capabilities: ProviderCapabilities,
    state: Mutex<ScriptState>,
}

impl ScriptedProvider {
    /// Creates a provider with full capabilities.
    #[must_use]
    pub fn new(name: ProviderName) -> Self {
        Self::with_capabilities(name, ProviderCapabilities::new(true, true))
    }

    /// Creates a provider advertising `capabilities`.
    #[must_use]
    pub fn with_capabilities(name: ProviderName, capabilities: ProviderCapabilities) -> Self {
        Self {
            name,
            capabilities,
            state: Mutex::new(ScriptState {
                available: true,
                manifest_ok: true,
                probe_error: None,
                register_replies: VecDeque::new(),
                register_default: ScriptedReply::Hold,
                unregister_replies: VecDeque::new(),
                unregister_default: ScriptedUnregisterReply::Confirm,
                held: Vec::new(),
                register_calls: 0,
                unregister_calls: 0,
            }),
        }
    }

    /// Sets what the availability probe reports.
    pub fn set_available(&self, available: bool) {
        self.update(|state| state.available = available);
    }

    /// Sets what the manifest check reports.
    pub fn set_manifest_ok(&self, manifest_ok: bool) {
        self.update(|state| state.manifest_ok = manifest_ok);
    }

    /// Makes both probes fail with `error` until cleared with `None`.
    pub fn set_probe_error(&self, error: Option<ProviderAdapterError>) {
        self.update(|state| state.probe_error = error);
    }

    /// Queues a one-shot reply for the next registration request.
    pub fn push_register_reply(&self, reply: ScriptedReply) {
        self.update(|state| state.register_replies.push_back(reply));
    }

    /// Sets the reply used once queued registration replies run out.
    pub fn set_register_default(&self, reply: ScriptedReply) {
        self.update(|state| state.register_default = reply);
    }

    /// Queues a one-shot reply for the next unregistration request.
    pub fn push_unregister_reply(&self, reply: ScriptedUnregisterReply) {
        self.update(|state| state.unregister_replies.push_back(reply));
    }

    /// Sets the reply used once queued unregistration replies run out.
    pub fn set_unregister_default(&self, reply: ScriptedUnregisterReply) {
        self.update(|state| state.unregister_default = reply);
    }

    /// Drains callbacks held by [`ScriptedReply::Hold`] replies.
    #[must_use]
    pub fn take_held(&self) -> Vec<ProviderCallback> {
        self.state
            .lock()
            .map(|mut state| std::mem::take(&mut state.held))
            .unwrap_or_default()
    }

    /// Number of registration requests received.
    #[must_use]
    pub fn register_calls(&self) -> usize {
        self.state.lock().map(|state| state.register_calls).unwrap_or(0)
    }

    /// Number of unregistration requests received.
    #[must_use]
    pub fn unregister_calls(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.unregister_calls)
            .unwrap_or(0)
    }

    fn update(&self, apply: impl FnOnce(&mut ScriptState)) {
        if let Ok(mut state) = self.state.lock() {
            apply(&mut state);
        }
    }

    fn lock(&self) -> ProviderAdapterResult<std::sync::MutexGuard<'_, ScriptState>> {
        self.state.lock().map_err(|err| {
            ProviderAdapterError::runtime(std::io::Error::other(err.to_string()))
        })
    }

    fn probe(&self, read: impl FnOnce(&ScriptState) -> bool) -> ProviderAdapterResult<bool> {
        let state = self.lock()?;
        match &state.probe_error {
            Some(err) => Err(err.clone()),
            None => Ok(read(&state)),
        }
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn name(&self) -> &ProviderName {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    fn is_available(&self, _environment: &PushEnvironment) -> ProviderAdapterResult<bool> {
        self.probe(|state| state.available)
    }

    fn check_manifest(&self, _environment: &PushEnvironment) -> ProviderAdapterResult<bool> {
        self.probe(|state| state.manifest_ok)
    }

    async fn register(
        &self,
        _environment: &PushEnvironment,
        callback: ProviderCallback,
    ) -> ProviderAdapterResult<()> {
        let reply = {
            let mut state = self.lock()?;
            state.register_calls = state.register_calls.saturating_add(1);
            let next = state.register_replies.pop_front();
            next.unwrap_or_else(|| state.register_default.clone())
        };
        match reply {
            ScriptedReply::Token(token) => callback.registered(token),
            ScriptedReply::Fail(code) => callback.registration_failed(code),
            ScriptedReply::Hold => self.lock()?.held.push(callback),
            ScriptedReply::Reject(code) => return Err(ProviderAdapterError::Rejected(code)),
        }
        Ok(())
    }

    async fn unregister(
        &self,
        _environment: &PushEnvironment,
        callback: ProviderCallback,
    ) -> ProviderAdapterResult<()> {
        let reply = {
            let mut state = self.lock()?;
            state.unregister_calls = state.unregister_calls.saturating_add(1);
            let next = state.unregister_replies.pop_front();
            next.unwrap_or_else(|| state.unregister_default.clone())
        };
        match reply {
            ScriptedUnregisterReply::Confirm => callback.unregistered(),
            ScriptedUnregisterReply::Fail(code) => callback.unregistration_failed(code),
            ScriptedUnregisterReply::Hold => self.lock()?.held.push(callback),
            ScriptedUnregisterReply::Reject(code) => {
                return Err(ProviderAdapterError::Rejected(code));
            }
        }
        Ok(())
    }
}
