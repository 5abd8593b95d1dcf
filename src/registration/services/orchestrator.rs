//! Provider-selection and registration state machine.
//!
//! The orchestrator walks the priority-ordered provider catalog, issues
//! registration requests, and interprets the asynchronous outcomes adapters
//! report back. Every request and every retry timer carries an
//! [`AttemptTicket`]; an outcome is only accepted when its ticket matches
//! the one the orchestrator is currently waiting for, so late or duplicate
//! deliveries from abandoned attempts never change state.
//!
//! All methods take `&mut self`: callers are expected to serialize access,
//! which the runtime does by owning the orchestrator on a single worker task.

use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;

use crate::registration::{
    domain::{
        AttemptOperation, AttemptTicket, AttemptToken, DeviceFingerprint, MessagePayload,
        OrchestratorState, ProviderErrorCode, ProviderName, PushEnvironment, PushEvent,
        RecordEntry, RegistrationDomainError, RegistrationError, RegistrationRecord,
        RegistrationToken,
    },
    ports::{ProviderCallback, ProviderOutcome, RegistrationStore, ResultSink, StoreError},
};

use super::{
    backoff::{BackoffPolicy, BackoffScheduler, BackoffTimer, RetryFn},
    catalog::ProviderCatalog,
    config::OrchestratorConfig,
    dispatcher::EventDispatcher,
};

/// Errors returned to callers of orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistrationDomainError),
    /// The registration store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The runtime worker has shut down.
    #[error("push runtime has stopped")]
    Stopped,
}

/// Result type for orchestrator operations.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Collaborators an orchestrator is assembled from.
pub struct OrchestratorParts<S, C>
where
    S: RegistrationStore,
    C: Clock + Send + Sync,
{
    /// Tuning.
    pub config: OrchestratorConfig,
    /// Provider candidates in priority order.
    pub catalog: ProviderCatalog,
    /// Host environment handed to adapters.
    pub environment: PushEnvironment,
    /// Durable registration record.
    pub store: Arc<S>,
    /// Time source for retry timers.
    pub clock: Arc<C>,
    /// Listener fan-out.
    pub dispatcher: EventDispatcher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnregisterReason {
    Requested,
    Invalidated,
}

/// The registration state machine.
pub struct RegistrationOrchestrator<S, C>
where
    S: RegistrationStore,
    C: Clock + Send + Sync,
{
    config: OrchestratorConfig,
    catalog: ProviderCatalog,
    environment: PushEnvironment,
    store: Arc<S>,
    dispatcher: EventDispatcher,
    scheduler: BackoffScheduler<C>,
    sink: Arc<dyn ResultSink>,
    state: OrchestratorState,
    recorded_fingerprint: DeviceFingerprint,
    last_token: AttemptToken,
    awaiting: Option<AttemptTicket>,
    unregister_reason: UnregisterReason,
    register_after_unregister: bool,
}

impl<S, C> RegistrationOrchestrator<S, C>
where
    S: RegistrationStore,
    C: Clock + Send + Sync,
{
    /// Builds an orchestrator and restores its state from the store.
    ///
    /// Adapter outcomes are reported into `sink` and fired retry timers call
    /// `on_retry`; both must route back into this orchestrator's serialized
    /// entry points. A stored record that cannot be decoded, or that names a
    /// provider missing from the catalog, is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the store cannot be read or
    /// cleared.
    pub fn new(
        parts: OrchestratorParts<S, C>,
        sink: Arc<dyn ResultSink>,
        on_retry: RetryFn,
    ) -> OrchestratorResult<Self> {
        let OrchestratorParts {
            config,
            catalog,
            environment,
            store,
            clock,
            dispatcher,
        } = parts;
        let scheduler =
            BackoffScheduler::new(BackoffPolicy::new(*config.backoff()), clock, on_retry);
        let record = load_record(store.as_ref())?;
        let recorded_fingerprint = record.device_fingerprint().clone();

        let state = match record.entry() {
            RecordEntry::Empty => OrchestratorState::Unregistered,
            RecordEntry::Registering { provider } => match catalog.position(provider) {
                Some(candidate_index) => OrchestratorState::Registering {
                    candidate_index,
                    attempt_count: 0,
                },
                None => clear_stale(store.as_ref(), provider)?,
            },
            RecordEntry::Registered { provider, token } => {
                if catalog.position(provider).is_some() {
                    OrchestratorState::Registered {
                        provider: provider.clone(),
                        token: token.clone(),
                    }
                } else {
                    clear_stale(store.as_ref(), provider)?
                }
            }
        };
        tracing::info!(state = %state, providers = catalog.len(), "registration state restored");

        Ok(Self {
            config,
            catalog,
            environment,
            store,
            dispatcher,
            scheduler,
            sink,
            state,
            recorded_fingerprint,
            last_token: AttemptToken::default(),
            awaiting: None,
            unregister_reason: UnregisterReason::Requested,
            register_after_unregister: false,
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &OrchestratorState {
        &self.state
    }

    /// Host environment handed to adapters.
    #[must_use]
    pub const fn environment(&self) -> &PushEnvironment {
        &self.environment
    }

    /// Configured provider candidates.
    #[must_use]
    pub const fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Listener fan-out.
    #[must_use]
    pub const fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// The retry timer currently pending, if any.
    #[must_use]
    pub fn pending_retry(&self) -> Option<&BackoffTimer> {
        self.scheduler.pending()
    }

    /// Ticket of the request whose outcome is awaited, if any.
    #[must_use]
    pub const fn awaiting(&self) -> Option<&AttemptTicket> {
        self.awaiting.as_ref()
    }

    /// Requests a registration.
    ///
    /// No-op when registered or when an attempt is already in flight or
    /// waiting on a retry. An attempt restored from the store is resumed.
    /// While unregistering, a fresh cycle is queued for when the
    /// unregistration completes.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the record cannot be
    /// persisted.
    pub async fn register(&mut self) -> OrchestratorResult<()> {
        match self.state {
            OrchestratorState::Unregistered => self.start_cycle().await,
            OrchestratorState::Registering {
                candidate_index,
                attempt_count,
            } => {
                if self.awaiting.is_some() || self.scheduler.pending().is_some() {
                    tracing::debug!("registration already in progress");
                    return Ok(());
                }
                tracing::info!(candidate_index, "resuming interrupted registration");
                self.run_selection(candidate_index, attempt_count).await
            }
            OrchestratorState::Registered { .. } => {
                tracing::debug!("already registered");
                Ok(())
            }
            OrchestratorState::Unregistering { .. } => {
                tracing::debug!("registration queued behind unregistration");
                self.register_after_unregister = true;
                Ok(())
            }
        }
    }

    /// Requests removal of the registration.
    ///
    /// While registering, the cycle is abandoned without an event. A
    /// provider without unregister support is unregistered locally.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the record cannot be
    /// cleared.
    pub async fn unregister(&mut self) -> OrchestratorResult<()> {
        match self.state.clone() {
            OrchestratorState::Unregistered => {
                tracing::debug!("not registered; nothing to unregister");
                Ok(())
            }
            OrchestratorState::Registering { .. } => {
                tracing::info!("abandoning registration cycle");
                self.scheduler.cancel_all();
                self.awaiting = None;
                self.store.clear()?;
                self.state = OrchestratorState::Unregistered;
                Ok(())
            }
            OrchestratorState::Registered { provider, token } => {
                self.begin_unregistration(provider, token, UnregisterReason::Requested)
                    .await
            }
            OrchestratorState::Unregistering { .. } => {
                self.register_after_unregister = false;
                self.unregister_reason = UnregisterReason::Requested;
                Ok(())
            }
        }
    }

    /// Forces an unregister-then-reregister cycle when registered.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the record cannot be
    /// updated.
    pub async fn invalidate(&mut self) -> OrchestratorResult<()> {
        match self.state.clone() {
            OrchestratorState::Registered { provider, token } => {
                tracing::info!(provider = %provider, "registration invalidated");
                self.begin_unregistration(provider, token, UnregisterReason::Invalidated)
                    .await
            }
            other => {
                tracing::debug!(state = %other, "nothing to invalidate");
                Ok(())
            }
        }
    }

    /// Records a new device identity and invalidates a registration made
    /// under a different one.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the record cannot be
    /// updated.
    pub async fn device_identity_changed(
        &mut self,
        fingerprint: DeviceFingerprint,
    ) -> OrchestratorResult<()> {
        self.environment.set_device_fingerprint(fingerprint);
        if self.fingerprint_mismatch() {
            self.invalidate().await
        } else {
            Ok(())
        }
    }

    /// Re-evaluates the restored state after a device reboot.
    ///
    /// An interrupted registration is resumed. A registration made under a
    /// different device identity is invalidated, and one whose provider is
    /// no longer usable is dropped and a fresh cycle started.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the record cannot be
    /// updated.
    pub async fn on_boot(&mut self) -> OrchestratorResult<()> {
        match self.state.clone() {
            OrchestratorState::Registering { .. } => self.register().await,
            OrchestratorState::Registered { provider, token } => {
                if self.fingerprint_mismatch() {
                    return self.invalidate().await;
                }
                if self.provider_usable(&provider) {
                    tracing::debug!(provider = %provider, "registration still valid after boot");
                    return Ok(());
                }
                tracing::warn!(provider = %provider, "registered provider no longer usable");
                self.unregister_reason = UnregisterReason::Invalidated;
                self.finish_unregistration(provider, token).await
            }
            OrchestratorState::Unregistered | OrchestratorState::Unregistering { .. } => Ok(()),
        }
    }

    /// Applies an outcome reported by a provider adapter.
    ///
    /// Outcomes whose ticket is not the one currently awaited are discarded.
    /// A store failure while registering is reported as a recoverable
    /// [`RegistrationError`] and retried with backoff; one while
    /// unregistering keeps the registration and reports an unregistration
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the store fails outside a
    /// registration or unregistration.
    pub async fn on_provider_result(
        &mut self,
        ticket: AttemptTicket,
        outcome: ProviderOutcome,
    ) -> OrchestratorResult<()> {
        if self.awaiting.as_ref() != Some(&ticket) {
            tracing::debug!(
                ticket = %ticket,
                outcome = outcome.as_str(),
                "discarding stale provider result"
            );
            return Ok(());
        }
        let result = match (ticket.operation(), self.state.clone()) {
            (
                AttemptOperation::Register,
                OrchestratorState::Registering {
                    candidate_index,
                    attempt_count,
                },
            ) => {
                self.awaiting = None;
                self.apply_registration_outcome(
                    ticket.provider().clone(),
                    candidate_index,
                    attempt_count,
                    outcome,
                )
                .await
            }
            (
                AttemptOperation::Unregister,
                OrchestratorState::Unregistering { provider, token },
            ) => {
                self.awaiting = None;
                match outcome {
                    ProviderOutcome::Unregistered => {
                        self.finish_unregistration(provider, token).await
                    }
                    ProviderOutcome::UnregistrationFailed(code) => {
                        let error = RegistrationError::from_code(code);
                        self.fail_unregistration(provider, token, error).await
                    }
                    ProviderOutcome::Registered(_) | ProviderOutcome::RegistrationFailed(_) => {
                        tracing::warn!(
                            provider = %provider,
                            outcome = outcome.as_str(),
                            "unexpected outcome for unregistration"
                        );
                        let error = RegistrationError::from_code(unexpected_outcome(&outcome));
                        self.fail_unregistration(provider, token, error).await
                    }
                }
            }
            (operation, state) => {
                tracing::debug!(
                    ticket = %ticket,
                    operation = operation.as_str(),
                    state = %state,
                    "discarding provider result not matching state"
                );
                Ok(())
            }
        };
        self.absorb_store_failure(result).await
    }

    /// Re-enters selection at the failed candidate when a retry timer fires.
    ///
    /// Tickets of cancelled or replaced timers are ignored. A store failure
    /// is treated like a recoverable provider error.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the store fails after the
    /// cycle has left the registering state.
    pub async fn retry_registration(&mut self, ticket: AttemptTicket) -> OrchestratorResult<()> {
        let Some(timer) = self.scheduler.take_fired(&ticket) else {
            tracing::debug!(ticket = %ticket, "discarding stale retry");
            return Ok(());
        };
        let OrchestratorState::Registering {
            candidate_index,
            attempt_count,
        } = self.state
        else {
            tracing::debug!(state = %self.state, "retry fired outside registration");
            return Ok(());
        };
        tracing::info!(
            provider = %timer.ticket().provider(),
            attempt = attempt_count.saturating_add(1),
            "retrying registration"
        );
        let result = self
            .run_selection(candidate_index, attempt_count.saturating_add(1))
            .await;
        self.absorb_store_failure(result).await
    }

    /// Forwards an incoming push message to listeners.
    pub fn deliver_message(&self, provider: ProviderName, payload: MessagePayload) {
        self.dispatcher
            .dispatch(&PushEvent::Message { provider, payload });
    }

    /// Forwards a deleted-messages notice to listeners.
    ///
    /// The count is reported as unknown for providers that do not support
    /// message counts.
    pub fn deliver_deleted_messages(&self, provider: ProviderName, count: Option<u32>) {
        let supports_count = self
            .catalog
            .find(&provider)
            .is_some_and(|(descriptor, _)| descriptor.capabilities().supports_message_count());
        let reported = count.filter(|_| supports_count);
        self.dispatcher.dispatch(&PushEvent::DeletedMessages {
            provider,
            count: reported,
        });
    }

    /// Cancels timers and retires the awaited ticket.
    pub fn shutdown(&mut self) {
        self.scheduler.cancel_all();
        self.awaiting = None;
    }

    async fn start_cycle(&mut self) -> OrchestratorResult<()> {
        self.state = OrchestratorState::Registering {
            candidate_index: 0,
            attempt_count: 0,
        };
        self.run_selection(0, 0).await
    }

    async fn run_selection(&mut self, start: usize, attempt_count: u32) -> OrchestratorResult<()> {
        let mut index = start;
        let mut attempt = attempt_count;
        loop {
            let selection = self.catalog.select(index, &self.environment);
            for (provider, err) in selection.probe_failures {
                let error = RegistrationError::non_recoverable(err.code());
                self.dispatcher
                    .dispatch(&PushEvent::RegistrationError { provider, error });
            }
            let Some(candidate) = selection.candidate else {
                return self.exhaust();
            };
            if candidate != index {
                attempt = 0;
            }
            let Some((descriptor, adapter)) = self.catalog.get(candidate) else {
                return self.exhaust();
            };
            let provider = descriptor.name().clone();
            let adapter = Arc::clone(adapter);

            self.state = OrchestratorState::Registering {
                candidate_index: candidate,
                attempt_count: attempt,
            };
            self.store.save(&RegistrationRecord::registering(
                provider.clone(),
                self.environment.device_fingerprint().clone(),
            ))?;
            let ticket = self.issue(provider.clone(), AttemptOperation::Register);
            self.awaiting = Some(ticket.clone());
            tracing::info!(provider = %provider, attempt, ticket = %ticket, "issuing registration");

            let callback = ProviderCallback::new(ticket, Arc::clone(&self.sink));
            let Err(err) = adapter.register(&self.environment, callback).await else {
                return Ok(());
            };
            tracing::warn!(provider = %provider, error = %err, "registration request failed");
            self.awaiting = None;
            let error = RegistrationError::from_code(err.code());
            match self.after_registration_failure(provider, candidate, attempt, error) {
                Some(next) => {
                    index = next;
                    attempt = 0;
                }
                None => return Ok(()),
            }
        }
    }

    async fn apply_registration_outcome(
        &mut self,
        provider: ProviderName,
        candidate: usize,
        attempt: u32,
        outcome: ProviderOutcome,
    ) -> OrchestratorResult<()> {
        let error = match outcome {
            ProviderOutcome::Registered(token) => {
                return self.complete_registration(provider, token);
            }
            ProviderOutcome::RegistrationFailed(code) => RegistrationError::from_code(code),
            ProviderOutcome::Unregistered | ProviderOutcome::UnregistrationFailed(_) => {
                tracing::warn!(
                    provider = %provider,
                    outcome = outcome.as_str(),
                    "unexpected outcome for registration"
                );
                RegistrationError::from_code(unexpected_outcome(&outcome))
            }
        };
        match self.after_registration_failure(provider, candidate, attempt, error) {
            Some(next) => self.run_selection(next, 0).await,
            None => Ok(()),
        }
    }

    /// Reports a failed attempt and decides what happens next.
    ///
    /// Returns the candidate index to continue selection from, or `None`
    /// when a retry was scheduled instead.
    fn after_registration_failure(
        &mut self,
        provider: ProviderName,
        candidate: usize,
        attempt: u32,
        error: RegistrationError,
    ) -> Option<usize> {
        let recoverable = error.is_recoverable();
        tracing::info!(
            provider = %provider,
            attempt,
            kind = %error.kind(),
            code = %error.code(),
            "registration attempt failed"
        );
        self.dispatcher.dispatch(&PushEvent::RegistrationError {
            provider: provider.clone(),
            error,
        });
        if recoverable && attempt < self.config.max_retries_per_provider() {
            let ticket = self.issue(provider, AttemptOperation::Retry);
            self.scheduler.schedule_retry(ticket, attempt);
            return None;
        }
        if recoverable {
            tracing::info!(provider = %provider, attempt, "retry budget exhausted; advancing");
        }
        Some(candidate.saturating_add(1))
    }

    fn complete_registration(
        &mut self,
        provider: ProviderName,
        token: RegistrationToken,
    ) -> OrchestratorResult<()> {
        let fingerprint = self.environment.device_fingerprint().clone();
        self.store.save(&RegistrationRecord::registered(
            provider.clone(),
            token.clone(),
            fingerprint.clone(),
        ))?;
        self.scheduler.cancel_all();
        self.recorded_fingerprint = fingerprint;
        self.state = OrchestratorState::Registered {
            provider: provider.clone(),
            token: token.clone(),
        };
        tracing::info!(provider = %provider, "registered");
        self.dispatcher
            .dispatch(&PushEvent::Registered { provider, token });
        Ok(())
    }

    fn exhaust(&mut self) -> OrchestratorResult<()> {
        self.scheduler.cancel_all();
        self.awaiting = None;
        self.state = OrchestratorState::Unregistered;
        tracing::warn!("no push provider available");
        self.dispatcher.dispatch(&PushEvent::NoAvailableProvider);
        self.store.clear()?;
        Ok(())
    }

    async fn begin_unregistration(
        &mut self,
        provider: ProviderName,
        token: RegistrationToken,
        reason: UnregisterReason,
    ) -> OrchestratorResult<()> {
        self.scheduler.cancel_all();
        self.unregister_reason = reason;
        let adapter = self
            .catalog
            .find(&provider)
            .filter(|(descriptor, _)| descriptor.capabilities().supports_unregister())
            .map(|(_, adapter)| Arc::clone(adapter));
        let Some(adapter) = adapter else {
            tracing::info!(provider = %provider, "unregistering locally");
            return self.finish_unregistration(provider, token).await;
        };

        self.state = OrchestratorState::Unregistering {
            provider: provider.clone(),
            token: token.clone(),
        };
        let ticket = self.issue(provider.clone(), AttemptOperation::Unregister);
        self.awaiting = Some(ticket.clone());
        tracing::info!(provider = %provider, ticket = %ticket, "issuing unregistration");

        let callback = ProviderCallback::new(ticket, Arc::clone(&self.sink));
        match adapter.unregister(&self.environment, callback).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(provider = %provider, error = %err, "unregistration request failed");
                self.awaiting = None;
                self.fail_unregistration(provider, token, RegistrationError::from_code(err.code()))
                    .await
            }
        }
    }

    async fn finish_unregistration(
        &mut self,
        provider: ProviderName,
        token: RegistrationToken,
    ) -> OrchestratorResult<()> {
        self.store.clear()?;
        self.awaiting = None;
        self.state = OrchestratorState::Unregistered;
        tracing::info!(provider = %provider, "unregistered");
        self.dispatcher
            .dispatch(&PushEvent::Unregistered { provider, token });

        let invalidated = self.unregister_reason == UnregisterReason::Invalidated;
        let queued = std::mem::take(&mut self.register_after_unregister);
        self.unregister_reason = UnregisterReason::Requested;
        if invalidated || queued {
            self.start_cycle().await
        } else {
            Ok(())
        }
    }

    async fn fail_unregistration(
        &mut self,
        provider: ProviderName,
        token: RegistrationToken,
        error: RegistrationError,
    ) -> OrchestratorResult<()> {
        self.dispatcher.dispatch(&PushEvent::UnregistrationError {
            provider: provider.clone(),
            error,
        });
        if self.unregister_reason == UnregisterReason::Invalidated {
            tracing::warn!(provider = %provider, "dropping invalidated registration locally");
            return self.finish_unregistration(provider, token).await;
        }
        self.register_after_unregister = false;
        self.state = OrchestratorState::Registered { provider, token };
        Ok(())
    }

    /// Feeds a store failure from an asynchronous path back into the state
    /// machine instead of leaving the cycle stalled.
    async fn absorb_store_failure(
        &mut self,
        mut result: OrchestratorResult<()>,
    ) -> OrchestratorResult<()> {
        loop {
            let err = match result {
                Err(OrchestratorError::Store(err)) => err,
                other => return other,
            };
            match self.state.clone() {
                OrchestratorState::Registering {
                    candidate_index,
                    attempt_count,
                } => {
                    let Some((descriptor, _)) = self.catalog.get(candidate_index) else {
                        return Err(err.into());
                    };
                    let provider = descriptor.name().clone();
                    tracing::warn!(
                        provider = %provider,
                        error = %err,
                        "registration store failed; treating as recoverable"
                    );
                    self.awaiting = None;
                    let error = RegistrationError::recoverable(store_failure_code());
                    result = match self.after_registration_failure(
                        provider,
                        candidate_index,
                        attempt_count,
                        error,
                    ) {
                        Some(next) => self.run_selection(next, 0).await,
                        None => return Ok(()),
                    };
                }
                OrchestratorState::Unregistering { provider, token } => {
                    tracing::warn!(
                        provider = %provider,
                        error = %err,
                        "registration store failed; keeping registration"
                    );
                    self.awaiting = None;
                    self.unregister_reason = UnregisterReason::Requested;
                    self.register_after_unregister = false;
                    self.dispatcher.dispatch(&PushEvent::UnregistrationError {
                        provider: provider.clone(),
                        error: RegistrationError::recoverable(store_failure_code()),
                    });
                    self.state = OrchestratorState::Registered { provider, token };
                    return Ok(());
                }
                OrchestratorState::Unregistered | OrchestratorState::Registered { .. } => {
                    tracing::error!(error = %err, "registration store failed");
                    return Err(err.into());
                }
            }
        }
    }

    fn issue(&mut self, provider: ProviderName, operation: AttemptOperation) -> AttemptTicket {
        self.last_token = self.last_token.next();
        AttemptTicket::new(provider, self.last_token, operation)
    }

    fn fingerprint_mismatch(&self) -> bool {
        let current = self.environment.device_fingerprint();
        !self.recorded_fingerprint.is_unknown()
            && !current.is_unknown()
            && self.recorded_fingerprint != *current
    }

    fn provider_usable(&self, provider: &ProviderName) -> bool {
        match self.catalog.probe(provider, &self.environment) {
            Some(Ok(usable)) => usable,
            Some(Err(err)) => {
                tracing::warn!(provider = %provider, error = %err, "provider probe failed");
                self.dispatcher.dispatch(&PushEvent::RegistrationError {
                    provider: provider.clone(),
                    error: RegistrationError::non_recoverable(err.code()),
                });
                false
            }
            None => false,
        }
    }
}

fn store_failure_code() -> ProviderErrorCode {
    ProviderErrorCode::Unknown("STORE_UNAVAILABLE".to_owned())
}

fn unexpected_outcome(outcome: &ProviderOutcome) -> ProviderErrorCode {
    ProviderErrorCode::Unknown(format!("unexpected_{}", outcome.as_str()))
}

fn load_record<S: RegistrationStore>(store: &S) -> OrchestratorResult<RegistrationRecord> {
    match store.load() {
        Ok(record) => Ok(record),
        Err(StoreError::InvalidPersistedData(err)) => {
            tracing::warn!(error = %err, "discarding unreadable registration record");
            store.clear()?;
            Ok(RegistrationRecord::default())
        }
        Err(err) => Err(err.into()),
    }
}

fn clear_stale<S: RegistrationStore>(
    store: &S,
    provider: &ProviderName,
) -> OrchestratorResult<OrchestratorState> {
    tracing::warn!(provider = %provider, "stored provider is no longer configured; clearing");
    store.clear()?;
    Ok(OrchestratorState::Unregistered)
}
