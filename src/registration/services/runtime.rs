//! Single-worker runtime serializing every orchestrator entry point.
//!
//! Host calls, adapter outcomes and fired retry timers are all turned into
//! [`Command`]s on one channel. A single task owns the orchestrator and
//! applies commands in arrival order, so state transitions never overlap.

use std::sync::Arc;

use mockable::Clock;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::registration::{
    domain::{AttemptTicket, DeviceFingerprint, MessagePayload, OrchestratorState, ProviderName},
    ports::{EventListener, ProviderOutcome, RegistrationStore, ResultSink},
};

use super::{
    backoff::RetryFn,
    dispatcher::EventDispatcher,
    orchestrator::{
        OrchestratorError, OrchestratorParts, OrchestratorResult, RegistrationOrchestrator,
    },
};

type Reply<T> = oneshot::Sender<OrchestratorResult<T>>;

/// Work item processed by the runtime worker.
enum Command {
    Register(Reply<()>),
    Unregister(Reply<()>),
    Invalidate(Reply<()>),
    DeviceIdentityChanged(DeviceFingerprint, Reply<()>),
    BootCompleted(Reply<()>),
    State(Reply<OrchestratorState>),
    Message(ProviderName, MessagePayload),
    DeletedMessages(ProviderName, Option<u32>),
    ProviderResult(AttemptTicket, ProviderOutcome),
    Retry(AttemptTicket),
    Shutdown,
}

/// Routes adapter outcomes onto the worker channel.
///
/// Holds a weak sender so outstanding adapter callbacks do not keep the
/// worker alive once every [`PushHandle`] is gone.
struct ChannelSink {
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl ResultSink for ChannelSink {
    fn deliver(&self, ticket: AttemptTicket, outcome: ProviderOutcome) {
        let delivered = self
            .commands
            .upgrade()
            .is_some_and(|tx| tx.send(Command::ProviderResult(ticket, outcome)).is_ok());
        if !delivered {
            tracing::debug!("push runtime stopped; dropping provider result");
        }
    }
}

/// Owner of the orchestrator worker task.
pub struct PushRuntime {
    handle: PushHandle,
    worker: JoinHandle<()>,
}

impl PushRuntime {
    /// Builds the orchestrator from `parts` and spawns its worker.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] when the persisted state cannot
    /// be restored.
    pub fn start<S, C>(parts: OrchestratorParts<S, C>) -> OrchestratorResult<Self>
    where
        S: RegistrationStore + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn ResultSink> = Arc::new(ChannelSink {
            commands: tx.downgrade(),
        });
        let retry_tx = tx.downgrade();
        let on_retry: RetryFn = Arc::new(move |ticket| {
            let delivered = retry_tx
                .upgrade()
                .is_some_and(|commands| commands.send(Command::Retry(ticket)).is_ok());
            if !delivered {
                tracing::debug!("push runtime stopped; dropping retry");
            }
        });
        let dispatcher = parts.dispatcher.clone();
        let orchestrator = RegistrationOrchestrator::new(parts, sink, on_retry)?;
        let worker = tokio::spawn(run_worker(orchestrator, rx));
        tracing::info!("push runtime started");
        Ok(Self {
            handle: PushHandle {
                commands: tx,
                dispatcher,
            },
            worker,
        })
    }

    /// Returns a handle for host entry points.
    #[must_use]
    pub fn handle(&self) -> PushHandle {
        self.handle.clone()
    }

    /// Stops the worker and cancels pending retries.
    ///
    /// Commands queued before the call are still applied.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the worker had already
    /// terminated abnormally.
    pub async fn shutdown(self) -> OrchestratorResult<()> {
        if self.handle.commands.send(Command::Shutdown).is_err() {
            tracing::debug!("push runtime already stopped");
        }
        self.worker.await.map_err(|err| {
            tracing::error!(error = %err, "push runtime worker failed");
            OrchestratorError::Stopped
        })
    }
}

/// Cloneable entry point into a running [`PushRuntime`].
///
/// Inject one into each host entry point (application code, reboot and
/// message receivers); all of them reach the same orchestrator.
#[derive(Clone)]
pub struct PushHandle {
    commands: mpsc::UnboundedSender<Command>,
    dispatcher: EventDispatcher,
}

impl PushHandle {
    /// Requests a registration.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the runtime has shut down,
    /// or the error the orchestrator reported.
    pub async fn register(&self) -> OrchestratorResult<()> {
        self.request(Command::Register).await
    }

    /// Requests removal of the registration.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the runtime has shut down,
    /// or the error the orchestrator reported.
    pub async fn unregister(&self) -> OrchestratorResult<()> {
        self.request(Command::Unregister).await
    }

    /// Forces an unregister-then-reregister cycle.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the runtime has shut down,
    /// or the error the orchestrator reported.
    pub async fn invalidate(&self) -> OrchestratorResult<()> {
        self.request(Command::Invalidate).await
    }

    /// Signals that the device identity changed.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the runtime has shut down,
    /// or the error the orchestrator reported.
    pub async fn device_identity_changed(
        &self,
        fingerprint: DeviceFingerprint,
    ) -> OrchestratorResult<()> {
        self.request(|reply| Command::DeviceIdentityChanged(fingerprint, reply))
            .await
    }

    /// Signals that the device finished booting.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the runtime has shut down,
    /// or the error the orchestrator reported.
    pub async fn boot_completed(&self) -> OrchestratorResult<()> {
        self.request(Command::BootCompleted).await
    }

    /// Returns the orchestrator state after all earlier commands applied.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the runtime has shut down.
    pub async fn state(&self) -> OrchestratorResult<OrchestratorState> {
        self.request(Command::State).await
    }

    /// Forwards an incoming push message to listeners.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the runtime has shut down.
    pub fn deliver_message(
        &self,
        provider: ProviderName,
        payload: MessagePayload,
    ) -> OrchestratorResult<()> {
        self.send(Command::Message(provider, payload))
    }

    /// Forwards a deleted-messages notice to listeners.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Stopped`] when the runtime has shut down.
    pub fn deliver_deleted_messages(
        &self,
        provider: ProviderName,
        count: Option<u32>,
    ) -> OrchestratorResult<()> {
        self.send(Command::DeletedMessages(provider, count))
    }

    /// Appends a listener.
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        self.dispatcher.add_listener(listener);
    }

    /// Removes a listener; returns `true` when it was registered.
    pub fn remove_listener(&self, listener: &Arc<dyn EventListener>) -> bool {
        self.dispatcher.remove_listener(listener)
    }

    fn send(&self, command: Command) -> OrchestratorResult<()> {
        self.commands
            .send(command)
            .map_err(|_| OrchestratorError::Stopped)
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> OrchestratorResult<T> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply))?;
        response.await.map_err(|_| OrchestratorError::Stopped)?
    }
}

impl std::fmt::Debug for PushHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushHandle")
            .field("closed", &self.commands.is_closed())
            .finish_non_exhaustive()
    }
}

async fn run_worker<S, C>(
    mut orchestrator: RegistrationOrchestrator<S, C>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) where
    S: RegistrationStore,
    C: Clock + Send + Sync,
{
    while let Some(command) = commands.recv().await {
        match command {
            Command::Shutdown => break,
            Command::Register(reply) => respond(reply, orchestrator.register().await),
            Command::Unregister(reply) => respond(reply, orchestrator.unregister().await),
            Command::Invalidate(reply) => respond(reply, orchestrator.invalidate().await),
            Command::DeviceIdentityChanged(fingerprint, reply) => respond(
                reply,
                orchestrator.device_identity_changed(fingerprint).await,
            ),
            Command::BootCompleted(reply) => respond(reply, orchestrator.on_boot().await),
            Command::State(reply) => respond(reply, Ok(orchestrator.state().clone())),
            Command::Message(provider, payload) => {
                orchestrator.deliver_message(provider, payload);
            }
            Command::DeletedMessages(provider, count) => {
                orchestrator.deliver_deleted_messages(provider, count);
            }
            Command::ProviderResult(ticket, outcome) => {
                if let Err(err) = orchestrator.on_provider_result(ticket, outcome).await {
                    tracing::error!(error = %err, "failed to apply provider result");
                }
            }
            Command::Retry(ticket) => {
                if let Err(err) = orchestrator.retry_registration(ticket).await {
                    tracing::error!(error = %err, "failed to retry registration");
                }
            }
        }
    }
    orchestrator.shutdown();
    tracing::info!("push runtime stopped");
}

fn respond<T>(reply: Reply<T>, result: OrchestratorResult<T>) {
    if let Err(Err(err)) = reply.send(result) {
        tracing::warn!(error = %err, "caller went away before receiving error");
    }
}
