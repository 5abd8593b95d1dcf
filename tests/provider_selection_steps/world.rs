//! Shared world state for provider selection BDD scenarios.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use eyre::WrapErr;
use mockable::DefaultClock;
use openpush::registration::{
    adapters::{InMemoryRegistrationStore, ScriptedProvider},
    domain::{
        DeviceFingerprint, MessagePayload, OrchestratorState, ProviderName, PushEnvironment,
        PushEvent, RegistrationError, RegistrationToken,
    },
    ports::{EventListener, ProviderAdapter},
    services::{
        BackoffConfig, EventDispatcher, OrchestratorConfig, OrchestratorParts, ProviderCatalog,
        PushHandle, PushRuntime,
    },
};
use rstest::fixture;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Events dispatched during a scenario.
pub type EventLog = Arc<Mutex<Vec<PushEvent>>>;

/// Listener appending every event to an [`EventLog`].
pub struct LoggingListener {
    log: EventLog,
}

impl LoggingListener {
    fn push(&self, event: PushEvent) {
        if let Ok(mut events) = self.log.lock() {
            events.push(event);
        }
    }
}

impl EventListener for LoggingListener {
    fn on_message(&self, provider: &ProviderName, payload: &MessagePayload) {
        self.push(PushEvent::Message {
            provider: provider.clone(),
            payload: payload.clone(),
        });
    }

    fn on_deleted_messages(&self, provider: &ProviderName, count: Option<u32>) {
        self.push(PushEvent::DeletedMessages {
            provider: provider.clone(),
            count,
        });
    }

    fn on_registered(&self, provider: &ProviderName, token: &RegistrationToken) {
        self.push(PushEvent::Registered {
            provider: provider.clone(),
            token: token.clone(),
        });
    }

    fn on_unregistered(&self, provider: &ProviderName, token: &RegistrationToken) {
        self.push(PushEvent::Unregistered {
            provider: provider.clone(),
            token: token.clone(),
        });
    }

    fn on_registration_error(&self, provider: &ProviderName, error: &RegistrationError) {
        self.push(PushEvent::RegistrationError {
            provider: provider.clone(),
            error: error.clone(),
        });
    }

    fn on_unregistration_error(&self, provider: &ProviderName, error: &RegistrationError) {
        self.push(PushEvent::UnregistrationError {
            provider: provider.clone(),
            error: error.clone(),
        });
    }

    fn on_no_available_provider(&self) {
        self.push(PushEvent::NoAvailableProvider);
    }
}

/// Scenario world for provider selection behaviour tests.
pub struct SelectionWorld {
    /// Running runtime, started once providers are configured.
    pub runtime: Option<PushRuntime>,
    /// Scripted providers in priority order.
    pub providers: Vec<Arc<ScriptedProvider>>,
    /// Events dispatched so far.
    pub events: EventLog,
}

impl SelectionWorld {
    /// Creates a world with no providers configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            runtime: None,
            providers: Vec::new(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configures providers and starts the runtime.
    pub fn start(&mut self, names: &[String]) -> Result<(), eyre::Report> {
        let mut providers = Vec::with_capacity(names.len());
        for raw in names {
            providers.push(Arc::new(ScriptedProvider::new(ProviderName::new(raw.as_str())?)));
        }
        let adapters = providers
            .iter()
            .map(|provider| Arc::clone(provider) as Arc<dyn ProviderAdapter>)
            .collect();
        let dispatcher = EventDispatcher::new();
        dispatcher.add_listener(Arc::new(LoggingListener {
            log: Arc::clone(&self.events),
        }));
        let parts = OrchestratorParts {
            config: OrchestratorConfig::new().with_backoff(BackoffConfig::new(
                Duration::from_millis(5),
                Duration::from_millis(50),
            )),
            catalog: ProviderCatalog::new(adapters)?,
            environment: PushEnvironment::new(DeviceFingerprint::new("device-1")),
            store: Arc::new(InMemoryRegistrationStore::new()),
            clock: Arc::new(DefaultClock),
            dispatcher,
        };
        self.runtime = Some(PushRuntime::start(parts)?);
        self.providers = providers;
        Ok(())
    }

    /// Returns a handle to the running runtime.
    pub fn handle(&self) -> Result<PushHandle, eyre::Report> {
        self.runtime
            .as_ref()
            .map(PushRuntime::handle)
            .ok_or_else(|| eyre::eyre!("runtime has not been started"))
    }

    /// Returns the provider called `name`.
    pub fn provider(&self, name: &str) -> Result<&ScriptedProvider, eyre::Report> {
        self.providers
            .iter()
            .find(|provider| provider.name().as_str() == name)
            .map(AsRef::as_ref)
            .ok_or_else(|| eyre::eyre!("provider '{name}' is not configured"))
    }

    /// Waits until no registration or unregistration is in progress and
    /// returns the resulting state.
    pub fn settle(&self) -> Result<OrchestratorState, eyre::Report> {
        let handle = self.handle()?;
        let state = run_async(tokio::time::timeout(SETTLE_TIMEOUT, async {
            loop {
                match handle.state().await {
                    Ok(
                        OrchestratorState::Registering { .. }
                        | OrchestratorState::Unregistering { .. },
                    ) => tokio::time::sleep(Duration::from_millis(5)).await,
                    other => return other,
                }
            }
        }))
        .wrap_err("orchestrator did not settle in time")?
        .wrap_err("state query failed")?;
        Ok(state)
    }

    /// Returns a copy of the events dispatched so far.
    pub fn events(&self) -> Result<Vec<PushEvent>, eyre::Report> {
        self.events
            .lock()
            .map(|events| events.clone())
            .map_err(|err| eyre::eyre!("event log poisoned: {err}"))
    }
}

impl Default for SelectionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SelectionWorld {
    SelectionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a registration token.
pub fn parse_token(raw: &str) -> Result<RegistrationToken, eyre::Report> {
    Ok(RegistrationToken::new(raw)?)
}
