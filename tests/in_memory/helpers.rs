//! Shared helpers for runtime integration tests.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use openpush::registration::{
    adapters::{InMemoryRegistrationStore, ScriptedProvider},
    domain::{
        DeviceFingerprint, MessagePayload, ProviderName, PushEnvironment, PushEvent,
        RegistrationError, RegistrationToken,
    },
    ports::{EventListener, ProviderAdapter},
    services::{
        BackoffConfig, EventDispatcher, OrchestratorConfig, OrchestratorParts, ProviderCatalog,
        PushRuntime,
    },
};
use tokio::sync::mpsc;

/// Device identity used unless a test overrides it.
pub const DEVICE: &str = "device-1";

/// Upper bound on waiting for any single event.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Parses a provider name.
pub fn name(raw: &str) -> ProviderName {
    ProviderName::new(raw).expect("valid provider name")
}

/// Parses a registration token.
pub fn token(raw: &str) -> RegistrationToken {
    RegistrationToken::new(raw).expect("valid registration token")
}

/// Builds scripted providers in priority order.
pub fn providers(names: &[&str]) -> Vec<Arc<ScriptedProvider>> {
    names
        .iter()
        .map(|raw| Arc::new(ScriptedProvider::new(name(raw))))
        .collect()
}

/// Listener forwarding every event onto a channel.
pub struct ChannelListener {
    events: mpsc::UnboundedSender<PushEvent>,
}

impl ChannelListener {
    fn forward(&self, event: PushEvent) {
        self.events.send(event).ok();
    }
}

impl EventListener for ChannelListener {
    fn on_message(&self, provider: &ProviderName, payload: &MessagePayload) {
        self.forward(PushEvent::Message {
            provider: provider.clone(),
            payload: payload.clone(),
        });
    }

    fn on_deleted_messages(&self, provider: &ProviderName, count: Option<u32>) {
        self.forward(PushEvent::DeletedMessages {
            provider: provider.clone(),
            count,
        });
    }

    fn on_registered(&self, provider: &ProviderName, token: &RegistrationToken) {
        self.forward(PushEvent::Registered {
            provider: provider.clone(),
            token: token.clone(),
        });
    }

    fn on_unregistered(&self, provider: &ProviderName, token: &RegistrationToken) {
        self.forward(PushEvent::Unregistered {
            provider: provider.clone(),
            token: token.clone(),
        });
    }

    fn on_registration_error(&self, provider: &ProviderName, error: &RegistrationError) {
        self.forward(PushEvent::RegistrationError {
            provider: provider.clone(),
            error: error.clone(),
        });
    }

    fn on_unregistration_error(&self, provider: &ProviderName, error: &RegistrationError) {
        self.forward(PushEvent::UnregistrationError {
            provider: provider.clone(),
            error: error.clone(),
        });
    }

    fn on_no_available_provider(&self) {
        self.forward(PushEvent::NoAvailableProvider);
    }
}

/// Creates a channel listener and the receiving end of its events.
pub fn channel_listener() -> (Arc<ChannelListener>, mpsc::UnboundedReceiver<PushEvent>) {
    let (events, received) = mpsc::unbounded_channel();
    (Arc::new(ChannelListener { events }), received)
}

/// Waits for the next event.
pub async fn next_event(events: &mut mpsc::UnboundedReceiver<PushEvent>) -> PushEvent {
    tokio::time::timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("event should arrive before timeout")
        .expect("event channel should stay open")
}

/// Running runtime plus the pieces tests inspect.
pub struct TestRuntime {
    /// The runtime under test.
    pub runtime: PushRuntime,
    /// Shared handle to the store the runtime persists into.
    pub store: InMemoryRegistrationStore,
    /// Scripted providers in priority order.
    pub providers: Vec<Arc<ScriptedProvider>>,
    /// Events dispatched by the runtime.
    pub events: mpsc::UnboundedReceiver<PushEvent>,
}

impl TestRuntime {
    /// Returns the provider at `index`.
    pub fn provider(&self, index: usize) -> &ScriptedProvider {
        self.providers.get(index).expect("provider index in range")
    }
}

/// Starts a runtime with fast backoff over the given providers and store.
pub fn start(
    providers: Vec<Arc<ScriptedProvider>>,
    store: InMemoryRegistrationStore,
) -> TestRuntime {
    let adapters = providers
        .iter()
        .map(|provider| Arc::clone(provider) as Arc<dyn ProviderAdapter>)
        .collect();
    let (listener, events) = channel_listener();
    let dispatcher = EventDispatcher::new();
    dispatcher.add_listener(listener);
    let parts = OrchestratorParts {
        config: OrchestratorConfig::new()
            .with_backoff(BackoffConfig::new(
                Duration::from_millis(10),
                Duration::from_millis(100),
            ))
            .with_max_retries_per_provider(3),
        catalog: ProviderCatalog::new(adapters).expect("unique provider names"),
        environment: PushEnvironment::new(DeviceFingerprint::new(DEVICE))
            .with_setting("sender_id", "1234"),
        store: Arc::new(store.clone()),
        clock: Arc::new(DefaultClock),
        dispatcher,
    };
    let runtime = PushRuntime::start(parts).expect("runtime starts");
    TestRuntime {
        runtime,
        store,
        providers,
        events,
    }
}
