//! Services orchestrating push provider registration.

pub mod backoff;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod orchestrator;
pub mod runtime;

pub use backoff::{BackoffConfig, BackoffPolicy, BackoffScheduler, BackoffTimer, RetryFn};
pub use catalog::{ProviderCatalog, Selection};
pub use config::OrchestratorConfig;
pub use dispatcher::EventDispatcher;
pub use orchestrator::{
    OrchestratorError, OrchestratorParts, OrchestratorResult, RegistrationOrchestrator,
};
pub use runtime::{PushHandle, PushRuntime};
