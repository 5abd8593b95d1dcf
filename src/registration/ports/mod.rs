//! Port contracts for push provider registration.
//!
//! Ports define infrastructure-agnostic interfaces consumed or exposed by
//! the registration services.

pub mod listener;
pub mod provider;
pub mod store;

pub use listener::EventListener;
pub use provider::{
    ProviderAdapter, ProviderAdapterError, ProviderAdapterResult, ProviderCallback,
    ProviderOutcome, ResultSink,
};
pub use store::{RegistrationStore, StoreError, StoreResult};
