//! Domain model for push provider registration.
//!
//! Provider identity, the persisted registration record, the orchestrator
//! state machine's states, and the events and errors surfaced to the host.
//! All infrastructure concerns are kept outside the domain boundary.

mod capabilities;
mod descriptor;
mod environment;
mod error;
mod event;
mod fingerprint;
mod name;
mod record;
mod state;
mod token;

pub use capabilities::ProviderCapabilities;
pub use descriptor::ProviderDescriptor;
pub use environment::PushEnvironment;
pub use error::{
    ProviderErrorCode, RegistrationDomainError, RegistrationError, RegistrationErrorKind,
};
pub use event::{MessagePayload, PushEvent};
pub use fingerprint::DeviceFingerprint;
pub use name::ProviderName;
pub use record::{PersistedRecord, RecordEntry, RegistrationRecord};
pub use state::OrchestratorState;
pub use token::{AttemptOperation, AttemptTicket, AttemptToken, RegistrationToken};
