//! Openpush: push-notification provider selection and registration.
//!
//! An application configures a priority-ordered list of push backends. The
//! crate picks the first usable one, registers with it, retries transient
//! failures with exponential backoff, survives restarts through a persisted
//! registration record, and reports lifecycle events to listeners no matter
//! which backend is active.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (stores, providers)
//! - **Services**: The registration state machine and its runtime
//!
//! # Modules
//!
//! - [`registration`]: Provider selection, registration lifecycle and events
//! - [`logging`]: Optional `tracing` subscriber setup

pub mod logging;
pub mod registration;
