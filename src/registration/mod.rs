//! Push provider registration.
//!
//! A [`services::RegistrationOrchestrator`] drives registration against the
//! providers of a [`services::ProviderCatalog`], persisting the outcome
//! through a [`ports::RegistrationStore`] and announcing lifecycle events to
//! [`ports::EventListener`]s. Hosts normally run it inside a
//! [`services::PushRuntime`] and talk to it through a
//! [`services::PushHandle`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
