//! Orchestrator lifecycle state.

use super::{ProviderName, RegistrationToken};
use std::fmt;

/// Registration lifecycle state owned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    /// No registration exists or is being attempted.
    #[default]
    Unregistered,
    /// A registration cycle is in progress.
    Registering {
        /// Position of the current candidate in the priority list.
        candidate_index: usize,
        /// Number of backoff retries already spent on this candidate.
        attempt_count: u32,
    },
    /// A provider issued a token.
    Registered {
        /// Active provider.
        provider: ProviderName,
        /// Token issued by the provider.
        token: RegistrationToken,
    },
    /// Removal of the active registration is in progress.
    Unregistering {
        /// Provider being unregistered.
        provider: ProviderName,
        /// Token being removed.
        token: RegistrationToken,
    },
}

impl OrchestratorState {
    /// Returns the canonical state label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Registering { .. } => "registering",
            Self::Registered { .. } => "registered",
            Self::Unregistering { .. } => "unregistering",
        }
    }

    /// Returns whether a provider currently holds a registration.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    /// Returns whether a registration cycle is in progress.
    #[must_use]
    pub const fn is_registering(&self) -> bool {
        matches!(self, Self::Registering { .. })
    }

    /// Returns the registered provider and token, if any.
    #[must_use]
    pub const fn registration(&self) -> Option<(&ProviderName, &RegistrationToken)> {
        match self {
            Self::Registered { provider, token } => Some((provider, token)),
            Self::Unregistered | Self::Registering { .. } | Self::Unregistering { .. } => None,
        }
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registering {
                candidate_index,
                attempt_count,
            } => write!(
                f,
                "registering(candidate={candidate_index}, attempt={attempt_count})"
            ),
            Self::Registered { provider, .. } => write!(f, "registered({provider})"),
            Self::Unregistering { provider, .. } => write!(f, "unregistering({provider})"),
            Self::Unregistered => f.write_str(self.as_str()),
        }
    }
}
