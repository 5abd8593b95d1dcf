//! Immutable identity of one configured provider candidate.

use super::{ProviderCapabilities, ProviderName};

/// A provider as it appears in the priority-ordered candidate list.
///
/// `priority` is the position in the configured list; `0` is tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    name: ProviderName,
    priority: usize,
    capabilities: ProviderCapabilities,
}

impl ProviderDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(
        name: ProviderName,
        priority: usize,
        capabilities: ProviderCapabilities,
    ) -> Self {
        Self {
            name,
            priority,
            capabilities,
        }
    }

    /// Returns the provider name.
    #[must_use]
    pub const fn name(&self) -> &ProviderName {
        &self.name
    }

    /// Returns the ordinal priority.
    #[must_use]
    pub const fn priority(&self) -> usize {
        self.priority
    }

    /// Returns the declared capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }
}
