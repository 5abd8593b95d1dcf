//! Provider capability flags.

use serde::{Deserialize, Serialize};

/// Optional features a push provider declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    supports_unregister: bool,
    supports_message_count: bool,
}

impl ProviderCapabilities {
    /// Creates capabilities from the two flags.
    #[must_use]
    pub const fn new(supports_unregister: bool, supports_message_count: bool) -> Self {
        Self {
            supports_unregister,
            supports_message_count,
        }
    }

    /// Returns whether the provider can remove a registration remotely.
    ///
    /// Providers without this capability are unregistered locally only.
    #[must_use]
    pub const fn supports_unregister(&self) -> bool {
        self.supports_unregister
    }

    /// Returns whether the provider reports a count of deleted messages.
    #[must_use]
    pub const fn supports_message_count(&self) -> bool {
        self.supports_message_count
    }
}
