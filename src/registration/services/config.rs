//! Orchestrator configuration.

use super::backoff::BackoffConfig;

/// Tuning for the registration orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    backoff: BackoffConfig,
    max_retries_per_provider: u32,
}

impl OrchestratorConfig {
    /// Default number of backoff retries against one provider.
    pub const DEFAULT_MAX_RETRIES_PER_PROVIDER: u32 = 5;

    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backoff tuning.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets how many recoverable failures a provider may retry before the
    /// next candidate is tried.
    #[must_use]
    pub const fn with_max_retries_per_provider(mut self, max_retries: u32) -> Self {
        self.max_retries_per_provider = max_retries;
        self
    }

    /// Backoff tuning.
    #[must_use]
    pub const fn backoff(&self) -> &BackoffConfig {
        &self.backoff
    }

    /// Retry budget per provider.
    #[must_use]
    pub const fn max_retries_per_provider(&self) -> u32 {
        self.max_retries_per_provider
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffConfig::default(),
            max_retries_per_provider: Self::DEFAULT_MAX_RETRIES_PER_PROVIDER,
        }
    }
}
