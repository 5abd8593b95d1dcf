//! Registration tokens and attempt tickets.

use super::{ProviderName, RegistrationDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier a provider issues for this installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistrationToken(String);

impl RegistrationToken {
    /// Creates a registration token.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationDomainError::EmptyRegistrationToken`] when the
    /// value is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistrationDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RegistrationDomainError::EmptyRegistrationToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RegistrationToken {
    type Error = RegistrationDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegistrationToken> for String {
    fn from(value: RegistrationToken) -> Self {
        value.0
    }
}

impl fmt::Display for RegistrationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonically increasing counter distinguishing successive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AttemptToken(u64);

impl AttemptToken {
    /// Wraps a raw counter value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the following token.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an attempt ticket was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptOperation {
    /// A registration request sent to an adapter.
    Register,
    /// An unregistration request sent to an adapter.
    Unregister,
    /// A deferred backoff retry.
    Retry,
}

impl AttemptOperation {
    /// Returns a short label for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Unregister => "unregister",
            Self::Retry => "retry",
        }
    }
}

impl fmt::Display for AttemptOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof that an asynchronous result belongs to a specific attempt.
///
/// Every adapter callback and backoff timer carries the ticket it was issued
/// with. A ticket that no longer matches the orchestrator's outstanding
/// ticket is stale and its result is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptTicket {
    provider: ProviderName,
    token: AttemptToken,
    operation: AttemptOperation,
}

impl AttemptTicket {
    /// Creates a ticket.
    #[must_use]
    pub const fn new(
        provider: ProviderName,
        token: AttemptToken,
        operation: AttemptOperation,
    ) -> Self {
        Self {
            provider,
            token,
            operation,
        }
    }

    /// Returns the provider the attempt targets.
    #[must_use]
    pub const fn provider(&self) -> &ProviderName {
        &self.provider
    }

    /// Returns the attempt token.
    #[must_use]
    pub const fn token(&self) -> AttemptToken {
        self.token
    }

    /// Returns the operation the ticket was issued for.
    #[must_use]
    pub const fn operation(&self) -> AttemptOperation {
        self.operation
    }
}

impl fmt::Display for AttemptTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.operation, self.provider, self.token)
    }
}
