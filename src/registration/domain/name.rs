//! Validated provider name type.

use super::RegistrationDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a provider name.
const MAX_NAME_LENGTH: usize = 100;

/// Stable identifier of a push provider (e.g. `gcm`, `com.amazon.adm`).
///
/// The name is persisted as the registered provider, so it is kept exactly
/// as configured apart from surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderName(String);

impl ProviderName {
    /// Creates a validated provider name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationDomainError::EmptyProviderName`] when the value
    /// is empty after trimming, or
    /// [`RegistrationDomainError::ProviderNameTooLong`] when it exceeds 100
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistrationDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(RegistrationDomainError::EmptyProviderName);
        }

        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(RegistrationDomainError::ProviderNameTooLong(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the provider name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProviderName {
    type Error = RegistrationDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderName> for String {
    fn from(value: ProviderName) -> Self {
        value.0
    }
}

impl AsRef<str> for ProviderName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
