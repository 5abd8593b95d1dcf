//! Error types for the registration domain.

use std::fmt;
use thiserror::Error;

use super::ProviderName;

/// Errors returned while constructing registration domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationDomainError {
    /// The provider name is empty after trimming.
    #[error("provider name must not be empty")]
    EmptyProviderName,

    /// The provider name exceeds the 100-character limit.
    #[error("provider name exceeds 100 character limit: {0}")]
    ProviderNameTooLong(String),

    /// The registration token is empty after trimming.
    #[error("registration token must not be empty")]
    EmptyRegistrationToken,

    /// The same provider appears twice in the candidate list.
    #[error("provider '{0}' is configured more than once")]
    DuplicateProvider(ProviderName),

    /// A persisted record carries a token but no provider name.
    #[error("registration record has a token but no provider name")]
    TokenWithoutProvider,
}

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationErrorKind {
    /// Transient failure; retried with backoff against the same provider.
    Recoverable,
    /// Permanent failure; the provider is skipped for the rest of the cycle.
    NonRecoverable,
    /// No configured provider could be used.
    NoProviderAvailable,
}

impl RegistrationErrorKind {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::NonRecoverable => "non_recoverable",
            Self::NoProviderAvailable => "no_provider_available",
        }
    }
}

impl fmt::Display for RegistrationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-specific reason code attached to a failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The provider service could not be reached.
    ServiceNotAvailable,
    /// The request parameters were rejected.
    InvalidParameters,
    /// The sender identity is not valid for this application.
    InvalidSender,
    /// The provider refused the application credentials.
    AuthenticationFailed,
    /// A code this crate does not recognise.
    Unknown(String),
}

impl ProviderErrorCode {
    /// Parses a vendor error identifier.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unrecognised identifiers are kept verbatim as [`Self::Unknown`].
    #[must_use]
    pub fn from_vendor(code: &str) -> Self {
        let normalized = code.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "SERVICE_NOT_AVAILABLE" => Self::ServiceNotAvailable,
            "INVALID_PARAMETERS" => Self::InvalidParameters,
            "INVALID_SENDER" => Self::InvalidSender,
            "AUTHENTICATION_FAILED" => Self::AuthenticationFailed,
            _ => Self::Unknown(code.trim().to_owned()),
        }
    }

    /// Returns how a failure carrying this code is handled.
    ///
    /// Unknown codes are recoverable so they are retried rather than
    /// dropped.
    #[must_use]
    pub const fn kind(&self) -> RegistrationErrorKind {
        match self {
            Self::ServiceNotAvailable | Self::Unknown(_) => RegistrationErrorKind::Recoverable,
            Self::InvalidParameters | Self::InvalidSender | Self::AuthenticationFailed => {
                RegistrationErrorKind::NonRecoverable
            }
        }
    }

    /// Returns the canonical identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ServiceNotAvailable => "SERVICE_NOT_AVAILABLE",
            Self::InvalidParameters => "INVALID_PARAMETERS",
            Self::InvalidSender => "INVALID_SENDER",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a failed registration or unregistration attempt.
///
/// Forwarded to listeners; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationError {
    kind: RegistrationErrorKind,
    code: ProviderErrorCode,
}

impl RegistrationError {
    /// Creates an error with an explicit kind.
    #[must_use]
    pub const fn new(kind: RegistrationErrorKind, code: ProviderErrorCode) -> Self {
        Self { kind, code }
    }

    /// Creates an error classified from its code.
    #[must_use]
    pub const fn from_code(code: ProviderErrorCode) -> Self {
        Self {
            kind: code.kind(),
            code,
        }
    }

    /// Creates a recoverable error.
    #[must_use]
    pub const fn recoverable(code: ProviderErrorCode) -> Self {
        Self::new(RegistrationErrorKind::Recoverable, code)
    }

    /// Creates a non-recoverable error.
    #[must_use]
    pub const fn non_recoverable(code: ProviderErrorCode) -> Self {
        Self::new(RegistrationErrorKind::NonRecoverable, code)
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> RegistrationErrorKind {
        self.kind
    }

    /// Returns the provider-specific reason code.
    #[must_use]
    pub const fn code(&self) -> &ProviderErrorCode {
        &self.code
    }

    /// Returns whether the attempt may be retried with backoff.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self.kind, RegistrationErrorKind::Recoverable)
    }
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.kind)
    }
}
