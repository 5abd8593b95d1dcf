//! Structured logging setup for hosts embedding the crate.
//!
//! The library itself only emits `tracing` events; hosts that do not bring
//! their own subscriber can install a console one with [`init_tracing`].

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_ENV: &str = "OPENPUSH_LOG";

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter directive: {0}")]
    InvalidDirective(#[from] tracing_subscriber::filter::ParseError),
    /// A global subscriber is already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs a console subscriber filtered by `OPENPUSH_LOG`.
///
/// Falls back to `default_directive` (for example `"openpush=info"`) when
/// the variable is unset or blank.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidDirective`] for an unparsable filter and
/// [`LoggingError::AlreadyInstalled`] when a global subscriber exists.
pub fn init_tracing(default_directive: &str) -> Result<(), LoggingError> {
    let directive = select_directive(std::env::var(LOG_FILTER_ENV).ok(), default_directive);
    let filter = EnvFilter::try_new(&directive)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .try_init()?;
    tracing::debug!(filter = %directive, "tracing initialized");
    Ok(())
}

fn select_directive(configured: Option<String>, default_directive: &str) -> String {
    configured
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_directive.to_owned())
}
