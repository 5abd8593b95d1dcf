//! Persistent state store port.

use crate::registration::domain::RegistrationRecord;
use std::sync::Arc;
use thiserror::Error;

/// Result type for registration store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable mirror of the single registration record.
///
/// Calls are blocking and only made from the orchestrator's serialized
/// section. `save` replaces the whole record atomically: an interrupted save
/// leaves either the previous record or the new one.
#[cfg_attr(test, mockall::automock)]
pub trait RegistrationStore: Send + Sync {
    /// Loads the record, returning an empty one when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPersistedData`] when the stored record
    /// cannot be decoded, or [`StoreError::Persistence`] on storage failure.
    fn load(&self) -> StoreResult<RegistrationRecord>;

    /// Atomically replaces the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] on storage failure.
    fn save(&self, record: &RegistrationRecord) -> StoreResult<()>;

    /// Removes the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] on storage failure.
    fn clear(&self) -> StoreResult<()>;
}

/// Errors returned by registration store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted registration record: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a data-quality or deserialization error from persisted data.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
