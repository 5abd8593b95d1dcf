//! In-memory registration store for tests and ephemeral hosts.

use std::sync::{Arc, RwLock};

use crate::registration::{
    domain::RegistrationRecord,
    ports::{RegistrationStore, StoreError, StoreResult},
};

/// Thread-safe in-memory implementation of [`RegistrationStore`].
///
/// Clones share the same underlying record, so a test can keep one handle
/// and hand another to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistrationStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    record: Option<RegistrationRecord>,
    saves: usize,
}

impl InMemoryRegistrationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `record`.
    #[must_use]
    pub fn with_record(record: RegistrationRecord) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.state.write() {
            state.record = Some(record);
        }
        store
    }

    /// Returns the stored record without going through the port.
    ///
    /// Returns `None` when nothing is stored or the lock is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Option<RegistrationRecord> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.record.clone())
    }

    /// Number of successful saves since creation.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.state.read().map(|state| state.saves).unwrap_or(0)
    }
}

impl RegistrationStore for InMemoryRegistrationStore {
    fn load(&self) -> StoreResult<RegistrationRecord> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state.record.clone().unwrap_or_default())
    }

    fn save(&self, record: &RegistrationRecord) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        state.record = Some(record.clone());
        state.saves = state.saves.saturating_add(1);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        state.record = None;
        Ok(())
    }
}
