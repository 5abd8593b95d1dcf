//! Priority-ordered provider candidate list and selection policy.

use std::collections::HashSet;
use std::sync::Arc;

use crate::registration::{
    domain::{ProviderDescriptor, ProviderName, PushEnvironment, RegistrationDomainError},
    ports::{ProviderAdapter, ProviderAdapterError, ProviderAdapterResult},
};

struct CatalogEntry {
    descriptor: ProviderDescriptor,
    adapter: Arc<dyn ProviderAdapter>,
}

/// Configured provider adapters in fixed priority order.
///
/// Priority is the position in the list passed to [`Self::new`] and never
/// changes at runtime.
pub struct ProviderCatalog {
    entries: Vec<CatalogEntry>,
}

/// Outcome of a candidate scan.
#[derive(Debug, Default)]
pub struct Selection {
    /// Index of the first usable candidate, if any.
    pub candidate: Option<usize>,
    /// Candidates whose probes raised an error during the scan.
    pub probe_failures: Vec<(ProviderName, ProviderAdapterError)>,
}

impl ProviderCatalog {
    /// Builds a catalog from adapters in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationDomainError::DuplicateProvider`] when two
    /// adapters share a name.
    pub fn new(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Result<Self, RegistrationDomainError> {
        let mut seen = HashSet::with_capacity(adapters.len());
        let mut entries = Vec::with_capacity(adapters.len());
        for (priority, adapter) in adapters.into_iter().enumerate() {
            let name = adapter.name().clone();
            if !seen.insert(name.clone()) {
                return Err(RegistrationDomainError::DuplicateProvider(name));
            }
            let descriptor = ProviderDescriptor::new(name, priority, adapter.capabilities());
            entries.push(CatalogEntry {
                descriptor,
                adapter,
            });
        }
        Ok(Self { entries })
    }

    /// Number of configured providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no provider is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Provider descriptors in priority order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.entries.iter().map(|entry| &entry.descriptor)
    }

    /// Priority index of the provider called `name`.
    #[must_use]
    pub fn position(&self, name: &ProviderName) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.descriptor.name() == name)
    }

    /// Descriptor and adapter at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(&ProviderDescriptor, &Arc<dyn ProviderAdapter>)> {
        self.entries
            .get(index)
            .map(|entry| (&entry.descriptor, &entry.adapter))
    }

    /// Descriptor and adapter of the provider called `name`.
    #[must_use]
    pub fn find(
        &self,
        name: &ProviderName,
    ) -> Option<(&ProviderDescriptor, &Arc<dyn ProviderAdapter>)> {
        self.position(name).and_then(|index| self.get(index))
    }

    /// Probes the provider called `name`; `None` when it is not configured.
    ///
    /// The manifest check only runs when the provider reports itself
    /// available.
    #[must_use]
    pub fn probe(
        &self,
        name: &ProviderName,
        environment: &PushEnvironment,
    ) -> Option<ProviderAdapterResult<bool>> {
        self.find(name)
            .map(|(_, adapter)| probe(adapter.as_ref(), environment))
    }

    /// Scans candidates from `start` for the first usable one.
    ///
    /// A candidate is usable when both its availability probe and its
    /// manifest check return `true`. Candidates whose probes fail are
    /// skipped and reported in [`Selection::probe_failures`].
    #[must_use]
    pub fn select(&self, start: usize, environment: &PushEnvironment) -> Selection {
        let mut selection = Selection::default();
        for (index, entry) in self.entries.iter().enumerate().skip(start) {
            let name = entry.descriptor.name();
            match probe(entry.adapter.as_ref(), environment) {
                Ok(true) => {
                    selection.candidate = Some(index);
                    break;
                }
                Ok(false) => {
                    tracing::debug!(provider = %name, "skipping unavailable provider");
                }
                Err(err) => {
                    tracing::warn!(
                        provider = %name,
                        error = %err,
                        "provider probe failed; skipping"
                    );
                    selection.probe_failures.push((name.clone(), err));
                }
            }
        }
        selection
    }
}

fn probe(
    adapter: &dyn ProviderAdapter,
    environment: &PushEnvironment,
) -> ProviderAdapterResult<bool> {
    if adapter.is_available(environment)? {
        adapter.check_manifest(environment)
    } else {
        Ok(false)
    }
}

impl std::fmt::Debug for ProviderCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| &entry.descriptor))
            .finish()
    }
}
