use tracing::debug;

use crate::backend::BackendSource;
use crate::error::ModelResult;
use crate::record::Model;

/// Fetch, save and delete, delegated to whichever backend `source` yields.
///
/// Instances start transient, become persisted once [`save`](Self::save)
/// succeeds and are consumed by [`delete`](Self::delete).
pub trait Persist: Model {
    /// Loads the instance stored under `key`.
    fn find(source: &dyn BackendSource, key: &str) -> ModelResult<Self> {
        let record = source.backend_for(Self::KIND)?.get(Self::KIND, key)?;
        Self::from_record(record)
    }

    /// Fetches by `pk` when one is given, otherwise builds a fresh transient
    /// instance with `fresh`.
    fn load_or<F>(source: &dyn BackendSource, pk: Option<&str>, fresh: F) -> ModelResult<Self>
    where
        F: FnOnce() -> ModelResult<Self>,
    {
        match pk.filter(|pk| !pk.is_empty()) {
            Some(pk) => Self::find(source, pk),
            None => fresh(),
        }
    }

    /// Returns the instance as the backend stored it.
    fn save(&self, source: &dyn BackendSource) -> ModelResult<Self> {
        let backend = source.backend_for(Self::KIND)?;
        debug!(kind = %Self::KIND, key = %self.key(), backend = backend.name(), "save");
        Self::from_record(backend.save(self.to_record())?)
    }

    /// What else goes with the instance is up to the backend.
    fn delete(self, source: &dyn BackendSource) -> ModelResult<()> {
        let backend = source.backend_for(Self::KIND)?;
        debug!(kind = %Self::KIND, key = %self.key(), backend = backend.name(), "delete");
        backend.delete(&self.to_record())
    }
}

impl<T: Model> Persist for T {}
