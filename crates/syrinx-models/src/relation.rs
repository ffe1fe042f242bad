//! Backend-backed key/value collections owned by an entity.
//!
//! A [`Relation`] holds no entries itself. Every access resolves a backend and
//! forwards `(relation, key[, value])` to the matching container operation,
//! so what actually stores the entries (a map, a table, nothing at all) is up
//! to the backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::BackendSource;
use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::record::{Entity, Record};

/// Which relation of the owner a collection represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Followers,
    Following,
    Lists,
    Notices,
    PrivateNotices,
    Members,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
            Self::Lists => "lists",
            Self::Notices => "notices",
            Self::PrivateNotices => "private_notices",
            Self::Members => "members",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            Self::Followers,
            Self::Following,
            Self::Lists,
            Self::Notices,
            Self::PrivateNotices,
            Self::Members,
        ]
        .into_iter()
        .find(|ns| ns.as_str() == s)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type LockKey = (EntityKind, String, Namespace);

/// One lock per live collection, shared by every handle naming it.
static COLLECTION_LOCKS: LazyLock<Mutex<HashMap<LockKey, Weak<Mutex<()>>>>> =
    LazyLock::new(Default::default);

/// A collection bound to `(owner, namespace)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    owner_kind: EntityKind,
    owner: String,
    namespace: Namespace,
}

impl Relation {
    pub fn new(owner_kind: EntityKind, owner: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            owner_kind,
            owner: owner.into(),
            namespace,
        }
    }

    pub fn owner_kind(&self) -> EntityKind {
        self.owner_kind
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn contains(&self, source: &dyn BackendSource, key: &str) -> ModelResult<bool> {
        source.backend_for(self.owner_kind)?.contains(self, key)
    }

    pub fn get(&self, source: &dyn BackendSource, key: &str) -> ModelResult<Record> {
        source.backend_for(self.owner_kind)?.get_item(self, key)
    }

    pub fn set(&self, source: &dyn BackendSource, key: &str, value: Record) -> ModelResult<()> {
        source.backend_for(self.owner_kind)?.set_item(self, key, value)
    }

    pub fn remove(&self, source: &dyn BackendSource, key: &str) -> ModelResult<()> {
        source.backend_for(self.owner_kind)?.del_item(self, key)
    }

    pub fn len(&self, source: &dyn BackendSource) -> ModelResult<usize> {
        source.backend_for(self.owner_kind)?.len(self)
    }

    pub fn is_empty(&self, source: &dyn BackendSource) -> ModelResult<bool> {
        Ok(self.len(source)? == 0)
    }

    /// Stores `value` under its own key.
    pub fn append(&self, source: &dyn BackendSource, value: Record) -> ModelResult<()> {
        let key = value.key();
        self.set(source, &key, value)
    }

    /// Entries in insertion order.
    pub fn items(&self, source: &dyn BackendSource) -> ModelResult<Vec<(String, Record)>> {
        source.backend_for(self.owner_kind)?.items(self)
    }

    pub fn values(&self, source: &dyn BackendSource) -> ModelResult<Vec<Record>> {
        Ok(self
            .items(source)?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    /// The NotFound error for a missing entry.
    pub fn missing(&self, key: &str) -> ModelError {
        ModelError::not_found(self.owner_kind, format!("{self}[{key}]"))
    }

    /// Sets `key`, then runs `durable`. If `durable` fails the entry is put
    /// back the way it was and the durable error is returned.
    pub(crate) fn set_guarded<F>(
        &self,
        source: &dyn BackendSource,
        key: &str,
        value: Record,
        durable: F,
    ) -> ModelResult<()>
    where
        F: FnOnce() -> ModelResult<()>,
    {
        let lock = self.exclusive();
        let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let previous = self.previous(source, key)?;
        self.set(source, key, value)?;
        durable().inspect_err(|_| self.restore(source, key, previous))
    }

    /// Adds a new entry under `key`, then runs `durable`. An entry already
    /// present is an `AlreadyExists` error and nothing is written.
    pub(crate) fn insert_guarded<F>(
        &self,
        source: &dyn BackendSource,
        key: &str,
        value: Record,
        durable: F,
    ) -> ModelResult<()>
    where
        F: FnOnce() -> ModelResult<()>,
    {
        let lock = self.exclusive();
        let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.contains(source, key)? {
            return Err(ModelError::AlreadyExists {
                relation: self.to_string(),
                key: key.to_string(),
            });
        }
        self.set(source, key, value)?;
        durable().inspect_err(|_| self.restore(source, key, None))
    }

    /// Removes `key`, then runs `durable`, restoring the entry on failure.
    pub(crate) fn remove_guarded<F>(
        &self,
        source: &dyn BackendSource,
        key: &str,
        durable: F,
    ) -> ModelResult<()>
    where
        F: FnOnce() -> ModelResult<()>,
    {
        let lock = self.exclusive();
        let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let previous = self.previous(source, key)?;
        if previous.is_some() {
            self.remove(source, key)?;
        }
        durable().inspect_err(|_| self.restore(source, key, previous))
    }

    /// The in-process lock serializing guarded mutations of this collection.
    /// Handles that differ only in account kind share it.
    fn exclusive(&self) -> Arc<Mutex<()>> {
        let key = (self.owner_kind.key_space(), self.owner.clone(), self.namespace);
        let mut locks = COLLECTION_LOCKS
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(Mutex::new(()));
        locks.insert(key, Arc::downgrade(&lock));
        lock
    }

    fn previous(&self, source: &dyn BackendSource, key: &str) -> ModelResult<Option<Record>> {
        if self.contains(source, key)? {
            self.get(source, key).map(Some)
        } else {
            Ok(None)
        }
    }

    fn restore(&self, source: &dyn BackendSource, key: &str, previous: Option<Record>) {
        let result = match previous {
            Some(value) => self.set(source, key, value),
            None => self.remove(source, key),
        };
        if let Err(err) = result {
            warn!(relation = %self, key, error = %err, "rollback of local mutation failed");
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.owner_kind.as_str(), self.owner, self.namespace)
    }
}
