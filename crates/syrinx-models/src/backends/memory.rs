//! In-memory backend.
//!
//! Entries live in process memory behind a `RwLock`, so one instance can be
//! shared by every resolution and by concurrent callers. Relation entries
//! keep insertion order; setting an existing key replaces the value in place.
//!
//! Relation collections are keyed by the owner's key space as well as its
//! key, so an account and a list whose keys happen to be equal never share
//! entries.
//!
//! Deleting an entity drops the entity and every relation collection it
//! owns. Entries that point at it from other owners' collections are kept.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::backend::{ModelBackend, SharedBackend};
use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::record::{Entity, Record};
use crate::relation::{Namespace, Relation};
use crate::resolver::BackendModule;

pub const MODULE_PATH: &str = "syrinx.models.backends.memory";

type RelationKey = (EntityKind, String, Namespace);

#[derive(Debug, Default)]
struct Store {
    /// Accounts share one identity space regardless of kind.
    accounts: HashMap<String, Record>,
    records: HashMap<(EntityKind, String), Record>,
    relations: HashMap<RelationKey, Vec<(String, Record)>>,
}

impl Store {
    fn upsert(&mut self, record: Record) {
        let key = record.key();
        if record.kind().is_account() {
            self.accounts.insert(key, record);
        } else {
            self.records.insert((record.kind(), key), record);
        }
    }

    fn entries(&self, owner_kind: EntityKind, owner: &str, namespace: Namespace) -> &[(String, Record)] {
        self.relations
            .get(&(owner_kind.key_space(), owner.to_string(), namespace))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn set_entry(
        &mut self,
        owner_kind: EntityKind,
        owner: &str,
        namespace: Namespace,
        key: &str,
        value: Record,
    ) {
        let entries = self
            .relations
            .entry((owner_kind.key_space(), owner.to_string(), namespace))
            .or_default();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key.to_string(), value)),
        }
    }

    fn remove_entry(&mut self, owner_kind: EntityKind, owner: &str, namespace: Namespace, key: &str) {
        if let Some(entries) = self
            .relations
            .get_mut(&(owner_kind.key_space(), owner.to_string(), namespace))
        {
            entries.retain(|(k, _)| k != key);
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: RwLock<Store>,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every kind resolves to this one instance.
    pub fn module(self: &Arc<Self>) -> BackendModule {
        BackendModule::shared(MODULE_PATH, Arc::clone(self) as SharedBackend)
    }

    /// Number of stored entities, accounts included.
    pub fn entity_count(&self) -> ModelResult<usize> {
        let store = self.read()?;
        Ok(store.accounts.len() + store.records.len())
    }

    fn read(&self) -> ModelResult<RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|e| ModelError::storage(format!("memory store lock poisoned: {e}")))
    }

    fn write(&self) -> ModelResult<RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|e| ModelError::storage(format!("memory store lock poisoned: {e}")))
    }
}

impl ModelBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, kind: EntityKind, key: &str) -> ModelResult<Record> {
        let store = self.read()?;
        let found = if kind.is_account() {
            store.accounts.get(key)
        } else {
            store.records.get(&(kind, key.to_string()))
        };
        found.cloned().ok_or_else(|| ModelError::not_found(kind, key))
    }

    fn save(&self, record: Record) -> ModelResult<Record> {
        self.write()?.upsert(record.clone());
        Ok(record)
    }

    fn delete(&self, record: &Record) -> ModelResult<()> {
        let key = record.key();
        let mut store = self.write()?;
        if record.kind().is_account() {
            store.accounts.remove(&key);
        } else {
            store.records.remove(&(record.kind(), key.clone()));
        }
        let before = store.relations.len();
        let space = record.kind().key_space();
        store
            .relations
            .retain(|(owner_space, owner, _), _| !(*owner_space == space && *owner == key));
        debug!(key = %key, dropped_relations = before - store.relations.len(), "memory delete");
        Ok(())
    }

    fn contains(&self, relation: &Relation, key: &str) -> ModelResult<bool> {
        let store = self.read()?;
        Ok(store
            .entries(relation.owner_kind(), relation.owner(), relation.namespace())
            .iter()
            .any(|(k, _)| k == key))
    }

    fn get_item(&self, relation: &Relation, key: &str) -> ModelResult<Record> {
        let store = self.read()?;
        store
            .entries(relation.owner_kind(), relation.owner(), relation.namespace())
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| relation.missing(key))
    }

    fn set_item(&self, relation: &Relation, key: &str, value: Record) -> ModelResult<()> {
        self.write()?
            .set_entry(relation.owner_kind(), relation.owner(), relation.namespace(), key, value);
        Ok(())
    }

    fn del_item(&self, relation: &Relation, key: &str) -> ModelResult<()> {
        self.write()?
            .remove_entry(relation.owner_kind(), relation.owner(), relation.namespace(), key);
        Ok(())
    }

    fn len(&self, relation: &Relation) -> ModelResult<usize> {
        Ok(self
            .read()?
            .entries(relation.owner_kind(), relation.owner(), relation.namespace())
            .len())
    }

    fn items(&self, relation: &Relation) -> ModelResult<Vec<(String, Record)>> {
        Ok(self
            .read()?
            .entries(relation.owner_kind(), relation.owner(), relation.namespace())
            .to_vec())
    }

    /// Records the reverse edge: `target.followers[actor] = actor`.
    fn follow(&self, actor: &Record, target: &Record) -> ModelResult<()> {
        self.write()?.set_entry(
            target.kind(),
            &target.key(),
            Namespace::Followers,
            &actor.key(),
            actor.clone(),
        );
        Ok(())
    }

    fn unfollow(&self, actor: &Record, target: &Record) -> ModelResult<()> {
        self.write()?
            .remove_entry(target.kind(), &target.key(), Namespace::Followers, &actor.key());
        Ok(())
    }

    fn get_followers(&self, actor: &Record) -> ModelResult<Vec<Record>> {
        Ok(self
            .read()?
            .entries(actor.kind(), &actor.key(), Namespace::Followers)
            .iter()
            .map(|(_, value)| value.clone())
            .collect())
    }

    fn add_list(&self, _actor: &Record, list: &Record) -> ModelResult<()> {
        self.write()?.upsert(list.clone());
        Ok(())
    }

    fn add_to_list(&self, _actor: &Record, list: &Record, _user: &Record) -> ModelResult<()> {
        self.write()?.upsert(list.clone());
        Ok(())
    }

    fn add_member(&self, list: &Record, _user: &Record) -> ModelResult<()> {
        self.write()?.upsert(list.clone());
        Ok(())
    }

    fn post_notice(&self, _actor: &Record, notice: &Record) -> ModelResult<()> {
        self.write()?.upsert(notice.clone());
        Ok(())
    }

    fn send_private_notice(&self, _actor: &Record, notice: &Record) -> ModelResult<()> {
        self.write()?.upsert(notice.clone());
        Ok(())
    }
}
