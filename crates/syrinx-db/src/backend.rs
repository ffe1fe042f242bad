//! The persistent backend: every contract operation mapped onto [`Database`].
//!
//! Records are stored as their tagged JSON form. Accounts live in `users`,
//! keyed by `(username, server)`, so any user-kind entity shares one
//! identity space. Other entities live in `records`, keyed by kind and id.
//! Relation entries carry their owner's key space next to the owner key.

use std::sync::Arc;

use syrinx_models::backend::{ModelBackend, SharedBackend};
use syrinx_models::{
    BackendModule, Entity, EntityKind, Identity, ModelError, ModelResult, Namespace, Record,
    Relation,
};
use tracing::debug;

use crate::Database;
use crate::models::EntityRow;

pub const MODULE_PATH: &str = "syrinx.models.backends.sqlite";

#[derive(Clone)]
pub struct SqliteBackend {
    db: Arc<Database>,
}

impl SqliteBackend {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// One backend over `db` for every kind.
    pub fn module(db: Arc<Database>) -> BackendModule {
        BackendModule::shared(MODULE_PATH, Arc::new(Self::new(db)) as SharedBackend)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn run<T>(&self, f: impl FnOnce(&Database) -> anyhow::Result<T>) -> ModelResult<T> {
        f(&self.db).map_err(|e| ModelError::storage(format!("{e:#}")))
    }

    fn upsert(&self, record: &Record) -> ModelResult<()> {
        let data = encode(record)?;
        let kind = record.kind();
        if kind.is_account() {
            let identity: Identity = record.key().parse()?;
            self.run(|db| db.upsert_user(identity.username(), identity.server(), kind.as_str(), &data))
        } else {
            self.run(|db| db.upsert_record(kind.as_str(), &record.key(), &data))
        }
    }

    fn set_entry(
        &self,
        owner_kind: EntityKind,
        owner: &str,
        namespace: Namespace,
        key: &str,
        value: &Record,
    ) -> ModelResult<()> {
        let data = encode(value)?;
        self.run(|db| {
            db.set_relation_item(
                space(owner_kind),
                owner,
                namespace.as_str(),
                key,
                value.kind().as_str(),
                &data,
            )
        })
    }

    fn values(
        &self,
        owner_kind: EntityKind,
        owner: &str,
        namespace: Namespace,
    ) -> ModelResult<Vec<(String, Record)>> {
        self.run(|db| db.relation_items(space(owner_kind), owner, namespace.as_str()))?
            .into_iter()
            .map(|row| Ok((row.item_key, decode(&row.data)?)))
            .collect()
    }
}

fn space(kind: EntityKind) -> &'static str {
    kind.key_space().as_str()
}

fn encode(record: &Record) -> ModelResult<String> {
    serde_json::to_string(record).map_err(ModelError::storage)
}

fn decode(data: &str) -> ModelResult<Record> {
    serde_json::from_str(data).map_err(ModelError::storage)
}

fn decode_row(row: Option<EntityRow>, kind: EntityKind, key: &str) -> ModelResult<Record> {
    match row {
        Some(row) => decode(&row.data),
        None => Err(ModelError::not_found(kind, key)),
    }
}

impl ModelBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    // -- Entities --

    fn get(&self, kind: EntityKind, key: &str) -> ModelResult<Record> {
        let row = if kind.is_account() {
            let identity: Identity = key.parse()?;
            self.run(|db| db.get_user(identity.username(), identity.server()))?
        } else {
            self.run(|db| db.get_record(kind.as_str(), key))?
        };
        decode_row(row, kind, key)
    }

    fn save(&self, record: Record) -> ModelResult<Record> {
        self.upsert(&record)?;
        Ok(record)
    }

    fn delete(&self, record: &Record) -> ModelResult<()> {
        let key = record.key();
        let kind = record.kind();
        let dropped = if kind.is_account() {
            let identity: Identity = key.parse()?;
            self.run(|db| {
                db.delete_user(identity.username(), identity.server(), space(kind), &key)
            })?
        } else {
            self.run(|db| db.delete_record(kind.as_str(), &key))?
        };
        debug!(kind = %kind, key = %key, dropped_relations = dropped, "sqlite delete");
        Ok(())
    }

    // -- Relation containers --

    fn contains(&self, relation: &Relation, key: &str) -> ModelResult<bool> {
        self.run(|db| {
            db.relation_contains(
                space(relation.owner_kind()),
                relation.owner(),
                relation.namespace().as_str(),
                key,
            )
        })
    }

    fn get_item(&self, relation: &Relation, key: &str) -> ModelResult<Record> {
        let row = self.run(|db| {
            db.get_relation_item(
                space(relation.owner_kind()),
                relation.owner(),
                relation.namespace().as_str(),
                key,
            )
        })?;
        match row {
            Some(row) => decode(&row.data),
            None => Err(relation.missing(key)),
        }
    }

    fn set_item(&self, relation: &Relation, key: &str, value: Record) -> ModelResult<()> {
        self.set_entry(relation.owner_kind(), relation.owner(), relation.namespace(), key, &value)
    }

    fn del_item(&self, relation: &Relation, key: &str) -> ModelResult<()> {
        self.run(|db| {
            db.delete_relation_item(
                space(relation.owner_kind()),
                relation.owner(),
                relation.namespace().as_str(),
                key,
            )
        })
    }

    fn len(&self, relation: &Relation) -> ModelResult<usize> {
        self.run(|db| {
            db.relation_len(space(relation.owner_kind()), relation.owner(), relation.namespace().as_str())
        })
    }

    fn items(&self, relation: &Relation) -> ModelResult<Vec<(String, Record)>> {
        self.values(relation.owner_kind(), relation.owner(), relation.namespace())
    }

    // -- Domain operations --

    fn follow(&self, actor: &Record, target: &Record) -> ModelResult<()> {
        self.set_entry(target.kind(), &target.key(), Namespace::Followers, &actor.key(), actor)
    }

    fn unfollow(&self, actor: &Record, target: &Record) -> ModelResult<()> {
        self.run(|db| {
            db.delete_relation_item(
                space(target.kind()),
                &target.key(),
                Namespace::Followers.as_str(),
                &actor.key(),
            )
        })
    }

    fn get_followers(&self, actor: &Record) -> ModelResult<Vec<Record>> {
        Ok(self
            .values(actor.kind(), &actor.key(), Namespace::Followers)?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    fn add_list(&self, _actor: &Record, list: &Record) -> ModelResult<()> {
        self.upsert(list)
    }

    fn add_to_list(&self, _actor: &Record, list: &Record, _user: &Record) -> ModelResult<()> {
        self.upsert(list)
    }

    fn add_member(&self, list: &Record, _user: &Record) -> ModelResult<()> {
        self.upsert(list)
    }

    fn post_notice(&self, _actor: &Record, notice: &Record) -> ModelResult<()> {
        self.upsert(notice)
    }

    fn send_private_notice(&self, _actor: &Record, notice: &Record) -> ModelResult<()> {
        self.upsert(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrinx_models::{Notice, RemoteUser, User, UserList};

    fn backend() -> SqliteBackend {
        SqliteBackend::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[test]
    fn accounts_round_trip_through_users_table() {
        let backend = backend();
        let nikola = RemoteUser::new("nikola", "twitter.com").unwrap().with_name("Nikola");
        backend.save(nikola.to_record()).unwrap();

        let stored = backend.get(EntityKind::RemoteUser, "nikola@twitter.com").unwrap();
        assert_eq!(stored, Record::RemoteUser(nikola));
        assert!(backend.get(EntityKind::User, "nikola").unwrap_err().is_not_found());
    }

    #[test]
    fn notices_are_found_by_kind_and_id() {
        let backend = backend();
        let notice = Notice::new("Hello");
        backend.save(notice.to_record()).unwrap();

        assert_eq!(backend.get(EntityKind::Notice, &notice.key()).unwrap(), notice.to_record());
        assert!(backend
            .get(EntityKind::PrivateNotice, &notice.key())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn follow_records_reverse_edge() {
        let backend = backend();
        let tuxie = User::new("tuxie", "").unwrap().to_record();
        let omar = User::new("omar", "").unwrap().to_record();

        backend.follow(&tuxie, &omar).unwrap();
        backend.follow(&tuxie, &omar).unwrap();
        assert_eq!(backend.get_followers(&omar).unwrap(), vec![tuxie.clone()]);

        backend.unfollow(&tuxie, &omar).unwrap();
        assert!(backend.get_followers(&omar).unwrap().is_empty());
    }

    #[test]
    fn missing_item_is_not_found() {
        let backend = backend();
        let relation = Relation::new(EntityKind::LocalUser, "tuxie", Namespace::Following);
        assert!(backend.get_item(&relation, "omar").unwrap_err().is_not_found());
        assert!(!backend.contains(&relation, "omar").unwrap());
    }

    #[test]
    fn list_and_account_with_equal_keys_stay_apart() {
        let backend = backend();
        let list = UserList::new("crew");
        let owner = list.id.to_string();
        let twin = User::new(owner.clone(), "").unwrap().to_record();
        let omar = User::new("omar", "").unwrap().to_record();
        backend.set_item(&list.members(), "omar", omar).unwrap();

        let account_side = Relation::new(EntityKind::LocalUser, owner, Namespace::Members);
        assert_eq!(backend.len(&account_side).unwrap(), 0);

        backend.save(twin.clone()).unwrap();
        backend.delete(&twin).unwrap();
        assert!(backend.contains(&list.members(), "omar").unwrap());
    }

    #[test]
    fn bad_account_key_is_rejected() {
        let backend = backend();
        let err = backend.get(EntityKind::User, "not a user").unwrap_err();
        assert!(matches!(err, ModelError::InvalidIdentity { .. }));
    }
}
