use std::sync::Arc;

use crate::backend::{ModelBackend, SharedBackend};
use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::record::Record;
use crate::relation::Relation;
use crate::resolver::BackendModule;

pub const MODULE_PATH: &str = "syrinx.models.backends.dummy";

/// Accepts everything and keeps nothing. Reads find nothing and every
/// collection reports a length of zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyBackend;

/// A fresh, stateless instance per resolution.
pub fn module() -> BackendModule {
    BackendModule::new(MODULE_PATH).define_all(|| Arc::new(DummyBackend) as SharedBackend)
}

impl ModelBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "dummy"
    }

    fn get(&self, kind: EntityKind, key: &str) -> ModelResult<Record> {
        Err(ModelError::not_found(kind, key))
    }

    fn save(&self, record: Record) -> ModelResult<Record> {
        Ok(record)
    }

    fn delete(&self, _record: &Record) -> ModelResult<()> {
        Ok(())
    }

    fn contains(&self, _relation: &Relation, _key: &str) -> ModelResult<bool> {
        Ok(false)
    }

    fn get_item(&self, relation: &Relation, key: &str) -> ModelResult<Record> {
        Err(relation.missing(key))
    }

    fn set_item(&self, _relation: &Relation, _key: &str, _value: Record) -> ModelResult<()> {
        Ok(())
    }

    fn del_item(&self, _relation: &Relation, _key: &str) -> ModelResult<()> {
        Ok(())
    }

    fn len(&self, _relation: &Relation) -> ModelResult<usize> {
        Ok(0)
    }

    fn items(&self, _relation: &Relation) -> ModelResult<Vec<(String, Record)>> {
        Ok(Vec::new())
    }

    fn follow(&self, _actor: &Record, _target: &Record) -> ModelResult<()> {
        Ok(())
    }

    fn unfollow(&self, _actor: &Record, _target: &Record) -> ModelResult<()> {
        Ok(())
    }

    fn get_followers(&self, _actor: &Record) -> ModelResult<Vec<Record>> {
        Ok(Vec::new())
    }

    fn add_list(&self, _actor: &Record, _list: &Record) -> ModelResult<()> {
        Ok(())
    }

    fn add_to_list(&self, _actor: &Record, _list: &Record, _user: &Record) -> ModelResult<()> {
        Ok(())
    }

    fn add_member(&self, _list: &Record, _user: &Record) -> ModelResult<()> {
        Ok(())
    }

    fn post_notice(&self, _actor: &Record, _notice: &Record) -> ModelResult<()> {
        Ok(())
    }

    fn send_private_notice(&self, _actor: &Record, _notice: &Record) -> ModelResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Notice;
    use crate::record::Entity;
    use crate::relation::Namespace;

    #[test]
    fn reads_find_nothing() {
        let backend = DummyBackend;
        assert!(backend.get(EntityKind::LocalUser, "tuxie").unwrap_err().is_not_found());

        let relation = Relation::new(EntityKind::LocalUser, "tuxie", Namespace::Notices);
        let notice = Notice::new("Hello").to_record();
        backend.set_item(&relation, &notice.key(), notice.clone()).unwrap();
        assert_eq!(backend.len(&relation).unwrap(), 0);
        assert!(!backend.contains(&relation, &notice.key()).unwrap());
    }

    #[test]
    fn save_returns_input() {
        let notice = Notice::new("Hola").to_record();
        assert_eq!(DummyBackend.save(notice.clone()).unwrap(), notice);
    }
}
