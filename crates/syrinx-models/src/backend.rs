//! The operation set every storage engine implements or explicitly declines.
//!
//! Each method has a default that returns [`ModelError::Unsupported`], so a
//! partial backend fails loudly on the first call it cannot service instead
//! of pretending to succeed.

use std::fmt;
use std::sync::Arc;

use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::record::Record;
use crate::relation::Relation;

pub trait ModelBackend: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    // -- Entities --

    fn get(&self, kind: EntityKind, key: &str) -> ModelResult<Record> {
        let _ = (kind, key);
        Err(self.unsupported("get"))
    }

    /// Persists `record` and returns the stored version.
    fn save(&self, record: Record) -> ModelResult<Record> {
        let _ = record;
        Err(self.unsupported("save"))
    }

    fn delete(&self, record: &Record) -> ModelResult<()> {
        let _ = record;
        Err(self.unsupported("delete"))
    }

    // -- Relation containers --

    fn contains(&self, relation: &Relation, key: &str) -> ModelResult<bool> {
        let _ = (relation, key);
        Err(self.unsupported("contains"))
    }

    fn get_item(&self, relation: &Relation, key: &str) -> ModelResult<Record> {
        let _ = (relation, key);
        Err(self.unsupported("get_item"))
    }

    fn set_item(&self, relation: &Relation, key: &str, value: Record) -> ModelResult<()> {
        let _ = (relation, key, value);
        Err(self.unsupported("set_item"))
    }

    fn del_item(&self, relation: &Relation, key: &str) -> ModelResult<()> {
        let _ = (relation, key);
        Err(self.unsupported("del_item"))
    }

    fn len(&self, relation: &Relation) -> ModelResult<usize> {
        let _ = relation;
        Err(self.unsupported("len"))
    }

    fn items(&self, relation: &Relation) -> ModelResult<Vec<(String, Record)>> {
        let _ = relation;
        Err(self.unsupported("items"))
    }

    // -- Domain operations --

    fn follow(&self, actor: &Record, target: &Record) -> ModelResult<()> {
        let _ = (actor, target);
        Err(self.unsupported("follow"))
    }

    fn unfollow(&self, actor: &Record, target: &Record) -> ModelResult<()> {
        let _ = (actor, target);
        Err(self.unsupported("unfollow"))
    }

    fn get_followers(&self, actor: &Record) -> ModelResult<Vec<Record>> {
        let _ = actor;
        Err(self.unsupported("get_followers"))
    }

    fn add_list(&self, actor: &Record, list: &Record) -> ModelResult<()> {
        let _ = (actor, list);
        Err(self.unsupported("add_list"))
    }

    fn add_to_list(&self, actor: &Record, list: &Record, user: &Record) -> ModelResult<()> {
        let _ = (actor, list, user);
        Err(self.unsupported("add_to_list"))
    }

    fn add_member(&self, list: &Record, user: &Record) -> ModelResult<()> {
        let _ = (list, user);
        Err(self.unsupported("add_member"))
    }

    fn post_notice(&self, actor: &Record, notice: &Record) -> ModelResult<()> {
        let _ = (actor, notice);
        Err(self.unsupported("post_notice"))
    }

    fn send_private_notice(&self, actor: &Record, notice: &Record) -> ModelResult<()> {
        let _ = (actor, notice);
        Err(self.unsupported("send_private_notice"))
    }

    #[doc(hidden)]
    fn unsupported(&self, operation: &'static str) -> ModelError {
        ModelError::unsupported(self.name(), operation)
    }
}

impl fmt::Debug for dyn ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBackend")
            .field("name", &self.name())
            .finish()
    }
}

pub type SharedBackend = Arc<dyn ModelBackend>;

/// Where an operation gets its backend from.
///
/// A [`Resolver`](crate::resolver::Resolver) resolves one from the active
/// configuration; a [`SharedBackend`] is an explicit override and is used
/// as is.
pub trait BackendSource {
    fn backend_for(&self, kind: EntityKind) -> ModelResult<SharedBackend>;
}

impl BackendSource for SharedBackend {
    fn backend_for(&self, _kind: EntityKind) -> ModelResult<SharedBackend> {
        Ok(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl ModelBackend for Nothing {
        fn name(&self) -> &'static str {
            "nothing"
        }
    }

    #[test]
    fn defaults_report_unsupported() {
        let backend = Nothing;
        let err = backend.get(EntityKind::User, "tuxie").unwrap_err();
        assert!(matches!(
            err,
            ModelError::Unsupported { backend: "nothing", operation: "get" }
        ));
        let notice = Record::Notice(crate::entities::Notice::new("Hola"));
        assert!(backend.post_notice(&notice, &notice).unwrap_err().is_unsupported());
    }

    #[test]
    fn shared_backend_debug_names_backend() {
        let shared: SharedBackend = Arc::new(Nothing);
        assert_eq!(format!("{shared:?}"), "ModelBackend { name: \"nothing\" }");

        let err: ModelResult<SharedBackend> = Err(ModelError::storage("down"));
        assert!(matches!(err.unwrap_err(), ModelError::Storage(_)));
    }

    #[test]
    fn override_source_returns_itself() {
        let shared: SharedBackend = Arc::new(Nothing);
        let resolved = shared.backend_for(EntityKind::Notice).unwrap();
        assert!(Arc::ptr_eq(&shared, &resolved));
    }
}
