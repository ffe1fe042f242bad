use std::sync::Arc;

use tracing::info;

use crate::backend::{ModelBackend, SharedBackend};
use crate::backends::dummy::DummyBackend;
use crate::error::ModelResult;
use crate::kind::EntityKind;
use crate::record::{Entity, Record};
use crate::relation::Relation;
use crate::resolver::BackendModule;

pub const MODULE_PATH: &str = "syrinx.models.backends.console";

/// Logs every call with its arguments and retains nothing. Results are
/// those of [`DummyBackend`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleBackend {
    inner: DummyBackend,
}

pub fn module() -> BackendModule {
    BackendModule::new(MODULE_PATH).define_all(|| Arc::new(ConsoleBackend::default()) as SharedBackend)
}

fn describe(record: &Record) -> String {
    format!("{} {}", record.kind(), record.key())
}

impl ModelBackend for ConsoleBackend {
    fn name(&self) -> &'static str {
        "console"
    }

    fn get(&self, kind: EntityKind, key: &str) -> ModelResult<Record> {
        info!(target: "syrinx::console", "get({kind}, {key})");
        self.inner.get(kind, key)
    }

    fn save(&self, record: Record) -> ModelResult<Record> {
        info!(target: "syrinx::console", "save({}) = {record:?}", describe(&record));
        self.inner.save(record)
    }

    fn delete(&self, record: &Record) -> ModelResult<()> {
        info!(target: "syrinx::console", "delete({})", describe(record));
        self.inner.delete(record)
    }

    fn contains(&self, relation: &Relation, key: &str) -> ModelResult<bool> {
        info!(target: "syrinx::console", "contains({relation}, {key})");
        self.inner.contains(relation, key)
    }

    fn get_item(&self, relation: &Relation, key: &str) -> ModelResult<Record> {
        info!(target: "syrinx::console", "get_item({relation}, {key})");
        self.inner.get_item(relation, key)
    }

    fn set_item(&self, relation: &Relation, key: &str, value: Record) -> ModelResult<()> {
        info!(target: "syrinx::console", "set_item({relation}, {key}, {})", describe(&value));
        self.inner.set_item(relation, key, value)
    }

    fn del_item(&self, relation: &Relation, key: &str) -> ModelResult<()> {
        info!(target: "syrinx::console", "del_item({relation}, {key})");
        self.inner.del_item(relation, key)
    }

    fn len(&self, relation: &Relation) -> ModelResult<usize> {
        info!(target: "syrinx::console", "len({relation})");
        self.inner.len(relation)
    }

    fn items(&self, relation: &Relation) -> ModelResult<Vec<(String, Record)>> {
        info!(target: "syrinx::console", "items({relation})");
        self.inner.items(relation)
    }

    fn follow(&self, actor: &Record, target: &Record) -> ModelResult<()> {
        info!(target: "syrinx::console", "follow({}, {})", describe(actor), describe(target));
        self.inner.follow(actor, target)
    }

    fn unfollow(&self, actor: &Record, target: &Record) -> ModelResult<()> {
        info!(target: "syrinx::console", "unfollow({}, {})", describe(actor), describe(target));
        self.inner.unfollow(actor, target)
    }

    fn get_followers(&self, actor: &Record) -> ModelResult<Vec<Record>> {
        info!(target: "syrinx::console", "get_followers({})", describe(actor));
        self.inner.get_followers(actor)
    }

    fn add_list(&self, actor: &Record, list: &Record) -> ModelResult<()> {
        info!(target: "syrinx::console", "add_list({}, {})", describe(actor), describe(list));
        self.inner.add_list(actor, list)
    }

    fn add_to_list(&self, actor: &Record, list: &Record, user: &Record) -> ModelResult<()> {
        info!(
            target: "syrinx::console",
            "add_to_list({}, {}, {})",
            describe(actor),
            describe(list),
            describe(user)
        );
        self.inner.add_to_list(actor, list, user)
    }

    fn add_member(&self, list: &Record, user: &Record) -> ModelResult<()> {
        info!(target: "syrinx::console", "add_member({}, {})", describe(list), describe(user));
        self.inner.add_member(list, user)
    }

    fn post_notice(&self, actor: &Record, notice: &Record) -> ModelResult<()> {
        info!(target: "syrinx::console", "post_notice({}, {notice})", describe(actor));
        self.inner.post_notice(actor, notice)
    }

    fn send_private_notice(&self, actor: &Record, notice: &Record) -> ModelResult<()> {
        info!(target: "syrinx::console", "send_private_notice({}, {notice})", describe(actor));
        self.inner.send_private_notice(actor, notice)
    }
}
