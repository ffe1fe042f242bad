use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::BackendSource;
use crate::error::ModelResult;
use crate::identity::Identity;
use crate::kind::EntityKind;
use crate::record::{Account, Entity};
use crate::relation::{Namespace, Relation};

/// A named group of accounts curated by one local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserList {
    pub id: Uuid,
    pub name: String,
    pub muted: bool,
    pub created: DateTime<Utc>,
    /// Set when the list is attached to its owner.
    pub owner: Option<Identity>,
}

impl UserList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            muted: false,
            created: Utc::now(),
            owner: None,
        }
    }

    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// Members keyed by identity; a fresh handle scoped to this list.
    pub fn members(&self) -> Relation {
        Relation::new(EntityKind::UserList, self.id.to_string(), Namespace::Members)
    }

    /// Adds `user` under its identity key. Adding the same account twice
    /// leaves a single entry.
    pub fn add_member(&self, source: &dyn BackendSource, user: &dyn Account) -> ModelResult<()> {
        self.add_member_then(source, user, || Ok(()))
    }

    /// Adds `user`, then runs `then` once the backend accepted the member.
    /// A failure anywhere puts the membership back the way it was.
    pub(crate) fn add_member_then<F>(
        &self,
        source: &dyn BackendSource,
        user: &dyn Account,
        then: F,
    ) -> ModelResult<()>
    where
        F: FnOnce() -> ModelResult<()>,
    {
        let member = user.to_record();
        let key = user.account().identity.key();
        self.members()
            .set_guarded(source, &key, member.clone(), || {
                source
                    .backend_for(EntityKind::UserList)?
                    .add_member(&self.to_record(), &member)?;
                then()
            })
    }
}

impl fmt::Display for UserList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
