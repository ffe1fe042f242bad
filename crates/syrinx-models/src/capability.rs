//! Relationship behaviours composed onto entity types.
//!
//! Each operation first applies its effect to the owner's relation
//! collection, then asks the backend for the matching durable effect. When
//! the durable call fails the collection is restored and the backend error
//! is returned unchanged.
//!
//! Only [`LocalUser`] implements these traits. Callers holding a
//! [`Record`] use [`Record::as_follower`] and friends to find out whether
//! an entity can act.

use crate::backend::BackendSource;
use crate::entities::{LocalUser, Notice, PrivateNotice, UserList};
use crate::error::ModelResult;
use crate::record::{Account, Entity, Record};
use crate::relation::{Namespace, Relation};

/// Entities that own namespaced relation collections.
pub trait RelationOwner: Account {
    fn owned(&self, namespace: Namespace) -> Relation;
}

pub trait ListOwnerCapability: RelationOwner {
    /// Attaches `list` to this owner. A list can be attached once.
    fn add_list(&self, source: &dyn BackendSource, list: &mut UserList) -> ModelResult<()> {
        let previous_owner = list.owner.replace(self.account().identity.clone());
        let record = list.to_record();
        self.owned(Namespace::Lists)
            .insert_guarded(source, &list.key(), record.clone(), || {
                source
                    .backend_for(self.kind())?
                    .add_list(&self.to_record(), &record)
            })
            .inspect_err(|_| list.owner = previous_owner)
    }

    /// Adds `user` to `list`. Membership is keyed by identity, so repeating
    /// the call does not add a second entry.
    fn add_to_list(
        &self,
        source: &dyn BackendSource,
        list: &UserList,
        user: &dyn Account,
    ) -> ModelResult<()> {
        file_under(source, &self.to_record(), list, user, || Ok(()))
    }
}

/// Files `user` under `list` for `owner`, then runs `then`. The membership
/// is undone if the backend refuses either step or `then` fails.
fn file_under<F>(
    source: &dyn BackendSource,
    owner: &Record,
    list: &UserList,
    user: &dyn Account,
    then: F,
) -> ModelResult<()>
where
    F: FnOnce() -> ModelResult<()>,
{
    let member = user.to_record();
    list.add_member_then(source, user, || {
        source
            .backend_for(owner.kind())?
            .add_to_list(owner, &list.to_record(), &member)?;
        then()
    })
}

pub trait FollowCapability: ListOwnerCapability {
    /// Follows `target`, optionally filing it under `list` as well.
    /// Following an account twice leaves a single edge. When the backend
    /// refuses the follow, neither the edge nor the list entry is kept.
    fn follow(
        &self,
        source: &dyn BackendSource,
        target: &dyn Account,
        list: Option<&UserList>,
    ) -> ModelResult<()> {
        let key = target.account().identity.key();
        let actor = self.to_record();
        let target_record = target.to_record();
        let durable = || source.backend_for(self.kind())?.follow(&actor, &target_record);

        self.owned(Namespace::Following)
            .set_guarded(source, &key, target_record.clone(), || match list {
                Some(list) => file_under(source, &actor, list, target, durable),
                None => durable(),
            })
    }

    fn unfollow(&self, source: &dyn BackendSource, target: &dyn Account) -> ModelResult<()> {
        let key = target.account().identity.key();
        self.owned(Namespace::Following)
            .remove_guarded(source, &key, || {
                source
                    .backend_for(self.kind())?
                    .unfollow(&self.to_record(), &target.to_record())
            })
    }

    fn is_following(&self, source: &dyn BackendSource, target: &dyn Account) -> ModelResult<bool> {
        self.owned(Namespace::Following)
            .contains(source, &target.account().identity.key())
    }

    fn get_followers(&self, source: &dyn BackendSource) -> ModelResult<Vec<Record>> {
        source
            .backend_for(self.kind())?
            .get_followers(&self.to_record())
    }
}

/// Notices are append-only: posting or sending the same notice twice is an
/// `AlreadyExists` error, so the collection length counts successful posts.
pub trait NoticeCapability: RelationOwner {
    fn post_notice(&self, source: &dyn BackendSource, notice: &Notice) -> ModelResult<()> {
        let record = notice.to_record();
        self.owned(Namespace::Notices)
            .insert_guarded(source, &notice.key(), record.clone(), || {
                source
                    .backend_for(self.kind())?
                    .post_notice(&self.to_record(), &record)
            })
    }

    fn send_private_notice(
        &self,
        source: &dyn BackendSource,
        notice: &PrivateNotice,
    ) -> ModelResult<()> {
        let record = notice.to_record();
        self.owned(Namespace::PrivateNotices)
            .insert_guarded(source, &notice.key(), record.clone(), || {
                source
                    .backend_for(self.kind())?
                    .send_private_notice(&self.to_record(), &record)
            })
    }
}

impl ListOwnerCapability for LocalUser {}
impl FollowCapability for LocalUser {}
impl NoticeCapability for LocalUser {}
