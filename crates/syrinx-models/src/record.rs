use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::{FollowCapability, ListOwnerCapability, NoticeCapability};
use crate::entities::{
    AdminUser, LocalUser, Notice, PrivateNotice, RemoteUser, TwitterUser, User, UserConfig,
    UserList,
};
use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;

/// Anything a backend can store.
pub trait Entity {
    fn kind(&self) -> EntityKind;

    /// Primary key: the identity string for accounts, the id otherwise.
    fn key(&self) -> String;

    fn to_record(&self) -> Record;
}

/// A concrete entity type that can be rebuilt from a [`Record`].
pub trait Model: Entity + Sized {
    const KIND: EntityKind;

    fn from_record(record: Record) -> ModelResult<Self>;
}

/// User-like entities.
pub trait Account: Entity {
    fn account(&self) -> &User;
}

/// Type-erased entity crossing the backend boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Record {
    User(User),
    RemoteUser(RemoteUser),
    LocalUser(LocalUser),
    UserList(UserList),
    Notice(Notice),
    PrivateNotice(PrivateNotice),
    UserConfig(UserConfig),
    AdminUser(AdminUser),
    TwitterUser(TwitterUser),
}

impl Record {
    pub fn as_account(&self) -> Option<&dyn Account> {
        match self {
            Self::User(user) => Some(user),
            Self::RemoteUser(user) => Some(user),
            Self::LocalUser(user) => Some(user),
            _ => None,
        }
    }

    /// `None` for every kind that cannot act as a follower, remote accounts
    /// included.
    pub fn as_follower(&self) -> Option<&dyn FollowCapability> {
        match self {
            Self::LocalUser(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_list_owner(&self) -> Option<&dyn ListOwnerCapability> {
        match self {
            Self::LocalUser(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_notice_author(&self) -> Option<&dyn NoticeCapability> {
        match self {
            Self::LocalUser(user) => Some(user),
            _ => None,
        }
    }

    /// The record with every stored secret blanked, for display.
    pub fn redacted(&self) -> Self {
        match self {
            Self::LocalUser(user) => Self::LocalUser(user.redacted()),
            Self::TwitterUser(twitter) => Self::TwitterUser(twitter.redacted()),
            other => other.clone(),
        }
    }

    fn as_entity(&self) -> &dyn Entity {
        match self {
            Self::User(e) => e,
            Self::RemoteUser(e) => e,
            Self::LocalUser(e) => e,
            Self::UserList(e) => e,
            Self::Notice(e) => e,
            Self::PrivateNotice(e) => e,
            Self::UserConfig(e) => e,
            Self::AdminUser(e) => e,
            Self::TwitterUser(e) => e,
        }
    }
}

impl Entity for Record {
    fn kind(&self) -> EntityKind {
        self.as_entity().kind()
    }

    fn key(&self) -> String {
        self.as_entity().key()
    }

    fn to_record(&self) -> Record {
        self.clone()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(e) => e.fmt(f),
            Self::RemoteUser(e) => e.fmt(f),
            Self::LocalUser(e) => e.fmt(f),
            Self::UserList(e) => e.fmt(f),
            Self::Notice(e) => e.fmt(f),
            Self::PrivateNotice(e) => e.fmt(f),
            Self::UserConfig(e) => e.fmt(f),
            Self::AdminUser(e) => e.fmt(f),
            Self::TwitterUser(e) => e.fmt(f),
        }
    }
}

fn mismatch(expected: EntityKind, record: &Record) -> ModelError {
    ModelError::KindMismatch {
        expected,
        found: record.kind(),
    }
}

// -- Accounts --

impl Entity for User {
    fn kind(&self) -> EntityKind {
        EntityKind::User
    }

    fn key(&self) -> String {
        self.identity.key()
    }

    fn to_record(&self) -> Record {
        Record::User(self.clone())
    }
}

impl Model for User {
    const KIND: EntityKind = EntityKind::User;

    /// Any account record yields its base user.
    fn from_record(record: Record) -> ModelResult<Self> {
        match record {
            Record::User(user) => Ok(user),
            Record::RemoteUser(remote) => Ok(remote.user),
            Record::LocalUser(local) => Ok(local.user),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl Account for User {
    fn account(&self) -> &User {
        self
    }
}

impl Entity for RemoteUser {
    fn kind(&self) -> EntityKind {
        EntityKind::RemoteUser
    }

    fn key(&self) -> String {
        self.user.identity.key()
    }

    fn to_record(&self) -> Record {
        Record::RemoteUser(self.clone())
    }
}

impl Model for RemoteUser {
    const KIND: EntityKind = EntityKind::RemoteUser;

    fn from_record(record: Record) -> ModelResult<Self> {
        match record {
            Record::RemoteUser(remote) => Ok(remote),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl Account for RemoteUser {
    fn account(&self) -> &User {
        &self.user
    }
}

impl Entity for LocalUser {
    fn kind(&self) -> EntityKind {
        EntityKind::LocalUser
    }

    fn key(&self) -> String {
        self.user.identity.key()
    }

    fn to_record(&self) -> Record {
        Record::LocalUser(self.clone())
    }
}

impl Model for LocalUser {
    const KIND: EntityKind = EntityKind::LocalUser;

    fn from_record(record: Record) -> ModelResult<Self> {
        match record {
            Record::LocalUser(local) => Ok(local),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl Account for LocalUser {
    fn account(&self) -> &User {
        &self.user
    }
}

// -- Everything keyed by id --

macro_rules! id_keyed_model {
    ($ty:ident, $kind:ident, |$it:ident| $id:expr) => {
        impl Entity for $ty {
            fn kind(&self) -> EntityKind {
                EntityKind::$kind
            }

            fn key(&self) -> String {
                let $it = self;
                $id.to_string()
            }

            fn to_record(&self) -> Record {
                Record::$kind(self.clone())
            }
        }

        impl Model for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            fn from_record(record: Record) -> ModelResult<Self> {
                match record {
                    Record::$kind(inner) => Ok(inner),
                    other => Err(mismatch(Self::KIND, &other)),
                }
            }
        }
    };
}

id_keyed_model!(UserList, UserList, |it| it.id);
id_keyed_model!(Notice, Notice, |it| it.id);
id_keyed_model!(PrivateNotice, PrivateNotice, |it| it.notice.id);
id_keyed_model!(UserConfig, UserConfig, |it| it.id);
id_keyed_model!(AdminUser, AdminUser, |it| it.id);
id_keyed_model!(TwitterUser, TwitterUser, |it| it.id);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_reads_from_any_account_record() {
        let niko = RemoteUser::new("nikola", "twitter.com").unwrap();
        let user = User::from_record(niko.to_record()).unwrap();
        assert_eq!(user, niko.user);
    }

    #[test]
    fn strict_kinds_reject_other_records() {
        let niko = RemoteUser::new("nikola", "twitter.com").unwrap();
        let err = LocalUser::from_record(niko.to_record()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::KindMismatch {
                expected: EntityKind::LocalUser,
                found: EntityKind::RemoteUser
            }
        ));
    }

    #[test]
    fn remote_user_exposes_no_capabilities() {
        let record = RemoteUser::new("wikileaks", "identi.ca").unwrap().to_record();
        assert!(record.as_account().is_some());
        assert!(record.as_follower().is_none());
        assert!(record.as_list_owner().is_none());
        assert!(record.as_notice_author().is_none());
    }

    #[test]
    fn record_json_is_tagged_by_kind() {
        let notice = Notice::new("Hello");
        let json = serde_json::to_value(notice.to_record()).unwrap();
        assert_eq!(json["kind"], "notice");
        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, Record::Notice(notice));
    }

    #[test]
    fn keys() {
        let notice = Notice::new("Hallo");
        assert_eq!(notice.key(), notice.id.to_string());
        let niko = User::new("nikola", "twitter.com").unwrap();
        assert_eq!(niko.key(), "nikola@twitter.com");
    }
}
