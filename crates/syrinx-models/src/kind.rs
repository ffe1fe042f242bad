use std::fmt;

use serde::{Deserialize, Serialize};

/// Every entity type the model layer knows how to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    RemoteUser,
    LocalUser,
    UserList,
    Notice,
    PrivateNotice,
    UserConfig,
    AdminUser,
    TwitterUser,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        Self::User,
        Self::RemoteUser,
        Self::LocalUser,
        Self::UserList,
        Self::Notice,
        Self::PrivateNotice,
        Self::UserConfig,
        Self::AdminUser,
        Self::TwitterUser,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::RemoteUser => "RemoteUser",
            Self::LocalUser => "LocalUser",
            Self::UserList => "UserList",
            Self::Notice => "Notice",
            Self::PrivateNotice => "PrivateNotice",
            Self::UserConfig => "UserConfig",
            Self::AdminUser => "AdminUser",
            Self::TwitterUser => "TwitterUser",
        }
    }

    /// Name of the backend class that services this kind: `<TypeName>Backend`.
    pub fn backend_class(self) -> String {
        format!("{}Backend", self.type_name())
    }

    /// User-like kinds share one identity space.
    pub fn is_account(self) -> bool {
        matches!(self, Self::User | Self::RemoteUser | Self::LocalUser)
    }

    /// The kind whose keys this kind shares. Every account kind maps to
    /// `User`; everything else is its own space.
    pub fn key_space(self) -> EntityKind {
        if self.is_account() {
            Self::User
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::RemoteUser => "remote_user",
            Self::LocalUser => "local_user",
            Self::UserList => "user_list",
            Self::Notice => "notice",
            Self::PrivateNotice => "private_notice",
            Self::UserConfig => "user_config",
            Self::AdminUser => "admin_user",
            Self::TwitterUser => "twitter_user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
