//! Value objects attachable to a local account.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Privacy and notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: Uuid,
    pub protected: bool,
    pub email_notification: bool,
}

impl UserConfig {
    pub fn new(protected: bool, email_notification: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            protected,
            email_notification,
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self::new(false, true)
    }
}

impl fmt::Display for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<UserConfig #{}>", self.id)
    }
}

/// Marks an account as holding elevated privileges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub is_root: bool,
}

impl AdminUser {
    pub fn new(is_root: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            is_root,
        }
    }
}

impl fmt::Display for AdminUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<AdminUser #{} root={}>", self.id, self.is_root)
    }
}

/// Credentials of a linked external timeline account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterUser {
    pub id: Uuid,
    pub username: String,
    pub password: String,
}

impl TwitterUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Copy with the password blanked.
    pub fn redacted(&self) -> Self {
        Self {
            password: String::new(),
            ..self.clone()
        }
    }
}

// Keep credentials out of debug logs.
impl fmt::Debug for TwitterUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TwitterUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
