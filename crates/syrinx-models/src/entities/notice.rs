use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::BackendSource;
use crate::entities::user::User;
use crate::error::ModelResult;
use crate::persist::Persist;

/// A public post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub content: String,
    /// The notice this one reshares, if any.
    pub repeats: Option<Uuid>,
    pub date_publish: DateTime<Utc>,
}

impl Notice {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            repeats: None,
            date_publish: Utc::now(),
        }
    }

    /// A reshare of `original`, keeping its content.
    pub fn repeat(original: &Notice) -> Self {
        Self {
            repeats: Some(original.id),
            ..Self::new(original.content.clone())
        }
    }

    pub fn with_date_publish(mut self, date_publish: DateTime<Utc>) -> Self {
        self.date_publish = date_publish;
        self
    }

    /// Loads the reshared notice. `Ok(None)` when this is not a repeat.
    pub fn original(&self, source: &dyn BackendSource) -> ModelResult<Option<Notice>> {
        match self.repeats {
            Some(id) => Notice::find(source, &id.to_string()).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// A notice addressed to a single account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateNotice {
    pub notice: Notice,
    pub recipient: User,
    pub read: bool,
}

impl PrivateNotice {
    pub fn new(recipient: User, content: impl Into<String>) -> Self {
        Self {
            notice: Notice::new(content),
            recipient,
            read: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.notice.id
    }

    /// Flags the notice as read and persists the change.
    pub fn mark_read(&mut self, source: &dyn BackendSource) -> ModelResult<()> {
        self.read = true;
        *self = self.save(source)?;
        Ok(())
    }
}

impl fmt::Display for PrivateNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.notice.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_points_at_original() {
        let original = Notice::new("Hola");
        let repeat = Notice::repeat(&original);
        assert_eq!(repeat.repeats, Some(original.id));
        assert_ne!(repeat.id, original.id);
        assert_eq!(repeat.to_string(), "Hola");
    }

    #[test]
    fn private_notice_starts_unread() {
        let niko = User::new("nikola", "twitter.com").unwrap();
        let notice = PrivateNotice::new(niko.clone(), "Hello");
        assert!(!notice.read);
        assert_eq!(notice.recipient, niko);
    }
}
