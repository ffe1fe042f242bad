use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::RelationOwner;
use crate::entities::profile::{AdminUser, TwitterUser, UserConfig};
use crate::error::{ModelError, ModelResult};
use crate::identity::Identity;
use crate::kind::EntityKind;
use crate::password::PasswordHasher;
use crate::relation::{Namespace, Relation};

// -- User --

/// Fields shared by every account kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub identity: Identity,
    pub location: Option<String>,
    pub profile_uri: Option<String>,
    pub created: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, server: impl Into<String>) -> ModelResult<Self> {
        Ok(Self::from_identity(Identity::new(username, server)?))
    }

    pub fn from_identity(identity: Identity) -> Self {
        Self {
            identity,
            location: None,
            profile_uri: None,
            created: Utc::now(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_profile_uri(mut self, profile_uri: impl Into<String>) -> Self {
        self.profile_uri = Some(profile_uri.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    pub fn username(&self) -> &str {
        self.identity.username()
    }

    pub fn server(&self) -> &str {
        self.identity.server()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.identity.fmt(f)
    }
}

// -- RemoteUser --

/// An account hosted on another server. It can be followed, messaged and
/// listed, but never acts locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub user: User,
    pub name: Option<String>,
}

impl RemoteUser {
    pub fn new(username: impl Into<String>, server: impl Into<String>) -> ModelResult<Self> {
        let user = User::new(username, server)?;
        if user.identity.is_local() {
            return Err(ModelError::InvalidIdentity {
                value: user.identity.to_string(),
                reason: "remote accounts need a server",
            });
        }
        Ok(Self { user, name: None })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_profile_uri(mut self, profile_uri: impl Into<String>) -> Self {
        self.user.profile_uri = Some(profile_uri.into());
        self
    }
}

impl fmt::Display for RemoteUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.user.fmt(f)
    }
}

// -- LocalUser --

/// An account hosted here. The only kind that follows, owns lists and
/// posts notices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalUser {
    pub user: User,
    /// Salted hash produced by a [`PasswordHasher`]; never the plaintext.
    password: Option<String>,
    salt: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub date_joined: DateTime<Utc>,
    pub user_config: Option<UserConfig>,
    pub admin_user: Option<AdminUser>,
    pub twitter_user: Option<TwitterUser>,
}

impl LocalUser {
    pub fn builder(username: impl Into<String>) -> LocalUserBuilder {
        LocalUserBuilder::new(username)
    }

    pub fn identity(&self) -> &Identity {
        &self.user.identity
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn set_password(&mut self, hasher: &dyn PasswordHasher, value: &str) -> ModelResult<()> {
        self.password = Some(hasher.hash(value, &self.salt)?);
        Ok(())
    }

    pub fn check_password(&self, hasher: &dyn PasswordHasher, value: &str) -> bool {
        self.password
            .as_deref()
            .is_some_and(|token| hasher.verify(value, token))
    }

    /// Copy safe to display: no password hash, no salt and no linked
    /// account password.
    pub fn redacted(&self) -> Self {
        Self {
            password: None,
            salt: String::new(),
            twitter_user: self.twitter_user.as_ref().map(TwitterUser::redacted),
            ..self.clone()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.admin_user.is_some()
    }

    pub fn followers(&self) -> Relation {
        self.owned(Namespace::Followers)
    }

    pub fn following(&self) -> Relation {
        self.owned(Namespace::Following)
    }

    pub fn lists(&self) -> Relation {
        self.owned(Namespace::Lists)
    }

    pub fn notices(&self) -> Relation {
        self.owned(Namespace::Notices)
    }

    pub fn private_notices(&self) -> Relation {
        self.owned(Namespace::PrivateNotices)
    }
}

impl RelationOwner for LocalUser {
    fn owned(&self, namespace: Namespace) -> Relation {
        Relation::new(EntityKind::LocalUser, self.user.identity.key(), namespace)
    }
}

impl fmt::Display for LocalUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.user.fmt(f)
    }
}

#[derive(Debug)]
pub struct LocalUserBuilder {
    username: String,
    password: Option<String>,
    salt: Option<String>,
    location: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    bio: Option<String>,
    status: Option<String>,
    email: Option<String>,
    web: Option<String>,
    date_joined: Option<DateTime<Utc>>,
    user_config: Option<UserConfig>,
    admin_user: Option<AdminUser>,
    twitter_user: Option<TwitterUser>,
}

impl LocalUserBuilder {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
            salt: None,
            location: None,
            first_name: None,
            last_name: None,
            bio: None,
            status: None,
            email: None,
            web: None,
            date_joined: None,
            user_config: None,
            admin_user: None,
            twitter_user: None,
        }
    }

    /// Plaintext password; hashed in [`build`](Self::build).
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn web(mut self, web: impl Into<String>) -> Self {
        self.web = Some(web.into());
        self
    }

    pub fn date_joined(mut self, date_joined: DateTime<Utc>) -> Self {
        self.date_joined = Some(date_joined);
        self
    }

    pub fn user_config(mut self, user_config: UserConfig) -> Self {
        self.user_config = Some(user_config);
        self
    }

    pub fn admin_user(mut self, admin_user: AdminUser) -> Self {
        self.admin_user = Some(admin_user);
        self
    }

    pub fn twitter_user(mut self, twitter_user: TwitterUser) -> Self {
        self.twitter_user = Some(twitter_user);
        self
    }

    pub fn build(self, hasher: &dyn PasswordHasher) -> ModelResult<LocalUser> {
        let mut user = User::from_identity(Identity::local(self.username)?);
        user.location = self.location;

        let mut local = LocalUser {
            user,
            password: None,
            salt: self.salt.unwrap_or_else(|| hasher.generate_salt()),
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            status: self.status,
            email: self.email,
            web: self.web,
            date_joined: self.date_joined.unwrap_or_else(Utc::now),
            user_config: self.user_config,
            admin_user: self.admin_user,
            twitter_user: self.twitter_user,
        };
        if let Some(password) = self.password {
            local.set_password(hasher, &password)?;
        }
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::tests::ReversingHasher;
    use crate::record::Record;

    #[test]
    fn password_is_stored_hashed() {
        let tuxie = LocalUser::builder("tuxie")
            .password("passwd")
            .email("alvaro@mourino.net")
            .build(&ReversingHasher)
            .unwrap();

        assert_ne!(tuxie.password_hash(), Some("passwd"));
        assert!(tuxie.check_password(&ReversingHasher, "passwd"));
        assert!(!tuxie.check_password(&ReversingHasher, "wrong"));
    }

    #[test]
    fn missing_password_never_verifies() {
        let anon = LocalUser::builder("anon").build(&ReversingHasher).unwrap();
        assert!(anon.password_hash().is_none());
        assert!(!anon.check_password(&ReversingHasher, ""));
    }

    #[test]
    fn explicit_salt_is_kept() {
        let omar = LocalUser::builder("omar")
            .salt("pepper")
            .password("passwd")
            .build(&ReversingHasher)
            .unwrap();
        assert_eq!(omar.salt(), "pepper");
    }

    #[test]
    fn redacted_copy_carries_no_secrets() {
        let tuxie = LocalUser::builder("tuxie")
            .salt("pepper")
            .password("passwd")
            .email("alvaro@mourino.net")
            .twitter_user(TwitterUser::new("tuxie", "5yr1nX"))
            .build(&ReversingHasher)
            .unwrap();

        let shown = tuxie.redacted();
        assert!(shown.password_hash().is_none());
        assert_eq!(shown.salt(), "");
        assert_eq!(shown.email.as_deref(), Some("alvaro@mourino.net"));
        let twitter = shown.twitter_user.as_ref().unwrap();
        assert_eq!(twitter.username, "tuxie");
        assert!(twitter.password.is_empty());

        let json = serde_json::to_string(&Record::LocalUser(tuxie).redacted()).unwrap();
        assert!(!json.contains("pepper"));
        assert!(!json.contains("5yr1nX"));
    }

    #[test]
    fn local_accounts_have_empty_server() {
        let tuxie = LocalUser::builder("tuxie").build(&ReversingHasher).unwrap();
        assert_eq!(tuxie.user.server(), "");
        assert_eq!(tuxie.to_string(), "tuxie");
    }

    #[test]
    fn remote_user_requires_server() {
        assert!(RemoteUser::new("nikola", "").is_err());
        let niko = RemoteUser::new("nikola", "twitter.com")
            .unwrap()
            .with_name("Nikola Šarčević");
        assert_eq!(niko.to_string(), "nikola@twitter.com");
    }

    #[test]
    fn relation_namespaces_do_not_collide() {
        let tuxie = LocalUser::builder("tuxie").build(&ReversingHasher).unwrap();
        assert_ne!(tuxie.followers(), tuxie.following());
        assert_eq!(tuxie.followers().owner(), tuxie.following().owner());
    }

    #[test]
    fn same_pair_same_identity_key() {
        let a = User::new("tuxie", "identi.ca").unwrap();
        let b = User::new("tuxie", "identi.ca").unwrap().with_location("Montevideo, UY");
        assert_eq!(a.identity.key(), b.identity.key());
    }
}
