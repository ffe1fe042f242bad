//! Domain model for a small federated microblogging network.
//!
//! Entities are plain data. Storage is delegated to a [`ModelBackend`]
//! picked per call by a [`BackendSource`]: either a [`Resolver`] reading the
//! active module from [`Settings`], or an explicit [`SharedBackend`].

pub mod backend;
pub mod backends;
pub mod capability;
pub mod entities;
pub mod error;
pub mod identity;
pub mod kind;
pub mod password;
pub mod persist;
pub mod record;
pub mod relation;
pub mod resolver;
pub mod settings;

pub use backend::{BackendSource, ModelBackend, SharedBackend};
pub use capability::{FollowCapability, ListOwnerCapability, NoticeCapability, RelationOwner};
pub use entities::{
    AdminUser, LocalUser, LocalUserBuilder, Notice, PrivateNotice, RemoteUser, TwitterUser, User,
    UserConfig, UserList,
};
pub use error::{ModelError, ModelResult};
pub use identity::Identity;
pub use kind::EntityKind;
pub use password::{Argon2Hasher, PasswordHasher};
pub use persist::Persist;
pub use record::{Account, Entity, Model, Record};
pub use relation::{Namespace, Relation};
pub use resolver::{BackendModule, Registry, Resolver};
pub use settings::Settings;

/// Registry holding the built-in in-process modules: dummy, console and
/// the given memory store.
pub fn builtin_registry(memory: &std::sync::Arc<backends::MemoryBackend>) -> Registry {
    Registry::new()
        .register(backends::dummy::module())
        .register(backends::console::module())
        .register(memory.module())
}
