mod common;

use common::{PlainHasher, local, memory_resolver, remote};
use syrinx_models::backends::{console, dummy, memory};
use syrinx_models::settings::MODEL_BACKEND;
use syrinx_models::{
    BackendSource, Entity, EntityKind, FollowCapability, LocalUser, ModelError, Notice,
    NoticeCapability, Persist, RemoteUser, Resolver, SharedBackend, Settings, User, UserList,
    builtin_registry,
};

#[test]
fn explicit_backend_beats_configuration() {
    let (resolver, memory) = memory_resolver();
    resolver.set_model_backend(dummy::MODULE_PATH);
    let shared: SharedBackend = memory.clone();

    let resolved = resolver.resolve(EntityKind::LocalUser, Some(&shared)).unwrap();
    assert_eq!(resolved.name(), "memory");
    assert_eq!(resolver.backend_for(EntityKind::LocalUser).unwrap().name(), "dummy");

    let tuxie = local("tuxie");
    tuxie.post_notice(&shared, &Notice::new("Hello")).unwrap();
    assert_eq!(tuxie.notices().len(&shared).unwrap(), 1);
    assert_eq!(tuxie.notices().len(&resolver).unwrap(), 0);
}

#[test]
fn unknown_module_fails_on_first_capability_call() {
    let (resolver, _) = memory_resolver();
    resolver.set_model_backend("syrinx.models.backends.nonexistent");
    let tuxie = local("tuxie");
    let omar = local("omar");

    let err = tuxie.follow(&resolver, &omar, None).unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(
        err.to_string(),
        "improperly configured: module `syrinx.models.backends.nonexistent` does not define a `LocalUserBackend` class"
    );
}

#[test]
fn unset_backend_is_not_configured() {
    let memory = syrinx_models::backends::MemoryBackend::new();
    let resolver = Resolver::new(builtin_registry(&memory), Settings::new());

    let err = LocalUser::find(&resolver, "tuxie").unwrap_err();

    assert!(matches!(err, ModelError::NotConfigured { setting: MODEL_BACKEND }));
}

#[test]
fn reconfiguration_applies_to_next_call() {
    let (resolver, _) = memory_resolver();
    let tuxie = local("tuxie");
    tuxie.post_notice(&resolver, &Notice::new("Hello")).unwrap();

    resolver.set_model_backend(console::MODULE_PATH);
    assert_eq!(tuxie.notices().len(&resolver).unwrap(), 0);

    resolver.set_model_backend(memory::MODULE_PATH);
    assert_eq!(tuxie.notices().len(&resolver).unwrap(), 1);
}

#[test]
fn resolver_clones_share_settings() {
    let (resolver, _) = memory_resolver();
    let clone = resolver.clone();

    clone.set_model_backend(dummy::MODULE_PATH);

    assert_eq!(resolver.active_module().as_deref(), Some(dummy::MODULE_PATH));
}

#[test]
fn dummy_accepts_writes_and_finds_nothing() {
    let memory = syrinx_models::backends::MemoryBackend::new();
    let settings = Settings::from_pairs([(MODEL_BACKEND, dummy::MODULE_PATH)]);
    let resolver = Resolver::new(builtin_registry(&memory), settings);
    let tuxie = local("tuxie");

    let saved = tuxie.save(&resolver).unwrap();
    assert_eq!(saved, tuxie);
    tuxie.follow(&resolver, &local("omar"), None).unwrap();

    assert!(LocalUser::find(&resolver, "tuxie").unwrap_err().is_not_found());
    assert_eq!(tuxie.following().len(&resolver).unwrap(), 0);
    assert_eq!(memory.entity_count().unwrap(), 0);
}

// -- Persistence lifecycle --

#[test]
fn save_find_delete() {
    let (resolver, _) = memory_resolver();
    let tuxie = local("tuxie");

    tuxie.save(&resolver).unwrap();
    let found = LocalUser::find(&resolver, "tuxie").unwrap();
    assert_eq!(found, tuxie);
    assert!(found.check_password(&PlainHasher, "passwd"));

    found.delete(&resolver).unwrap();
    assert!(LocalUser::find(&resolver, "tuxie").unwrap_err().is_not_found());
}

#[test]
fn load_or_builds_fresh_without_key() {
    let (resolver, _) = memory_resolver();
    remote("nikola", "twitter.com").save(&resolver).unwrap();

    let loaded = RemoteUser::load_or(&resolver, Some("nikola@twitter.com"), || {
        RemoteUser::new("other", "example.org")
    })
    .unwrap();
    assert_eq!(loaded.user.username(), "nikola");

    let fresh = RemoteUser::load_or(&resolver, None, || RemoteUser::new("omar", "mastodon.social"))
        .unwrap();
    assert_eq!(fresh.key(), "omar@mastodon.social");
    assert!(RemoteUser::find(&resolver, "omar@mastodon.social").is_err());
}

#[test]
fn any_account_loads_as_base_user() {
    let (resolver, _) = memory_resolver();
    local("tuxie").save(&resolver).unwrap();

    let user = User::find(&resolver, "tuxie").unwrap();
    assert_eq!(user.username(), "tuxie");

    let err = RemoteUser::find(&resolver, "tuxie").unwrap_err();
    assert!(matches!(err, ModelError::KindMismatch { .. }));
}

#[test]
fn deleting_owner_drops_its_collections() {
    let (resolver, memory) = memory_resolver();
    let tuxie = local("tuxie");
    let omar = local("omar");
    tuxie.save(&resolver).unwrap();
    tuxie.follow(&resolver, &omar, None).unwrap();
    tuxie.post_notice(&resolver, &Notice::new("Hello")).unwrap();

    tuxie.clone().delete(&resolver).unwrap();

    assert!(tuxie.following().is_empty(&resolver).unwrap());
    assert!(tuxie.notices().is_empty(&resolver).unwrap());
    // Notices outlive their author.
    assert_eq!(memory.entity_count().unwrap(), 1);
    // Edges held by other owners stay.
    assert_eq!(omar.followers().len(&resolver).unwrap(), 1);
}

#[test]
fn repeat_resolves_original() {
    let (resolver, _) = memory_resolver();
    let original = Notice::new("Hello").save(&resolver).unwrap();
    let repeat = Notice::repeat(&original);

    assert_eq!(repeat.original(&resolver).unwrap(), Some(original.clone()));
    assert_eq!(original.original(&resolver).unwrap(), None);
}

#[test]
fn lists_persist_as_plain_records() {
    let (resolver, _) = memory_resolver();
    let list = UserList::new("millencolin").muted(true).save(&resolver).unwrap();

    let found = UserList::find(&resolver, &list.key()).unwrap();
    assert!(found.muted);
    assert_eq!(found.owner, None);
}
