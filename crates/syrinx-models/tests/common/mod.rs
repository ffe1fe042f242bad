#![allow(dead_code)]

use std::sync::Arc;

use syrinx_models::backends::{MemoryBackend, memory};
use syrinx_models::settings::MODEL_BACKEND;
use syrinx_models::{
    LocalUser, ModelResult, PasswordHasher, RemoteUser, Resolver, Settings, builtin_registry,
};

/// Stores `salt:value`; good enough to exercise the password flow.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn generate_salt(&self) -> String {
        "pepper".to_string()
    }

    fn hash(&self, value: &str, salt: &str) -> ModelResult<String> {
        Ok(format!("{salt}:{value}"))
    }

    fn verify(&self, value: &str, token: &str) -> bool {
        token.split_once(':').is_some_and(|(_, stored)| stored == value)
    }
}

/// A resolver whose active module is a fresh memory store.
pub fn memory_resolver() -> (Resolver, Arc<MemoryBackend>) {
    let memory = MemoryBackend::new();
    let settings = Settings::from_pairs([(MODEL_BACKEND, memory::MODULE_PATH)]);
    (Resolver::new(builtin_registry(&memory), settings), memory)
}

pub fn local(username: &str) -> LocalUser {
    LocalUser::builder(username)
        .password("passwd")
        .build(&PlainHasher)
        .unwrap()
}

pub fn remote(username: &str, server: &str) -> RemoteUser {
    RemoteUser::new(username, server).unwrap()
}
