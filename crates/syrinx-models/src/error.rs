use thiserror::Error;

use crate::kind::EntityKind;

/// Errors surfaced by the model layer and every backend behind it.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// No backend module path is configured.
    #[error("improperly configured: setting `{setting}` is not set")]
    NotConfigured { setting: &'static str },

    /// The configured module is unknown, or it does not define the class.
    #[error("improperly configured: module `{module}` does not define a `{class}` class")]
    Configuration { module: String, class: String },

    /// The backend exists but declines this operation.
    #[error("{backend} backend does not support `{operation}`")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("{kind} `{key}` not found")]
    NotFound { kind: EntityKind, key: String },

    /// An append-only collection already holds the key.
    #[error("`{key}` is already in {relation}")]
    AlreadyExists { relation: String, key: String },

    #[error("invalid identity `{value}`: {reason}")]
    InvalidIdentity { value: String, reason: &'static str },

    #[error("expected a {expected} record, got {found}")]
    KindMismatch {
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("password hashing failed: {0}")]
    Password(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ModelError {
    pub fn configuration(module: impl Into<String>, class: impl Into<String>) -> Self {
        Self::Configuration {
            module: module.into(),
            class: class.into(),
        }
    }

    pub fn unsupported(backend: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { backend, operation }
    }

    pub fn not_found(kind: EntityKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// True for both flavours of misconfiguration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured { .. } | Self::Configuration { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_message_names_module_and_class() {
        let err = ModelError::configuration("syrinx.models.backends.nope", "LocalUserBackend");
        let message = err.to_string();
        assert!(message.contains("syrinx.models.backends.nope"));
        assert!(message.contains("LocalUserBackend"));
        assert!(err.is_configuration());
        assert!(!err.is_not_found());
    }

    #[test]
    fn outcomes_are_distinct() {
        let missing = ModelError::not_found(EntityKind::Notice, "abc");
        let partial = ModelError::unsupported("partial", "follow");
        let unset = ModelError::NotConfigured { setting: "MODEL_BACKEND" };

        assert!(missing.is_not_found() && !missing.is_configuration());
        assert!(partial.is_unsupported() && !partial.is_not_found());
        assert!(unset.is_configuration() && !unset.is_unsupported());
    }
}
