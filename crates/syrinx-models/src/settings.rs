use std::collections::HashMap;

/// Setting naming the active backend module.
pub const MODEL_BACKEND: &str = "MODEL_BACKEND";
/// SQLite file used by the persistent backend.
pub const DB_PATH: &str = "DB_PATH";
/// Host name of this node.
pub const SERVER_URI: &str = "SERVER_URI";

/// Prefix stripped from environment variables by [`Settings::from_env`].
pub const ENV_PREFIX: &str = "SYRINX_";

pub const DB_PATH_DEFAULT: &str = "syrinx.db";

/// Flat key/value settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Reads every `SYRINX_*` variable, stripping the prefix.
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|stripped| (stripped.to_string(), value))
        }))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn model_backend(&self) -> Option<&str> {
        self.get(MODEL_BACKEND)
    }

    pub fn db_path(&self) -> &str {
        self.get(DB_PATH).unwrap_or(DB_PATH_DEFAULT)
    }

    pub fn server_uri(&self) -> Option<&str> {
        self.get(SERVER_URI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_count_as_unset() {
        let settings = Settings::from_pairs([(MODEL_BACKEND, "")]);
        assert_eq!(settings.model_backend(), None);
    }

    #[test]
    fn db_path_has_default() {
        assert_eq!(Settings::new().db_path(), DB_PATH_DEFAULT);
        let settings = Settings::from_pairs([(DB_PATH, "/tmp/s.db")]);
        assert_eq!(settings.db_path(), "/tmp/s.db");
    }

    #[test]
    fn set_overrides() {
        let mut settings = Settings::from_pairs([(MODEL_BACKEND, "a")]);
        settings.set(MODEL_BACKEND, "b");
        assert_eq!(settings.model_backend(), Some("b"));
    }
}
