use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// The `(username, server)` pair that identifies an account.
///
/// An empty server denotes a local account. The string form is
/// `username@server`, or just `username` for local accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    username: String,
    server: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, server: impl Into<String>) -> ModelResult<Self> {
        let username = username.into();
        let server = server.into();
        validate_username(&username)?;
        validate_server(&server)?;
        Ok(Self { username, server })
    }

    pub fn local(username: impl Into<String>) -> ModelResult<Self> {
        Self::new(username, "")
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn is_local(&self) -> bool {
        self.server.is_empty()
    }

    /// Canonical string form, used as the key in relation collections.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

fn validate_username(username: &str) -> ModelResult<()> {
    if username.is_empty() {
        return Err(invalid(username, "username is empty"));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid(
            username,
            "username may only contain letters, digits, underscores or hyphens",
        ));
    }
    Ok(())
}

fn validate_server(server: &str) -> ModelResult<()> {
    if server.contains('@') || server.chars().any(char::is_whitespace) {
        return Err(invalid(server, "server may not contain `@` or whitespace"));
    }
    Ok(())
}

fn invalid(value: &str, reason: &'static str) -> ModelError {
    ModelError::InvalidIdentity {
        value: value.to_string(),
        reason,
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.server.is_empty() {
            f.write_str(&self.username)
        } else {
            write!(f, "{}@{}", self.username, self.server)
        }
    }
}

impl FromStr for Identity {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.split_once('@') {
            Some((username, server)) => Self::new(username, server),
            None => Self::local(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_omits_empty_server() {
        assert_eq!(Identity::local("tuxie").unwrap().to_string(), "tuxie");
        assert_eq!(
            Identity::new("nikola", "twitter.com").unwrap().to_string(),
            "nikola@twitter.com"
        );
    }

    #[test]
    fn parses_back_to_same_pair() {
        for (username, server) in [("tuxie", ""), ("nikola", "twitter.com"), ("wiki-leaks_1", "identi.ca")] {
            let identity = Identity::new(username, server).unwrap();
            let parsed: Identity = identity.to_string().parse().unwrap();
            assert_eq!(parsed, identity);
            assert_eq!(parsed.username(), username);
            assert_eq!(parsed.server(), server);
        }
    }

    #[test]
    fn rejects_malformed_parts() {
        assert!(Identity::local("").is_err());
        assert!(Identity::local("tu xie").is_err());
        assert!(Identity::new("tuxie", "a@b").is_err());
        assert!("a@b@c".parse::<Identity>().is_err());
    }

    #[test]
    fn locality() {
        assert!(Identity::local("omar").unwrap().is_local());
        assert!(!Identity::new("omar", "identi.ca").unwrap().is_local());
    }
}
