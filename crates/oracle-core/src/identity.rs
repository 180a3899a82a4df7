//! Identity key derivation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable that overrides the derived identity
pub const IDENTITY_ENV: &str = "REDTEAMORACLE_IDENTITY";

/// The unit of lockout scoping: `user@host` unless overridden.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Use an explicit key. Surrounding whitespace is dropped.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    /// Explicit key if given, then [`IDENTITY_ENV`], then the derived key.
    /// Blank values are skipped.
    pub fn resolve(explicit: Option<&str>) -> Self {
        explicit
            .map(Self::new)
            .filter(|key| !key.0.is_empty())
            .or_else(|| {
                std::env::var(IDENTITY_ENV)
                    .ok()
                    .map(Self::new)
                    .filter(|key| !key.0.is_empty())
            })
            .unwrap_or_else(Self::from_environment)
    }

    /// Derive the key for the invoking principal from the local user name and
    /// the machine host name.
    pub fn from_environment() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let host = hostname::get()
            .ok()
            .map(|h| h.to_string_lossy().into_owned())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        Self::new(format!("{}@{}", user, host))
    }

    /// The key as stored on disk
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_is_trimmed() {
        assert_eq!(IdentityKey::new("  u1 ").as_str(), "u1");
    }

    #[test]
    fn explicit_key_wins_over_derivation() {
        assert_eq!(IdentityKey::resolve(Some("u1")).as_str(), "u1");
    }

    #[test]
    fn blank_explicit_key_is_ignored() {
        let key = IdentityKey::resolve(Some("   "));
        assert!(!key.as_str().is_empty());
    }

    #[test]
    fn derived_key_has_user_and_host() {
        let key = IdentityKey::from_environment();
        let (user, host) = key.as_str().split_once('@').expect("user@host");
        assert!(!user.is_empty());
        assert!(!host.is_empty());
    }
}
