//! API keys for the cloud backends.
//!
//! A key comes from the backend's environment variable (`OPENAI_API_KEY`,
//! `ANTHROPIC_API_KEY`) or, failing that, from
//! `~/.config/redteamoracle/secrets.toml`:
//!
//! ```toml
//! [providers.openai]
//! api_key = "sk-..."
//!
//! [providers.anthropic]
//! api_key = "sk-ant-..."
//! ```
//!
//! The file is only ever read. It should be `0o600`; anything looser is
//! reported with a warning. Resolved keys are wrapped in [`ApiKey`], which
//! prints as `<redacted>`.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An API key that refuses to print itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building an outbound request header
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Default, Deserialize)]
struct SecretsDocument {
    #[serde(default)]
    providers: HashMap<String, ProviderEntry>,
}

#[derive(Debug, Deserialize)]
struct ProviderEntry {
    api_key: Option<String>,
}

/// Failure reading a credential source
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The secrets file exists but could not be read
    #[error("cannot read secrets file {path}: {source}")]
    Io {
        /// Secrets file location
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The secrets file is not valid TOML of the expected shape
    #[error("secrets file {path} is malformed: {source}")]
    Parse {
        /// Secrets file location
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },
}

/// Result type for credential lookups
pub type CredentialResult<T> = Result<T, CredentialError>;

/// A place API keys can be looked up, keyed by credential name
/// (`openai`, `anthropic`).
pub trait CredentialStore {
    /// The stored key for `provider`, if any
    fn get(&self, provider: &str) -> CredentialResult<Option<String>>;
}

/// The `secrets.toml` credential store
#[derive(Debug, Clone)]
pub struct SecretsFile {
    path: PathBuf,
}

impl SecretsFile {
    /// Secrets file at the default location
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Secrets file at `path`
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// `$XDG_CONFIG_HOME/redteamoracle/secrets.toml`
    pub fn default_path() -> PathBuf {
        crate::loader::config_dir().join("secrets.toml")
    }

    /// Location of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> CredentialResult<SecretsDocument> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SecretsDocument::default())
            }
            Err(source) => {
                return Err(CredentialError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        self.warn_if_exposed();

        toml::from_str(&content).map_err(|source| CredentialError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    #[cfg(unix)]
    fn warn_if_exposed(&self) {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(meta) = std::fs::metadata(&self.path) {
            let mode = meta.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                warn!(
                    "Secrets file {} is readable by other users (mode {:o}); chmod 600 it",
                    self.path.display(),
                    mode
                );
            }
        }
    }

    #[cfg(not(unix))]
    fn warn_if_exposed(&self) {}
}

impl Default for SecretsFile {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for SecretsFile {
    fn get(&self, provider: &str) -> CredentialResult<Option<String>> {
        Ok(self
            .load()?
            .providers
            .remove(provider)
            .and_then(|entry| entry.api_key))
    }
}

/// Environment variable holding the key for a credential name
pub fn env_var_for_provider(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openai" | "chatgpt" => Some("OPENAI_API_KEY"),
        "anthropic" | "claude" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

/// Where a resolved key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// An environment variable
    EnvVar,
    /// The secrets file
    Store,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::EnvVar => write!(f, "env"),
            CredentialSource::Store => write!(f, "file"),
        }
    }
}

/// Key for `provider`: a non-empty environment variable wins, then `store`.
///
/// An unreadable store is logged and treated as holding nothing, so the
/// caller reports a missing credential instead of failing on the file.
pub fn resolve_api_key(
    provider: &str,
    store: &dyn CredentialStore,
) -> Option<(ApiKey, CredentialSource)> {
    let from_env = env_var_for_provider(provider)
        .and_then(|var| std::env::var(var).ok().map(|value| (var, value)))
        .filter(|(_, value)| !value.is_empty());
    if let Some((var, value)) = from_env {
        debug!("Using {} key from {}", provider, var);
        return Some((ApiKey::new(value), CredentialSource::EnvVar));
    }

    match store.get(provider) {
        Ok(Some(key)) if !key.is_empty() => {
            debug!("Using {} key from the secrets file", provider);
            Some((ApiKey::new(key), CredentialSource::Store))
        }
        Ok(_) => None,
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn secrets(content: &str) -> (SecretsFile, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, content).expect("write secrets");
        (SecretsFile::with_path(path), dir)
    }

    #[test]
    fn reads_keys_by_credential_name() {
        let (store, _dir) = secrets(
            "[providers.openai]\napi_key = \"sk-one\"\n\n[providers.anthropic]\napi_key = \"sk-two\"\n",
        );
        assert_eq!(store.get("openai").unwrap().as_deref(), Some("sk-one"));
        assert_eq!(store.get("anthropic").unwrap().as_deref(), Some("sk-two"));
        assert_eq!(store.get("mistral").unwrap(), None);
    }

    #[test]
    fn missing_file_holds_nothing() {
        let dir = TempDir::new().unwrap();
        let store = SecretsFile::with_path(dir.path().join("absent.toml"));
        assert_eq!(store.get("openai").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn malformed_file_is_an_error_naming_the_path() {
        let (store, _dir) = secrets("not valid toml {{{");
        let err = store.get("openai").unwrap_err();
        assert!(matches!(err, CredentialError::Parse { .. }));
        assert!(err.to_string().contains("secrets.toml"));
    }

    #[test]
    fn api_key_is_redacted() {
        let key = ApiKey::new("sk-super-secret");
        assert_eq!(format!("{:?}", key), "ApiKey(<redacted>)");
        assert_eq!(key.to_string(), "<redacted>");
        assert_eq!(key.expose_secret(), "sk-super-secret");
    }

    #[test]
    #[serial]
    fn env_var_wins_over_file() {
        let (store, _dir) = secrets("[providers.openai]\napi_key = \"file-key\"\n");

        std::env::set_var("OPENAI_API_KEY", "env-key");
        let (key, source) = resolve_api_key("openai", &store).expect("resolved");
        std::env::remove_var("OPENAI_API_KEY");

        assert_eq!(key.expose_secret(), "env-key");
        assert_eq!(source, CredentialSource::EnvVar);
    }

    #[test]
    #[serial]
    fn empty_env_var_falls_through_to_file() {
        let (store, _dir) = secrets("[providers.openai]\napi_key = \"file-key\"\n");

        std::env::set_var("OPENAI_API_KEY", "");
        let resolved = resolve_api_key("openai", &store);
        std::env::remove_var("OPENAI_API_KEY");

        let (key, source) = resolved.expect("resolved");
        assert_eq!(key.expose_secret(), "file-key");
        assert_eq!(source, CredentialSource::Store);
    }

    #[test]
    #[serial]
    fn malformed_file_resolves_to_nothing() {
        let (store, _dir) = secrets("[providers.anthropic\napi_key=");
        std::env::remove_var("ANTHROPIC_API_KEY");
        assert!(resolve_api_key("anthropic", &store).is_none());
    }

    #[test]
    fn env_var_mappings() {
        assert_eq!(env_var_for_provider("openai"), Some("OPENAI_API_KEY"));
        assert_eq!(env_var_for_provider("ChatGPT"), Some("OPENAI_API_KEY"));
        assert_eq!(env_var_for_provider("claude"), Some("ANTHROPIC_API_KEY"));
        assert_eq!(env_var_for_provider("ollama"), None);
    }
}
