//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the oracle configuration.
///
/// Every variant is fatal for the invocation: nothing is consulted and the
/// lockout store is never touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested provider name is not one of the known backends.
    #[error("Unknown provider: '{name}'. Choose from: local-model (ollama), local-gui (lmstudio), cloud-a (openai), cloud-b (anthropic), offline")]
    UnknownProvider {
        /// The name that failed to parse
        name: String,
    },

    /// A cloud provider was selected without a credential.
    #[error("{provider} requires an API key (set {env_var} or store one in the secrets file)")]
    MissingCredential {
        /// Display name of the provider
        provider: &'static str,
        /// Environment variable that would supply the key
        env_var: &'static str,
    },

    /// The base url could not be parsed or has an unsupported scheme.
    #[error("Invalid base url '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected url
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// A field holds a value outside its accepted range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted name of the offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::OracleConfig`].
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Path that was being parsed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// No state directory was configured and no home directory exists.
    #[error("Could not determine a state directory (no home directory); pass --state-dir")]
    NoStateDir,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
