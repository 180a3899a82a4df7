//! # Oracle Configuration Library
//!
//! Configuration for the redteamoracle workspace: which decision backend to
//! consult, how to reach it, where its credentials come from, and where the
//! lockout state lives on disk.
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config file > built-in default.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oracle_config::{OracleConfig, ProviderOverrides, SecretsFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OracleConfig::load(None)?;
//!     let provider = config.provider_config(&ProviderOverrides::default(), &SecretsFile::new())?;
//!     println!("consulting {}", provider.kind);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod credentials;
mod error;
mod loader;
mod provider;

pub use credentials::{
    env_var_for_provider, resolve_api_key, ApiKey, CredentialError, CredentialResult,
    CredentialSource, CredentialStore, SecretsFile,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::{
    OfflineSection, OracleConfig, OracleSection, ProviderOverrides, StateSection,
    DEFAULT_TIMEOUT_SECS,
};
pub use provider::{OfflineSettings, ProviderConfig, ProviderKind, DEFAULT_DOOM_PROBABILITY};
