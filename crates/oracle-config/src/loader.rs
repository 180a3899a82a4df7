//! TOML config file loading and resolution into a [`ProviderConfig`].
//!
//! ```toml
//! # ~/.config/redteamoracle/config.toml
//! [oracle]
//! provider = "local-model"
//! model = "llama3"
//! base_url = "http://localhost:11434"
//! timeout_secs = 10
//!
//! [offline]
//! doom_probability = 0.42
//! seed = 7
//!
//! [state]
//! dir = "/var/lib/redteamoracle"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::credentials::{env_var_for_provider, resolve_api_key, CredentialStore};
use crate::error::{ConfigError, ConfigResult};
use crate::provider::{parse_base_url, OfflineSettings, ProviderConfig, ProviderKind};

/// Default bound on the primary provider call
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// `$XDG_CONFIG_HOME/redteamoracle`
pub(crate) fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        })
        .join("redteamoracle")
}

/// `[oracle]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleSection {
    /// Backend to consult
    pub provider: Option<ProviderKind>,
    /// Model name
    pub model: Option<String>,
    /// Endpoint override
    pub base_url: Option<String>,
    /// Primary call timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// `[offline]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfflineSection {
    /// Denial probability in `[0, 1]`
    pub doom_probability: Option<f64>,
    /// Fixed RNG seed
    pub seed: Option<u64>,
}

/// `[state]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateSection {
    /// Directory holding the lockout store
    pub dir: Option<PathBuf>,
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleConfig {
    /// Provider selection
    pub oracle: OracleSection,
    /// Offline oracle tuning
    pub offline: OfflineSection,
    /// Lockout state location
    pub state: StateSection,
}

/// Values supplied on the command line (or through their env fallbacks).
#[derive(Debug, Clone, Default)]
pub struct ProviderOverrides {
    /// `--provider`
    pub provider: Option<ProviderKind>,
    /// `--model`
    pub model: Option<String>,
    /// `--base-url`
    pub base_url: Option<String>,
    /// `--timeout`
    pub timeout_secs: Option<u64>,
}

impl OracleConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load the config file.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !required && !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Offline oracle settings, validated
    pub fn offline_settings(&self) -> ConfigResult<OfflineSettings> {
        let mut settings = OfflineSettings::default();
        if let Some(p) = self.offline.doom_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::InvalidValue {
                    field: "offline.doom_probability",
                    reason: format!("{} is outside [0, 1]", p),
                });
            }
            settings.doom_probability = p;
        }
        settings.seed = self.offline.seed;
        Ok(settings)
    }

    /// Resolve the provider configuration for this invocation.
    pub fn provider_config(
        &self,
        overrides: &ProviderOverrides,
        store: &dyn CredentialStore,
    ) -> ConfigResult<ProviderConfig> {
        let kind = overrides
            .provider
            .or(self.oracle.provider)
            .unwrap_or_default();
        let offline = self.offline_settings()?;

        let timeout_secs = overrides
            .timeout_secs
            .or(self.oracle.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "oracle.timeout_secs",
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        if kind == ProviderKind::Offline {
            let mut config = ProviderConfig::offline(offline);
            config.timeout = Duration::from_secs(timeout_secs);
            return Ok(config);
        }

        let raw_url = overrides
            .base_url
            .as_deref()
            .or(self.oracle.base_url.as_deref())
            .or(kind.default_base_url());
        let base_url = raw_url.map(parse_base_url).transpose()?;

        let model = overrides
            .model
            .clone()
            .or_else(|| self.oracle.model.clone())
            .unwrap_or_else(|| kind.default_model().to_string());

        let credential = match kind.credential_name() {
            Some(name) => {
                let (key, source) =
                    resolve_api_key(name, store).ok_or(ConfigError::MissingCredential {
                        provider: kind.display_name(),
                        env_var: env_var_for_provider(name).unwrap_or("API_KEY"),
                    })?;
                debug!("Using {} credential from {}", kind.display_name(), source);
                Some(key)
            }
            None => None,
        };

        Ok(ProviderConfig {
            kind,
            base_url,
            model,
            credential,
            timeout: Duration::from_secs(timeout_secs),
            offline,
        })
    }

    /// Directory for the lockout store: override, then `[state] dir`, then
    /// `~/.redteamoracle`.
    pub fn state_dir(&self, cli_override: Option<&Path>) -> ConfigResult<PathBuf> {
        if let Some(dir) = cli_override {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.state.dir {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".redteamoracle"))
            .ok_or(ConfigError::NoStateDir)
    }
}
