//! Per-invocation wiring: config file, overrides, identity and the gate.

use anyhow::Result;
use oracle_config::{
    OracleConfig, ProviderConfig, ProviderKind, ProviderOverrides, SecretsFile,
};
use oracle_core::{FileLockoutStore, Gate, IdentityKey, SystemClock};
use oracle_llm::{create_engine, ConsultationEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::cli::Cli;

/// Everything a gated command needs, resolved once from the command line.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: OracleConfig,
    pub overrides: ProviderOverrides,
    pub identity: IdentityKey,
    pub state_dir: PathBuf,
}

impl AppContext {
    /// Load the config file and apply command line overrides.
    ///
    /// Touches neither the lockout store nor any backend.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = OracleConfig::load(cli.config.as_deref())?;

        let provider = cli
            .provider
            .as_deref()
            .map(str::parse::<ProviderKind>)
            .transpose()?;
        let overrides = ProviderOverrides {
            provider,
            model: cli.model.clone(),
            base_url: cli.base_url.clone(),
            timeout_secs: cli.timeout_secs,
        };

        let state_dir = config.state_dir(cli.state_dir.as_deref())?;
        let identity = IdentityKey::resolve(cli.identity.as_deref());
        debug!(identity = %identity, state_dir = %state_dir.display(), "Resolved context");

        Ok(Self {
            config,
            overrides,
            identity,
            state_dir,
        })
    }

    /// Gate over the on-disk lockout store and the wall clock
    pub fn gate(&self) -> Gate {
        let store = FileLockoutStore::open(&self.state_dir);
        Gate::new(Arc::new(store), Arc::new(SystemClock))
    }

    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let secrets = SecretsFile::new();
        Ok(self.config.provider_config(&self.overrides, &secrets)?)
    }

    /// Consultation engine for the resolved backend
    pub fn engine(&self) -> Result<ConsultationEngine> {
        let config = self.provider_config()?;
        Ok(create_engine(&config)?)
    }
}
