//! Process exit codes.

use oracle_config::ConfigError;
use oracle_llm::FactoryError;
use std::process::ExitCode;

use crate::modules::{InvalidModuleArgs, UnknownModule};

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Approved and done, or a read-only command
    Success = 0,
    /// Unexpected failure
    Failure = 1,
    /// Invalid configuration or unknown module
    InvalidConfig = 2,
    /// Locked out, including a fresh denial
    LockedOut = 3,
    /// Denied by the fallback after the configured backend failed
    Degraded = 4,
    /// Ctrl-C while waiting on the oracle
    Interrupted = 130,
}

impl ExitStatus {
    /// Numeric code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Classify an error that escaped a command
    pub fn for_error(error: &anyhow::Error) -> Self {
        let invalid = error.chain().any(|cause| {
            cause.is::<ConfigError>()
                || cause.is::<FactoryError>()
                || cause.is::<UnknownModule>()
                || cause.is::<InvalidModuleArgs>()
        });
        if invalid {
            ExitStatus::InvalidConfig
        } else {
            ExitStatus::Failure
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
