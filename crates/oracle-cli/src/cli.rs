use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors (default)
    Warn,
    /// Verdicts and lockouts
    Info,
    /// Request plumbing
    Debug,
    /// Everything
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "redteamoracle")]
#[command(about = "redteamoracle - the pentest framework that asks the oracle first")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Decision backend: local-model (ollama), local-gui (lmstudio), cloud-a (openai), cloud-b (anthropic), offline
    #[arg(short = 'p', long, global = true, env = "REDTEAMORACLE_PROVIDER")]
    pub provider: Option<String>,

    /// Model name (overrides config file)
    #[arg(short = 'm', long, global = true, env = "REDTEAMORACLE_MODEL")]
    pub model: Option<String>,

    /// Backend base url (overrides config file)
    #[arg(short = 'u', long, global = true, env = "REDTEAMORACLE_BASE_URL")]
    pub base_url: Option<String>,

    /// Provider timeout in seconds (default: 10)
    #[arg(long = "timeout", global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Config file path (defaults to ~/.config/redteamoracle/config.toml)
    #[arg(short = 'C', long, global = true, env = "REDTEAMORACLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Lockout state directory (defaults to ~/.redteamoracle)
    #[arg(long, global = true, env = "REDTEAMORACLE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Identity key for lockout scoping (defaults to user@host, or REDTEAMORACLE_IDENTITY)
    #[arg(long, global = true)]
    pub identity: Option<String>,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses RUST_LOG or defaults to 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ask the oracle whether today is your day
    Oracle,

    /// Run a module against a target (the oracle decides first)
    Run {
        /// Module to run (see `modules`)
        #[arg(value_name = "MODULE")]
        module: String,

        /// Target host/domain/IP
        #[arg(short = 't', long)]
        target: String,

        /// Port range for the scan module: top-100, 22,80,443 or 1-1024
        #[arg(long, default_value = "top-100")]
        ports: String,

        /// Specific CVE to target (exploit module)
        #[arg(long)]
        cve: Option<String>,
    },

    /// Show whether you are currently locked out
    Status,

    /// List available modules
    Modules,

    /// Clear a lockout
    #[command(hide = true)]
    Unlock {
        /// Confirm you know what you're doing
        #[arg(long, required = true)]
        confirm: bool,

        /// Wipe all lockout state, including an unreadable state file
        #[arg(long)]
        all: bool,
    },
}
