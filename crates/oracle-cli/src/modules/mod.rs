//! Module dispatcher.
//!
//! The built-in modules produce simulated reports; nothing here opens a
//! socket. A module only ever runs after the gate has approved.

mod exploit;
mod osint;
mod recon;
mod scan;

pub use exploit::ExploitModule;
pub use osint::OsintModule;
pub use recon::ReconModule;
pub use scan::{PortSpec, ScanModule};

use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::Tabled;

/// Default author credited on built-in modules
pub const DEFAULT_AUTHOR: &str = "The Oracle";

/// Arguments passed from `run` to a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArgs {
    /// Target host/domain/IP
    pub target: String,
    /// Port selection (scan)
    pub ports: String,
    /// CVE to focus on (exploit)
    pub cve: Option<String>,
}

/// Tabular output of a module run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReport {
    /// Table heading
    pub title: String,
    /// Column names
    pub columns: Vec<String>,
    /// One entry per row, same width as `columns`
    pub rows: Vec<Vec<String>>,
    /// Lines printed after the table
    pub notes: Vec<String>,
}

impl ModuleReport {
    /// Empty report with a title and column names
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Append a row
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Append a trailing note
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Render the table as text
    pub fn render_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.clone());
        for row in &self.rows {
            builder.push_record(row.clone());
        }
        builder.build().with(Style::rounded()).to_string()
    }
}

/// A security module the gate protects
pub trait SecurityModule: Send + Sync {
    /// Name used on the command line
    fn name(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// Author credit
    fn author(&self) -> &'static str {
        DEFAULT_AUTHOR
    }

    /// Reject arguments this module cannot use. Runs before the oracle is
    /// consulted.
    fn validate(&self, _args: &ModuleArgs) -> Result<(), InvalidModuleArgs> {
        Ok(())
    }

    /// Run against `args.target`
    fn run(&self, args: &ModuleArgs) -> anyhow::Result<ModuleReport>;
}

/// Module arguments that cannot be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid arguments for {module}: {reason}")]
pub struct InvalidModuleArgs {
    /// Module that rejected them
    pub module: &'static str,
    /// Why
    pub reason: String,
}

/// Row of the `modules` listing
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct ModuleRecord {
    /// Module name
    #[tabled(rename = "Module")]
    pub name: &'static str,
    /// Description
    #[tabled(rename = "Description")]
    pub description: &'static str,
    /// Author
    #[tabled(rename = "Author")]
    pub author: &'static str,
}

/// Requested module does not exist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown module: '{name}'. Available: {}", available.join(", "))]
pub struct UnknownModule {
    /// Name as given
    pub name: String,
    /// Names that do exist
    pub available: Vec<&'static str>,
}

/// The fixed set of modules
pub struct ModuleRegistry {
    modules: Vec<Box<dyn SecurityModule>>,
}

impl ModuleRegistry {
    /// recon, scan, osint, exploit
    pub fn builtin() -> Self {
        Self {
            modules: vec![
                Box::new(ReconModule),
                Box::new(ScanModule),
                Box::new(OsintModule),
                Box::new(ExploitModule),
            ],
        }
    }

    /// Look a module up by name, case-insensitively
    pub fn get(&self, name: &str) -> Result<&dyn SecurityModule, UnknownModule> {
        let wanted = name.trim();
        self.modules
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .map(|m| m.as_ref())
            .ok_or_else(|| UnknownModule {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// All module names, in listing order
    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Listing rows
    pub fn records(&self) -> Vec<ModuleRecord> {
        self.iter()
            .map(|m| ModuleRecord {
                name: m.name(),
                description: m.description(),
                author: m.author(),
            })
            .collect()
    }

    /// Iterate in listing order
    pub fn iter(&self) -> impl Iterator<Item = &dyn SecurityModule> {
        self.modules.iter().map(|m| m.as_ref())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(target: &str) -> ModuleArgs {
        ModuleArgs {
            target: target.to_string(),
            ports: "top-100".to_string(),
            cve: None,
        }
    }

    #[test]
    fn registry_has_the_four_builtins() {
        assert_eq!(
            ModuleRegistry::builtin().names(),
            vec!["recon", "scan", "osint", "exploit"]
        );
    }

    #[test]
    fn lookup_ignores_case() {
        let registry = ModuleRegistry::builtin();
        assert_eq!(registry.get("RECON").unwrap().name(), "recon");
    }

    #[test]
    fn unknown_module_lists_alternatives() {
        let err = ModuleRegistry::builtin().get("fuzz").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unknown module: 'fuzz'. Available: recon, scan, osint, exploit"
        );
    }

    #[test]
    fn argument_errors_name_the_module_and_chain_through_anyhow() {
        let err = InvalidModuleArgs {
            module: "scan",
            reason: "bad port list 'lots'".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid arguments for scan: bad port list 'lots'");

        let wrapped = anyhow::Error::new(err.clone()).context("run scan");
        assert_eq!(wrapped.downcast_ref::<InvalidModuleArgs>(), Some(&err));
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn every_module_reports_against_the_target() {
        let registry = ModuleRegistry::builtin();
        for module in registry.iter() {
            let report = module.run(&args("example.com")).unwrap();
            assert!(report.title.contains("example.com"), "{}", module.name());
            assert!(report.rows.iter().all(|r| r.len() == report.columns.len()));
            assert_eq!(module.author(), DEFAULT_AUTHOR);
        }
    }

    #[test]
    fn report_renders_headers() {
        let mut report = ModuleReport::new("t", &["Port", "State"]);
        report.row(["22", "open"]);
        let table = report.render_table();
        assert!(table.contains("Port"));
        assert!(table.contains("open"));
    }
}
