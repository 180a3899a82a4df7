use rand::Rng;

use super::{ModuleArgs, ModuleReport, SecurityModule};

const SOURCES: &[&str] = &[
    "Shodan",
    "Censys",
    "Hunter.io",
    "WHOIS records",
    "LinkedIn (lurking)",
    "GitHub (searching for secrets)",
    "Pastebin (classic)",
    "Google Dorks",
];

/// Open-source intelligence gathering
pub struct OsintModule;

impl SecurityModule for OsintModule {
    fn name(&self) -> &'static str {
        "osint"
    }

    fn description(&self) -> &'static str {
        "Open-source intelligence gathering and correlation"
    }

    fn run(&self, args: &ModuleArgs) -> anyhow::Result<ModuleReport> {
        let mut rng = rand::rng();
        let mut report = ModuleReport::new(
            format!("OSINT Findings - {}", args.target),
            &["Source", "Finding"],
        );

        let findings = [
            format!("{} email addresses exposed", rng.random_range(3..=47)),
            format!("{} potential API keys in public repos", rng.random_range(1..=5)),
            format!("{} documents with metadata", rng.random_range(2..=12)),
            format!("{} employee profiles", rng.random_range(5..=30)),
            format!("{} IP ranges identified", rng.random_range(1..=6)),
            format!("{} credentials in paste sites", rng.random_range(0..=3)),
            format!("{} subdomains in certificates", rng.random_range(2..=20)),
            format!("{} dorks with hits", rng.random_range(0..=9)),
        ];
        for (source, finding) in SOURCES.iter().zip(findings) {
            report.row([source.to_string(), finding]);
        }

        report.note(format!(
            "Report generated. Correlation confidence: {}%",
            rng.random_range(42..=97)
        ));
        Ok(report)
    }
}
