use rand::seq::IndexedRandom;
use rand::Rng;

use super::{ModuleArgs, ModuleReport, SecurityModule};

/// (id, name, severity, cvss)
const KNOWN_CVES: &[(&str, &str, &str, f32)] = &[
    ("CVE-2021-44228", "Log4Shell", "Critical", 10.0),
    ("CVE-2021-34527", "PrintNightmare", "Critical", 8.8),
    ("CVE-2022-26134", "Confluence RCE", "Critical", 9.8),
    ("CVE-2022-22965", "Spring4Shell", "Critical", 9.8),
    ("CVE-2023-23397", "Outlook 0-click", "Critical", 9.8),
    ("CVE-2023-44487", "HTTP/2 Rapid Reset", "High", 7.5),
    ("CVE-2024-3400", "PAN-OS RCE", "Critical", 10.0),
];

const OUTCOMES: &[&str] = &[
    "Exploit launched successfully... or did it?",
    "Session opened. Probably.",
    "Target responded with something. Unclear what.",
    "Authentication bypassed. Server confused.",
    "Payload delivered. Target is thinking about it.",
];

/// Simulated vulnerability exploitation
pub struct ExploitModule;

impl SecurityModule for ExploitModule {
    fn name(&self) -> &'static str {
        "exploit"
    }

    fn description(&self) -> &'static str {
        "Automated vulnerability exploitation (educational purposes only)"
    }

    fn run(&self, args: &ModuleArgs) -> anyhow::Result<ModuleReport> {
        let mut rng = rand::rng();
        let mut report = ModuleReport::new(
            format!("Potential Vulnerabilities - {}", args.target),
            &["CVE", "Name", "Severity", "CVSS"],
        );

        let requested = args.cve.as_deref().map(|id| id.trim().to_uppercase());
        let found: Vec<_> = match &requested {
            Some(id) => KNOWN_CVES.iter().filter(|(cve, ..)| cve == id).collect(),
            None => {
                let count = rng.random_range(1..=3);
                KNOWN_CVES.choose_multiple(&mut rng, count).collect()
            }
        };

        for (id, name, severity, cvss) in &found {
            report.row([id.to_string(), name.to_string(), severity.to_string(), format!("{:.1}", cvss)]);
        }

        let chosen = match (&requested, found.choose(&mut rng)) {
            (_, Some((id, name, ..))) => format!("{} ({})", id, name),
            (Some(id), None) => {
                report.row([id.clone(), "Unknown".to_string(), "?".to_string(), "-".to_string()]);
                id.clone()
            }
            (None, None) => "nothing in particular".to_string(),
        };

        report.note(format!("Exploitation target: {}", chosen));
        report.note(OUTCOMES.choose(&mut rng).copied().unwrap_or(OUTCOMES[0]));
        report.note("This module is entirely fictional. No systems were harmed.");
        Ok(report)
    }
}
