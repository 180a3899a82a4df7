use rand::seq::IndexedRandom;
use rand::Rng;

use super::{ModuleArgs, ModuleReport, SecurityModule};

const SUBDOMAINS: &[&str] = &[
    "dev", "staging", "admin", "api", "mail", "vpn", "remote", "test", "old", "backup", "portal",
    "internal", "db", "jenkins", "gitlab", "jira", "confluence", "legacy", "beta", "support",
];

const SERVERS: &[&str] = &[
    "Apache/2.4.51",
    "nginx/1.18.0",
    "Microsoft-IIS/10.0",
    "Express/4.18.2",
    "Werkzeug/2.3.0",
    "Tomcat/9.0.65",
];

const STATES: &[&str] = &["online", "filtered", "offline"];

/// Subdomain enumeration and fingerprinting
pub struct ReconModule;

impl SecurityModule for ReconModule {
    fn name(&self) -> &'static str {
        "recon"
    }

    fn description(&self) -> &'static str {
        "Passive and active reconnaissance against a target"
    }

    fn run(&self, args: &ModuleArgs) -> anyhow::Result<ModuleReport> {
        let mut rng = rand::rng();
        let count = rng.random_range(4..=8);
        let mut report = ModuleReport::new(
            format!("Recon Results - {}", args.target),
            &["Subdomain", "IP", "Status"],
        );

        for sub in SUBDOMAINS.choose_multiple(&mut rng, count) {
            let ip = format!(
                "10.{}.{}.{}",
                rng.random_range(0..=255),
                rng.random_range(0..=255),
                rng.random_range(1..=254)
            );
            let state = STATES.choose(&mut rng).copied().unwrap_or("offline");
            report.row([format!("{}.{}", sub, args.target), ip, state.to_string()]);
        }

        if let Some(server) = SERVERS.choose(&mut rng) {
            report.note(format!("Detected server: {}", server));
        }
        report.note(format!(
            "Found {} subdomains. Some of them might even be real.",
            report.rows.len()
        ));
        Ok(report)
    }
}
