use anyhow::{bail, Context};
use rand::seq::IndexedRandom;
use std::collections::BTreeSet;
use std::str::FromStr;

use super::{InvalidModuleArgs, ModuleArgs, ModuleReport, SecurityModule};

/// (port, service, version)
const COMMON_PORTS: &[(u16, &str, &str)] = &[
    (21, "FTP", "vsftpd 3.0.3"),
    (22, "SSH", "OpenSSH 8.2p1"),
    (23, "Telnet", "Linux telnetd"),
    (25, "SMTP", "Postfix smtpd"),
    (53, "DNS", "ISC BIND 9.16"),
    (80, "HTTP", "Apache httpd 2.4.51"),
    (443, "HTTPS", "Apache httpd 2.4.51"),
    (445, "SMB", "Samba 4.13.2"),
    (3306, "MySQL", "MySQL 8.0.27"),
    (3389, "RDP", "xrdp 0.9.17"),
    (5432, "PostgreSQL", "PostgreSQL 13.4"),
    (6379, "Redis", "Redis 6.2.6"),
    (8080, "HTTP-alt", "Jetty 9.4.43"),
    (8443, "HTTPS-alt", "nginx 1.18.0"),
    (27017, "MongoDB", "MongoDB 5.0.3"),
];

/// Ports selected with `--ports`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    /// `top-N`: the N most common ports
    Top(usize),
    /// Explicit list and ranges, e.g. `22,80,8000-8100`
    Set(BTreeSet<u16>),
}

impl PortSpec {
    /// Whether `port` is selected
    pub fn contains(&self, port: u16, rank: usize) -> bool {
        match self {
            PortSpec::Top(n) => rank < *n,
            PortSpec::Set(ports) => ports.contains(&port),
        }
    }
}

impl FromStr for PortSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(n) = s.strip_prefix("top-") {
            let n = n
                .parse::<usize>()
                .with_context(|| format!("invalid port selection '{}'", s))?;
            return Ok(PortSpec::Top(n));
        }

        let mut ports = BTreeSet::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let lo: u16 = lo.trim().parse().with_context(|| format!("invalid port '{}'", lo))?;
                    let hi: u16 = hi.trim().parse().with_context(|| format!("invalid port '{}'", hi))?;
                    if lo > hi {
                        bail!("invalid port range '{}'", part);
                    }
                    ports.extend(lo..=hi);
                }
                None => {
                    ports.insert(part.parse().with_context(|| format!("invalid port '{}'", part))?);
                }
            }
        }
        if ports.is_empty() {
            bail!("no ports selected by '{}'", s);
        }
        Ok(PortSpec::Set(ports))
    }
}

/// Simulated TCP port scan with service detection
pub struct ScanModule;

impl SecurityModule for ScanModule {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn description(&self) -> &'static str {
        "TCP/UDP port scanner with service detection"
    }

    fn validate(&self, args: &ModuleArgs) -> Result<(), InvalidModuleArgs> {
        args.ports
            .parse::<PortSpec>()
            .map(|_| ())
            .map_err(|e| InvalidModuleArgs {
                module: "scan",
                reason: format!("{:#}", e),
            })
    }

    fn run(&self, args: &ModuleArgs) -> anyhow::Result<ModuleReport> {
        let spec: PortSpec = args.ports.parse()?;
        let mut rng = rand::rng();

        let selected: Vec<_> = COMMON_PORTS
            .iter()
            .enumerate()
            .filter(|(rank, (port, ..))| spec.contains(*port, *rank))
            .map(|(_, entry)| entry)
            .collect();
        let open_count = selected.len().min(2 + selected.len() / 3);
        let open: Vec<u16> = selected
            .choose_multiple(&mut rng, open_count)
            .map(|(port, ..)| *port)
            .collect();

        let mut report = ModuleReport::new(
            format!("Scan Results - {}", args.target),
            &["Port", "State", "Service", "Version"],
        );
        for (port, service, version) in &selected {
            let is_open = open.contains(port);
            report.row([
                port.to_string(),
                if is_open { "open" } else { "closed" }.to_string(),
                service.to_string(),
                if is_open { version.to_string() } else { String::new() },
            ]);
        }

        report.note(format!(
            "Scanned {} ports. Found {} open. Real nmap would be faster. Just saying.",
            selected.len(),
            open.len()
        ));
        Ok(report)
    }
}
